//! C004: max-await-count
//!
//! Counts `await` expressions per async function. Awaits inside nested
//! functions belong to the nested function's own count.

use std::ops::ControlFlow;

use serde::Deserialize;
use swc_common::Span;
use swc_ecma_ast::{ArrowExpr, BlockStmtOrExpr, Expr, Function, Stmt, VarDeclOrExpr};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MaxAwaitCountOptions {
    pub max_await_expressions: usize,
}

impl Default for MaxAwaitCountOptions {
    fn default() -> Self {
        Self {
            max_await_expressions: 5,
        }
    }
}

declare_rule!(
    MaxAwaitCount,
    id = "C004",
    name = "max-await-count",
    description = "Many awaits in one function usually mean it sequences too many concerns and serializes independent work",
    category = Complexity,
    severity = Warning,
    options = MaxAwaitCountOptions,
    examples = r#"
// Bad: six sequential awaits in one function
async function setup() {
    await db.connect();
    await cache.connect();
    await queue.connect();
    await loadConfig();
    await warmCaches();
    await registerHandlers();
}

// Good: group independent work
async function setup() {
    await Promise.all([db.connect(), cache.connect(), queue.connect()]);
    await initialize();
}
"#
);

impl Rule for MaxAwaitCount {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = AwaitVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            max: self.options.max_await_expressions,
        };

        let _ = walk_ast(&mut visitor, file);
        visitor.diagnostics
    }

    fn configure(&mut self, settings: &toml::Value) {
        if let Some(options) = parse_rule_options(self.metadata.name, settings) {
            self.options = options;
        }
    }
}

struct AwaitVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    max: usize,
}

impl AwaitVisitor<'_> {
    fn check_async_body(&mut self, stmts: &[Stmt], fn_span: Span, ctx: &VisitorContext) {
        let mut count = 0usize;
        for stmt in stmts {
            count_awaits_in_stmt(stmt, &mut count);
        }
        self.report_if_over(count, fn_span, ctx);
    }

    fn report_if_over(&mut self, count: usize, fn_span: Span, ctx: &VisitorContext) {
        if count <= self.max {
            return;
        }

        let diagnostic = ctx
            .report(
                self.metadata,
                fn_span,
                format!(
                    "Async function has {} awaits, more than the maximum of {}",
                    count, self.max
                ),
            )
            .with_message_id("tooManyAwaits")
            .with_data("count", count.to_string())
            .with_data("max", self.max.to_string())
            .with_suggestion("Split the function or batch independent awaits with Promise.all");

        self.diagnostics.push(diagnostic);
    }
}

impl AstVisitor for AwaitVisitor<'_> {
    fn visit_function(&mut self, node: &Function, ctx: &VisitorContext) -> ControlFlow<()> {
        if node.is_async {
            if let Some(body) = &node.body {
                self.check_async_body(&body.stmts, node.span, ctx);
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        if node.is_async {
            match node.body.as_ref() {
                BlockStmtOrExpr::BlockStmt(block) => {
                    self.check_async_body(&block.stmts, node.span, ctx);
                }
                BlockStmtOrExpr::Expr(body) => {
                    let mut count = 0usize;
                    count_awaits_in_expr(body, &mut count);
                    self.report_if_over(count, node.span, ctx);
                }
            }
        }
        ControlFlow::Continue(())
    }
}

fn count_awaits_in_stmt(stmt: &Stmt, count: &mut usize) {
    match stmt {
        Stmt::Expr(expr_stmt) => count_awaits_in_expr(&expr_stmt.expr, count),
        Stmt::Block(block) => {
            for s in &block.stmts {
                count_awaits_in_stmt(s, count);
            }
        }
        Stmt::If(if_stmt) => {
            count_awaits_in_expr(&if_stmt.test, count);
            count_awaits_in_stmt(&if_stmt.cons, count);
            if let Some(alt) = &if_stmt.alt {
                count_awaits_in_stmt(alt, count);
            }
        }
        Stmt::Return(ret) => {
            if let Some(arg) = &ret.arg {
                count_awaits_in_expr(arg, count);
            }
        }
        Stmt::Throw(throw) => count_awaits_in_expr(&throw.arg, count),
        Stmt::While(while_stmt) => {
            count_awaits_in_expr(&while_stmt.test, count);
            count_awaits_in_stmt(&while_stmt.body, count);
        }
        Stmt::DoWhile(do_while) => {
            count_awaits_in_stmt(&do_while.body, count);
            count_awaits_in_expr(&do_while.test, count);
        }
        Stmt::For(for_stmt) => {
            match &for_stmt.init {
                Some(VarDeclOrExpr::VarDecl(var)) => {
                    for declarator in &var.decls {
                        if let Some(init) = &declarator.init {
                            count_awaits_in_expr(init, count);
                        }
                    }
                }
                Some(VarDeclOrExpr::Expr(expr)) => count_awaits_in_expr(expr, count),
                None => {}
            }
            if let Some(test) = &for_stmt.test {
                count_awaits_in_expr(test, count);
            }
            if let Some(update) = &for_stmt.update {
                count_awaits_in_expr(update, count);
            }
            count_awaits_in_stmt(&for_stmt.body, count);
        }
        Stmt::ForIn(for_in) => {
            count_awaits_in_expr(&for_in.right, count);
            count_awaits_in_stmt(&for_in.body, count);
        }
        Stmt::ForOf(for_of) => {
            count_awaits_in_expr(&for_of.right, count);
            count_awaits_in_stmt(&for_of.body, count);
        }
        Stmt::Switch(switch) => {
            count_awaits_in_expr(&switch.discriminant, count);
            for case in &switch.cases {
                if let Some(test) = &case.test {
                    count_awaits_in_expr(test, count);
                }
                for s in &case.cons {
                    count_awaits_in_stmt(s, count);
                }
            }
        }
        Stmt::Try(try_stmt) => {
            for s in &try_stmt.block.stmts {
                count_awaits_in_stmt(s, count);
            }
            if let Some(handler) = &try_stmt.handler {
                for s in &handler.body.stmts {
                    count_awaits_in_stmt(s, count);
                }
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                for s in &finalizer.stmts {
                    count_awaits_in_stmt(s, count);
                }
            }
        }
        Stmt::Labeled(labeled) => count_awaits_in_stmt(&labeled.body, count),
        Stmt::Decl(swc_ecma_ast::Decl::Var(var)) => {
            for declarator in &var.decls {
                if let Some(init) = &declarator.init {
                    count_awaits_in_expr(init, count);
                }
            }
        }
        _ => {}
    }
}

fn count_awaits_in_expr(expr: &Expr, count: &mut usize) {
    match expr {
        Expr::Await(await_expr) => {
            *count += 1;
            count_awaits_in_expr(&await_expr.arg, count);
        }
        // nested functions keep their own count
        Expr::Fn(_) | Expr::Arrow(_) | Expr::Class(_) => {}
        Expr::Call(call) => {
            if let swc_ecma_ast::Callee::Expr(callee) = &call.callee {
                count_awaits_in_expr(callee, count);
            }
            for arg in &call.args {
                count_awaits_in_expr(&arg.expr, count);
            }
        }
        Expr::New(new_expr) => {
            count_awaits_in_expr(&new_expr.callee, count);
            if let Some(args) = &new_expr.args {
                for arg in args {
                    count_awaits_in_expr(&arg.expr, count);
                }
            }
        }
        Expr::Member(member) => {
            count_awaits_in_expr(&member.obj, count);
            if let swc_ecma_ast::MemberProp::Computed(computed) = &member.prop {
                count_awaits_in_expr(&computed.expr, count);
            }
        }
        Expr::OptChain(opt) => match &*opt.base {
            swc_ecma_ast::OptChainBase::Member(member) => {
                count_awaits_in_expr(&member.obj, count);
            }
            swc_ecma_ast::OptChainBase::Call(call) => {
                count_awaits_in_expr(&call.callee, count);
                for arg in &call.args {
                    count_awaits_in_expr(&arg.expr, count);
                }
            }
        },
        Expr::Bin(bin) => {
            count_awaits_in_expr(&bin.left, count);
            count_awaits_in_expr(&bin.right, count);
        }
        Expr::Unary(unary) => count_awaits_in_expr(&unary.arg, count),
        Expr::Cond(cond) => {
            count_awaits_in_expr(&cond.test, count);
            count_awaits_in_expr(&cond.cons, count);
            count_awaits_in_expr(&cond.alt, count);
        }
        Expr::Assign(assign) => count_awaits_in_expr(&assign.right, count),
        Expr::Seq(seq) => {
            for e in &seq.exprs {
                count_awaits_in_expr(e, count);
            }
        }
        Expr::Array(array) => {
            for elem in array.elems.iter().flatten() {
                count_awaits_in_expr(&elem.expr, count);
            }
        }
        Expr::Object(object) => {
            for prop in &object.props {
                match prop {
                    swc_ecma_ast::PropOrSpread::Spread(spread) => {
                        count_awaits_in_expr(&spread.expr, count);
                    }
                    swc_ecma_ast::PropOrSpread::Prop(prop) => {
                        if let swc_ecma_ast::Prop::KeyValue(kv) = prop.as_ref() {
                            count_awaits_in_expr(&kv.value, count);
                        }
                    }
                }
            }
        }
        Expr::Tpl(tpl) => {
            for e in &tpl.exprs {
                count_awaits_in_expr(e, count);
            }
        }
        Expr::Paren(paren) => count_awaits_in_expr(&paren.expr, count),
        Expr::Yield(yield_expr) => {
            if let Some(arg) = &yield_expr.arg {
                count_awaits_in_expr(arg, count);
            }
        }
        Expr::TsNonNull(inner) => count_awaits_in_expr(&inner.expr, count),
        Expr::TsAs(inner) => count_awaits_in_expr(&inner.expr, count),
        _ => {}
    }
}
