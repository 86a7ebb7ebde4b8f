//! R002: no-unbounded-loops
//!
//! Two families of never-ending loops: `while (true)` (and friends)
//! with no break that can reach this exact loop, and `while (flag)`
//! where nothing in the body ever changes `flag`. Break targeting is
//! label-aware: an unlabeled break inside a nested loop or switch
//! belongs to that construct, not to the loop under inspection.

use std::ops::ControlFlow;

use serde::Deserialize;
use swc_common::Span;
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, DoWhileStmt, Expr, ForStmt, Function, Lit, Stmt,
    UnaryOp, VarDeclOrExpr, WhileStmt,
};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::helpers::unwrap_expr;
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NoUnboundedLoopsOptions {
    pub disallow_infinite_while: bool,
    pub disallow_external_flag_loops: bool,
}

impl Default for NoUnboundedLoopsOptions {
    fn default() -> Self {
        Self {
            disallow_infinite_while: true,
            disallow_external_flag_loops: false,
        }
    }
}

declare_rule!(
    NoUnboundedLoops,
    id = "R002",
    name = "no-unbounded-loops",
    description = "Loops with no reachable exit condition hang the program or burn CPU until killed",
    category = Correctness,
    severity = Warning,
    options = NoUnboundedLoopsOptions,
    examples = r#"
// Bad: nothing can stop this loop
while (true) {
    poll();
}

// Good: the loop has an exit
while (true) {
    if (poll() === null) break;
}
"#
);

impl Rule for NoUnboundedLoops {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let Some(module) = file.module() else {
            return Vec::new();
        };

        let ctx = VisitorContext::new(file);
        let mut visitor = LoopVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            options: &self.options,
        };

        // module-level statements; function bodies arrive via the walk
        for item in &module.body {
            if let swc_ecma_ast::ModuleItem::Stmt(stmt) = item {
                visitor.scan_stmt(stmt, None, &ctx);
            }
        }

        let _ = walk_ast(&mut visitor, file);
        visitor.diagnostics
    }

    fn configure(&mut self, settings: &toml::Value) {
        if let Some(options) = parse_rule_options(self.metadata.name, settings) {
            self.options = options;
        }
    }
}

struct LoopVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    options: &'a NoUnboundedLoopsOptions,
}

impl AstVisitor for LoopVisitor<'_> {
    fn visit_function(&mut self, node: &Function, ctx: &VisitorContext) -> ControlFlow<()> {
        if let Some(body) = &node.body {
            for stmt in &body.stmts {
                self.scan_stmt(stmt, None, ctx);
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        if let BlockStmtOrExpr::BlockStmt(block) = node.body.as_ref() {
            for stmt in &block.stmts {
                self.scan_stmt(stmt, None, ctx);
            }
        }
        ControlFlow::Continue(())
    }

    // constructors, static blocks, and object-literal accessors
    fn visit_block_body(&mut self, node: &BlockStmt, ctx: &VisitorContext) -> ControlFlow<()> {
        for stmt in &node.stmts {
            self.scan_stmt(stmt, None, ctx);
        }
        ControlFlow::Continue(())
    }
}

impl LoopVisitor<'_> {
    /// `label` carries the label of an immediately enclosing labeled
    /// statement, so `outer: while (true) { ... break outer; ... }`
    /// resolves.
    fn scan_stmt(&mut self, stmt: &Stmt, label: Option<&str>, ctx: &VisitorContext) {
        match stmt {
            Stmt::Labeled(labeled) => {
                self.scan_stmt(&labeled.body, Some(labeled.label.sym.as_ref()), ctx);
            }
            Stmt::While(while_stmt) => {
                self.check_while(while_stmt, label, ctx);
                self.scan_stmt(&while_stmt.body, None, ctx);
            }
            Stmt::DoWhile(do_while) => {
                self.check_do_while(do_while, label, ctx);
                self.scan_stmt(&do_while.body, None, ctx);
            }
            Stmt::For(for_stmt) => {
                self.check_for(for_stmt, label, ctx);
                self.scan_stmt(&for_stmt.body, None, ctx);
            }
            Stmt::ForIn(for_in) => self.scan_stmt(&for_in.body, None, ctx),
            Stmt::ForOf(for_of) => self.scan_stmt(&for_of.body, None, ctx),
            Stmt::Block(block) => {
                for s in &block.stmts {
                    self.scan_stmt(s, None, ctx);
                }
            }
            Stmt::If(if_stmt) => {
                self.scan_stmt(&if_stmt.cons, None, ctx);
                if let Some(alt) = &if_stmt.alt {
                    self.scan_stmt(alt, None, ctx);
                }
            }
            Stmt::Switch(switch) => {
                for case in &switch.cases {
                    for s in &case.cons {
                        self.scan_stmt(s, None, ctx);
                    }
                }
            }
            Stmt::Try(try_stmt) => {
                for s in &try_stmt.block.stmts {
                    self.scan_stmt(s, None, ctx);
                }
                if let Some(handler) = &try_stmt.handler {
                    for s in &handler.body.stmts {
                        self.scan_stmt(s, None, ctx);
                    }
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    for s in &finalizer.stmts {
                        self.scan_stmt(s, None, ctx);
                    }
                }
            }
            _ => {}
        }
    }

    fn check_while(&mut self, while_stmt: &WhileStmt, label: Option<&str>, ctx: &VisitorContext) {
        if is_true_literal(&while_stmt.test) {
            if self.options.disallow_infinite_while
                && !has_escaping_break(&while_stmt.body, label, true)
            {
                self.report(
                    "infiniteWhileTrueLoop",
                    "while (true) loop has no reachable break",
                    while_stmt.span,
                    None,
                    ctx,
                );
            }
            return;
        }

        if !self.options.disallow_external_flag_loops {
            return;
        }
        if let Some(flag) = flag_name(&while_stmt.test) {
            if !stmt_touches_flag(&while_stmt.body, flag) {
                self.report(
                    "externalFlagWhileLoop",
                    &format!("Loop condition '{}' is never updated in the loop body", flag),
                    while_stmt.span,
                    Some(flag),
                    ctx,
                );
            }
        }
    }

    fn check_do_while(&mut self, do_while: &DoWhileStmt, label: Option<&str>, ctx: &VisitorContext) {
        if self.options.disallow_infinite_while
            && is_true_literal(&do_while.test)
            && !has_escaping_break(&do_while.body, label, true)
        {
            self.report(
                "infiniteDoWhileLoop",
                "do..while (true) loop has no reachable break",
                do_while.span,
                None,
                ctx,
            );
        }
    }

    fn check_for(&mut self, for_stmt: &ForStmt, label: Option<&str>, ctx: &VisitorContext) {
        let unbounded_test = match &for_stmt.test {
            None => true,
            Some(test) => is_true_literal(test),
        };
        if self.options.disallow_infinite_while
            && unbounded_test
            && !has_escaping_break(&for_stmt.body, label, true)
        {
            self.report(
                "infiniteForLoop",
                "for loop with no exit condition has no reachable break",
                for_stmt.span,
                None,
                ctx,
            );
        }
    }

    fn report(
        &mut self,
        message_id: &str,
        message: &str,
        span: Span,
        flag: Option<&str>,
        ctx: &VisitorContext,
    ) {
        let mut diagnostic = ctx
            .report(self.metadata, span, message)
            .with_message_id(message_id)
            .with_suggestion("Give the loop a reachable exit condition");

        if let Some(flag) = flag {
            diagnostic = diagnostic.with_data("flagName", flag.to_string());
        }

        self.diagnostics.push(diagnostic);
    }
}

fn is_true_literal(test: &Expr) -> bool {
    matches!(unwrap_expr(test), Expr::Lit(Lit::Bool(b)) if b.value)
}

/// `while (flag)` / `while (!flag)` condition identifier.
fn flag_name(test: &Expr) -> Option<&str> {
    match unwrap_expr(test) {
        Expr::Ident(ident) => Some(ident.sym.as_ref()),
        Expr::Unary(unary) if unary.op == UnaryOp::Bang => match unwrap_expr(&unary.arg) {
            Expr::Ident(ident) => Some(ident.sym.as_ref()),
            _ => None,
        },
        _ => None,
    }
}

/// Whether `stmt` contains a break that exits the loop under
/// inspection. `unlabeled_counts` turns false once the search crosses
/// into a nested loop or switch, where an unlabeled break binds to the
/// inner construct. Function bodies are never searched: a break cannot
/// cross a function boundary.
fn has_escaping_break(stmt: &Stmt, label: Option<&str>, unlabeled_counts: bool) -> bool {
    match stmt {
        Stmt::Break(break_stmt) => match &break_stmt.label {
            None => unlabeled_counts,
            Some(break_label) => label == Some(break_label.sym.as_ref()),
        },
        Stmt::Block(block) => block
            .stmts
            .iter()
            .any(|s| has_escaping_break(s, label, unlabeled_counts)),
        Stmt::If(if_stmt) => {
            has_escaping_break(&if_stmt.cons, label, unlabeled_counts)
                || if_stmt
                    .alt
                    .as_ref()
                    .is_some_and(|alt| has_escaping_break(alt, label, unlabeled_counts))
        }
        Stmt::Labeled(labeled) => has_escaping_break(&labeled.body, label, unlabeled_counts),
        Stmt::Try(try_stmt) => {
            try_stmt
                .block
                .stmts
                .iter()
                .any(|s| has_escaping_break(s, label, unlabeled_counts))
                || try_stmt.handler.as_ref().is_some_and(|handler| {
                    handler
                        .body
                        .stmts
                        .iter()
                        .any(|s| has_escaping_break(s, label, unlabeled_counts))
                })
                || try_stmt.finalizer.as_ref().is_some_and(|finalizer| {
                    finalizer
                        .stmts
                        .iter()
                        .any(|s| has_escaping_break(s, label, unlabeled_counts))
                })
        }
        // a nested loop or switch captures unlabeled breaks
        Stmt::While(while_stmt) => has_escaping_break(&while_stmt.body, label, false),
        Stmt::DoWhile(do_while) => has_escaping_break(&do_while.body, label, false),
        Stmt::For(for_stmt) => has_escaping_break(&for_stmt.body, label, false),
        Stmt::ForIn(for_in) => has_escaping_break(&for_in.body, label, false),
        Stmt::ForOf(for_of) => has_escaping_break(&for_of.body, label, false),
        Stmt::Switch(switch) => switch
            .cases
            .iter()
            .flat_map(|case| case.cons.iter())
            .any(|s| has_escaping_break(s, label, false)),
        _ => false,
    }
}

fn stmt_touches_flag(stmt: &Stmt, flag: &str) -> bool {
    match stmt {
        Stmt::Expr(expr_stmt) => expr_touches_flag(&expr_stmt.expr, flag),
        Stmt::Block(block) => block.stmts.iter().any(|s| stmt_touches_flag(s, flag)),
        Stmt::If(if_stmt) => {
            expr_touches_flag(&if_stmt.test, flag)
                || stmt_touches_flag(&if_stmt.cons, flag)
                || if_stmt
                    .alt
                    .as_ref()
                    .is_some_and(|alt| stmt_touches_flag(alt, flag))
        }
        Stmt::While(while_stmt) => stmt_touches_flag(&while_stmt.body, flag),
        Stmt::DoWhile(do_while) => stmt_touches_flag(&do_while.body, flag),
        Stmt::For(for_stmt) => {
            let init_touches = match &for_stmt.init {
                Some(VarDeclOrExpr::Expr(expr)) => expr_touches_flag(expr, flag),
                _ => false,
            };
            init_touches
                || for_stmt
                    .update
                    .as_ref()
                    .is_some_and(|update| expr_touches_flag(update, flag))
                || stmt_touches_flag(&for_stmt.body, flag)
        }
        Stmt::ForIn(for_in) => stmt_touches_flag(&for_in.body, flag),
        Stmt::ForOf(for_of) => stmt_touches_flag(&for_of.body, flag),
        Stmt::Switch(switch) => switch
            .cases
            .iter()
            .flat_map(|case| case.cons.iter())
            .any(|s| stmt_touches_flag(s, flag)),
        Stmt::Try(try_stmt) => {
            try_stmt.block.stmts.iter().any(|s| stmt_touches_flag(s, flag))
                || try_stmt.handler.as_ref().is_some_and(|handler| {
                    handler.body.stmts.iter().any(|s| stmt_touches_flag(s, flag))
                })
                || try_stmt.finalizer.as_ref().is_some_and(|finalizer| {
                    finalizer.stmts.iter().any(|s| stmt_touches_flag(s, flag))
                })
        }
        Stmt::Labeled(labeled) => stmt_touches_flag(&labeled.body, flag),
        Stmt::Return(ret) => ret
            .arg
            .as_ref()
            .is_some_and(|arg| expr_touches_flag(arg, flag)),
        _ => false,
    }
}

/// Assignments and updates to `flag`, ignoring nested function bodies:
/// an update that only happens inside a callback is exactly the
/// external-flag pattern this rule is after.
fn expr_touches_flag(expr: &Expr, flag: &str) -> bool {
    match expr {
        Expr::Assign(assign) => {
            let target_is_flag = matches!(
                &assign.left,
                swc_ecma_ast::AssignTarget::Simple(swc_ecma_ast::SimpleAssignTarget::Ident(
                    ident
                )) if ident.id.sym.as_ref() == flag
            );
            target_is_flag || expr_touches_flag(&assign.right, flag)
        }
        Expr::Update(update) => {
            matches!(unwrap_expr(&update.arg), Expr::Ident(ident) if ident.sym.as_ref() == flag)
        }
        Expr::Paren(paren) => expr_touches_flag(&paren.expr, flag),
        Expr::Seq(seq) => seq.exprs.iter().any(|e| expr_touches_flag(e, flag)),
        Expr::Bin(bin) => {
            expr_touches_flag(&bin.left, flag) || expr_touches_flag(&bin.right, flag)
        }
        Expr::Cond(cond) => {
            expr_touches_flag(&cond.test, flag)
                || expr_touches_flag(&cond.cons, flag)
                || expr_touches_flag(&cond.alt, flag)
        }
        Expr::Unary(unary) => expr_touches_flag(&unary.arg, flag),
        Expr::Call(call) => call.args.iter().any(|arg| expr_touches_flag(&arg.expr, flag)),
        Expr::Fn(_) | Expr::Arrow(_) => false,
        _ => false,
    }
}
