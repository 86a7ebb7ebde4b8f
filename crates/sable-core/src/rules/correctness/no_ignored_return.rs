//! R001: no-ignored-return
//!
//! A call whose entire statement is the call expression throws its
//! return value away. Values consumed by assignments, arguments,
//! operators, `return`/`await` and the like are fine; explicit
//! discards (`void f()`) and the `sable-expect-no-use` sentinel
//! comment mark the drop as intentional.

use std::collections::HashSet;
use std::ops::ControlFlow;

use serde::Deserialize;
use swc_common::Span;
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, Callee, Decl, Expr, ExprStmt, FnDecl, Function,
    ModuleDecl, ModuleItem, OptChainBase, Stmt,
};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::helpers::{flatten_member_chain, unwrap_expr};
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

/// Exact normalized comment text that marks an intentional discard,
/// accepted on the statement's own line or the line immediately above.
const SENTINEL_COMMENT: &str = "sable-expect-no-use";

const MAX_CALLEE_TEXT: usize = 40;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NoIgnoredReturnOptions {
    /// Callees whose results may be dropped without comment. An entry
    /// matches the whole path or any prefix of it, so "console" covers
    /// console.log, console.warn and the rest.
    pub ignored_callees: Vec<String>,
}

impl Default for NoIgnoredReturnOptions {
    fn default() -> Self {
        Self {
            ignored_callees: vec!["console".to_string()],
        }
    }
}

declare_rule!(
    NoIgnoredReturn,
    id = "R001",
    name = "no-ignored-return",
    description = "A call in statement position silently drops its return value",
    category = Correctness,
    severity = Warning,
    options = NoIgnoredReturnOptions,
    examples = r#"
// Bad: the promise (and its rejection) vanish
saveRecord(record);

// Good
await saveRecord(record);

// Also fine: explicitly discarded
void saveRecord(record);
"#
);

impl Rule for NoIgnoredReturn {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let Some(module) = file.module() else {
            return Vec::new();
        };

        let ctx = VisitorContext::new(file);
        let mut visitor = ReturnVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            options: &self.options,
            void_functions: collect_void_functions(module),
        };

        for item in &module.body {
            if let ModuleItem::Stmt(stmt) = item {
                visitor.scan_stmt(stmt, &ctx);
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

struct ReturnVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    options: &'a NoIgnoredReturnOptions,
    /// Same-file function declarations whose bodies never return a
    /// value; calling one in statement position drops nothing.
    void_functions: HashSet<String>,
}

impl AstVisitor for ReturnVisitor<'_> {
    fn visit_function(&mut self, node: &Function, ctx: &VisitorContext) -> ControlFlow<()> {
        if let Some(body) = &node.body {
            for stmt in &body.stmts {
                self.scan_stmt(stmt, ctx);
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        if let BlockStmtOrExpr::BlockStmt(block) = node.body.as_ref() {
            for stmt in &block.stmts {
                self.scan_stmt(stmt, ctx);
            }
        }
        ControlFlow::Continue(())
    }

    // constructors, static blocks, and object-literal accessors
    fn visit_block_body(&mut self, node: &BlockStmt, ctx: &VisitorContext) -> ControlFlow<()> {
        for stmt in &node.stmts {
            self.scan_stmt(stmt, ctx);
        }
        ControlFlow::Continue(())
    }
}

impl ReturnVisitor<'_> {
    /// Statement-level descent; nested function bodies arrive through
    /// their own visitor hooks.
    fn scan_stmt(&mut self, stmt: &Stmt, ctx: &VisitorContext) {
        match stmt {
            Stmt::Expr(expr_stmt) => self.check_expr_stmt(expr_stmt, ctx),
            Stmt::Block(block) => {
                for s in &block.stmts {
                    self.scan_stmt(s, ctx);
                }
            }
            Stmt::If(if_stmt) => {
                self.scan_stmt(&if_stmt.cons, ctx);
                if let Some(alt) = &if_stmt.alt {
                    self.scan_stmt(alt, ctx);
                }
            }
            Stmt::While(while_stmt) => self.scan_stmt(&while_stmt.body, ctx),
            Stmt::DoWhile(do_while) => self.scan_stmt(&do_while.body, ctx),
            Stmt::For(for_stmt) => self.scan_stmt(&for_stmt.body, ctx),
            Stmt::ForIn(for_in) => self.scan_stmt(&for_in.body, ctx),
            Stmt::ForOf(for_of) => self.scan_stmt(&for_of.body, ctx),
            Stmt::Switch(switch) => {
                for case in &switch.cases {
                    for s in &case.cons {
                        self.scan_stmt(s, ctx);
                    }
                }
            }
            Stmt::Try(try_stmt) => {
                for s in &try_stmt.block.stmts {
                    self.scan_stmt(s, ctx);
                }
                if let Some(handler) = &try_stmt.handler {
                    for s in &handler.body.stmts {
                        self.scan_stmt(s, ctx);
                    }
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    for s in &finalizer.stmts {
                        self.scan_stmt(s, ctx);
                    }
                }
            }
            Stmt::Labeled(labeled) => self.scan_stmt(&labeled.body, ctx),
            _ => {}
        }
    }

    fn check_expr_stmt(&mut self, expr_stmt: &ExprStmt, ctx: &VisitorContext) {
        let callee = match unwrap_expr(&expr_stmt.expr) {
            Expr::Call(call) => match &call.callee {
                Callee::Expr(callee) => callee.as_ref(),
                // super(...) and import(...) produce no droppable value
                _ => return,
            },
            Expr::OptChain(opt_chain) => match opt_chain.base.as_ref() {
                OptChainBase::Call(call) => call.callee.as_ref(),
                OptChainBase::Member(_) => return,
            },
            // anything else consumes or explicitly discards the value
            _ => return,
        };

        // unclassifiable callee shapes are not violations
        let Some(path) = callee_path(callee) else {
            return;
        };

        if self.is_allowlisted(&path) {
            return;
        }
        if !path.contains('.') && self.void_functions.contains(path.as_str()) {
            return;
        }
        if self.has_sentinel_comment(expr_stmt.span, ctx) {
            return;
        }

        let callee_text = cap_callee_text(&path);
        let diagnostic = ctx
            .report(
                self.metadata,
                expr_stmt.span,
                format!("Return value of '{}' is silently dropped", callee_text),
            )
            .with_message_id("returnValueUnhandled")
            .with_data("callee", callee_text)
            .with_suggestion(
                "Use the result, prefix the call with void, or add a sable-expect-no-use comment",
            );

        self.diagnostics.push(diagnostic);
    }

    fn is_allowlisted(&self, path: &str) -> bool {
        self.options.ignored_callees.iter().any(|entry| {
            path == entry || path.strip_prefix(entry.as_str()).is_some_and(|rest| {
                rest.starts_with('.') || rest.starts_with("?.")
            })
        })
    }

    fn has_sentinel_comment(&self, span: Span, ctx: &VisitorContext) -> bool {
        let has = |text: Option<&str>| text.is_some_and(|t| t.contains(SENTINEL_COMMENT));

        if has(ctx.line_text(span)) {
            return true;
        }
        let (line, _) = ctx.span_to_location(span);
        line > 1 && has(ctx.file().get_line(line - 1))
    }
}

fn callee_path(callee: &Expr) -> Option<String> {
    match unwrap_expr(callee) {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        expr @ (Expr::Member(_) | Expr::OptChain(_)) => {
            flatten_member_chain(expr).map(|chain| chain.path())
        }
        _ => None,
    }
}

fn cap_callee_text(path: &str) -> String {
    if path.chars().count() <= MAX_CALLEE_TEXT {
        path.to_string()
    } else {
        let capped: String = path.chars().take(MAX_CALLEE_TEXT).collect();
        format!("{}...", capped)
    }
}

/// Names of function declarations whose bodies contain no
/// return-with-value. Nested declarations are indexed too; nested
/// function bodies do not make their parent value-bearing.
fn collect_void_functions(module: &swc_ecma_ast::Module) -> HashSet<String> {
    let mut void_functions = HashSet::new();

    for item in &module.body {
        match item {
            ModuleItem::Stmt(stmt) => collect_from_stmt(stmt, &mut void_functions),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                if let Decl::Fn(fn_decl) = &export.decl {
                    collect_from_fn_decl(fn_decl, &mut void_functions);
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                if let swc_ecma_ast::DefaultDecl::Fn(fn_expr) = &export.decl {
                    if let (Some(ident), Some(body)) = (&fn_expr.ident, &fn_expr.function.body) {
                        index_function(ident.sym.as_ref(), &body.stmts, &mut void_functions);
                        for stmt in &body.stmts {
                            collect_from_stmt(stmt, &mut void_functions);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    void_functions
}

fn collect_from_fn_decl(fn_decl: &FnDecl, void_functions: &mut HashSet<String>) {
    if let Some(body) = &fn_decl.function.body {
        index_function(fn_decl.ident.sym.as_ref(), &body.stmts, void_functions);
        for stmt in &body.stmts {
            collect_from_stmt(stmt, void_functions);
        }
    }
}

fn index_function(name: &str, body: &[Stmt], void_functions: &mut HashSet<String>) {
    if !body.iter().any(has_value_return) {
        void_functions.insert(name.to_string());
    }
}

fn collect_from_stmt(stmt: &Stmt, void_functions: &mut HashSet<String>) {
    match stmt {
        Stmt::Decl(Decl::Fn(fn_decl)) => collect_from_fn_decl(fn_decl, void_functions),
        Stmt::Block(block) => {
            for s in &block.stmts {
                collect_from_stmt(s, void_functions);
            }
        }
        Stmt::If(if_stmt) => {
            collect_from_stmt(&if_stmt.cons, void_functions);
            if let Some(alt) = &if_stmt.alt {
                collect_from_stmt(alt, void_functions);
            }
        }
        Stmt::While(while_stmt) => collect_from_stmt(&while_stmt.body, void_functions),
        Stmt::DoWhile(do_while) => collect_from_stmt(&do_while.body, void_functions),
        Stmt::For(for_stmt) => collect_from_stmt(&for_stmt.body, void_functions),
        Stmt::ForIn(for_in) => collect_from_stmt(&for_in.body, void_functions),
        Stmt::ForOf(for_of) => collect_from_stmt(&for_of.body, void_functions),
        Stmt::Try(try_stmt) => {
            for s in &try_stmt.block.stmts {
                collect_from_stmt(s, void_functions);
            }
            if let Some(handler) = &try_stmt.handler {
                for s in &handler.body.stmts {
                    collect_from_stmt(s, void_functions);
                }
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                for s in &finalizer.stmts {
                    collect_from_stmt(s, void_functions);
                }
            }
        }
        Stmt::Labeled(labeled) => collect_from_stmt(&labeled.body, void_functions),
        _ => {}
    }
}

/// True when the statement (without descending into nested functions)
/// contains `return <expr>`.
fn has_value_return(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(ret) => ret.arg.is_some(),
        Stmt::Block(block) => block.stmts.iter().any(has_value_return),
        Stmt::If(if_stmt) => {
            has_value_return(&if_stmt.cons)
                || if_stmt.alt.as_deref().is_some_and(has_value_return)
        }
        Stmt::While(while_stmt) => has_value_return(&while_stmt.body),
        Stmt::DoWhile(do_while) => has_value_return(&do_while.body),
        Stmt::For(for_stmt) => has_value_return(&for_stmt.body),
        Stmt::ForIn(for_in) => has_value_return(&for_in.body),
        Stmt::ForOf(for_of) => has_value_return(&for_of.body),
        Stmt::Switch(switch) => switch
            .cases
            .iter()
            .flat_map(|case| case.cons.iter())
            .any(has_value_return),
        Stmt::Try(try_stmt) => {
            try_stmt.block.stmts.iter().any(has_value_return)
                || try_stmt
                    .handler
                    .as_ref()
                    .is_some_and(|handler| handler.body.stmts.iter().any(has_value_return))
                || try_stmt
                    .finalizer
                    .as_ref()
                    .is_some_and(|finalizer| finalizer.stmts.iter().any(has_value_return))
        }
        Stmt::Labeled(labeled) => has_value_return(&labeled.body),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_rule(code: &str) -> Vec<Diagnostic> {
        let file = ParsedFile::from_source("test.js", code);
        NoIgnoredReturn::new().check(&file)
    }

    #[test]
    fn statement_position_call_reported() {
        let diagnostics = run_rule("fetchData(url);");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message_id.as_deref(),
            Some("returnValueUnhandled")
        );
        assert_eq!(
            diagnostics[0].data.get("callee").map(String::as_str),
            Some("fetchData")
        );
    }

    #[test]
    fn consumed_results_are_clean() {
        let code = r#"
const a = build();
let b;
b = build();
const c = build() + 1;
const d = [...build()];
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn void_discard_is_clean() {
        assert!(run_rule("void saveRecord(r);").is_empty());
    }

    #[test]
    fn awaited_call_is_clean() {
        let code = "async function g() { await save(); }";
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn console_is_allowlisted_by_default() {
        assert!(run_rule("console.log('hi'); console.error(err);").is_empty());
    }

    #[test]
    fn custom_ignored_callee() {
        let file = ParsedFile::from_source("test.js", "emit('ready'); bus.emit('ready');");
        let rule = NoIgnoredReturn::with_options(NoIgnoredReturnOptions {
            ignored_callees: vec!["emit".to_string(), "bus.emit".to_string()],
        });
        assert!(rule.check(&file).is_empty());
    }

    #[test]
    fn sentinel_on_same_line_is_clean() {
        assert!(run_rule("warmCache(); // sable-expect-no-use").is_empty());
    }

    #[test]
    fn sentinel_on_line_above_is_clean() {
        let code = r#"
// sable-expect-no-use
warmCache();
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn sentinel_elsewhere_does_not_help() {
        let code = r#"
// sable-expect-no-use

warmCache();
"#;
        assert_eq!(run_rule(code).len(), 1);
    }

    #[test]
    fn same_file_void_function_skipped() {
        let code = r#"
function tick() {
    if (stopped) return;
    console.log("tick");
}
tick();
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn same_file_value_function_reported() {
        let code = r#"
function total() {
    return items.length;
}
total();
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].data.get("callee").map(String::as_str),
            Some("total")
        );
    }

    #[test]
    fn nested_function_return_does_not_make_parent_value_bearing() {
        let code = r#"
function install() {
    register(function () {
        return 42;
    });
}
install();
"#;
        // install itself never returns a value
        let diagnostics = run_rule(code);
        assert!(diagnostics.iter().all(|d| {
            d.data.get("callee").map(String::as_str) != Some("install")
        }));
    }

    #[test]
    fn member_call_reports_full_path() {
        let diagnostics = run_rule("api.users.fetch(id);");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].data.get("callee").map(String::as_str),
            Some("api.users.fetch")
        );
    }

    #[test]
    fn optional_call_in_statement_position_reported() {
        let diagnostics = run_rule("maybe?.run();");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].data.get("callee").map(String::as_str),
            Some("maybe?.run")
        );
    }

    #[test]
    fn calls_inside_function_bodies_checked() {
        let code = r#"
function handler() {
    computeDigest(payload);
}
"#;
        assert_eq!(run_rule(code).len(), 1);
    }

    #[test]
    fn calls_inside_constructor_checked() {
        let code = r#"
class Widget {
    constructor(seed) {
        computeDigest(seed);
    }
}
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].data.get("callee").map(String::as_str),
            Some("computeDigest")
        );
    }

    #[test]
    fn calls_inside_static_block_checked() {
        let code = r#"
class Registry {
    static {
        loadDefaults();
    }
}
"#;
        assert_eq!(run_rule(code).len(), 1);
    }

    #[test]
    fn long_member_path_is_capped() {
        let code = "alpha.bravo.charlie.delta.echo.foxtrot.golf.hotel(x);";
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        let callee = diagnostics[0].data.get("callee").unwrap();
        assert!(callee.ends_with("..."));
        assert!(callee.chars().count() <= MAX_CALLEE_TEXT + 3);
    }
}
