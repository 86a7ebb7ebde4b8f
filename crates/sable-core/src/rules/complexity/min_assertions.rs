//! C006: min-assertions
//!
//! A test body with no assertions passes no matter what the code under
//! test does. Counts `expect`/`assert` calls per `it`/`test` callback.
//! Only files with a test-file naming convention are inspected.

use std::ops::ControlFlow;

use serde::Deserialize;
use swc_ecma_ast::{BlockStmtOrExpr, CallExpr, Callee, Expr, Lit, MemberProp, Stmt, VarDeclOrExpr};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::helpers::{is_test_file, unwrap_expr};
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MinAssertionsOptions {
    pub min_assertions: usize,
}

impl Default for MinAssertionsOptions {
    fn default() -> Self {
        Self { min_assertions: 1 }
    }
}

declare_rule!(
    MinAssertions,
    id = "C006",
    name = "min-assertions",
    description = "Tests without assertions always pass and document nothing",
    category = Complexity,
    severity = Warning,
    options = MinAssertionsOptions,
    examples = r#"
// Bad: nothing is verified
it("saves the user", async () => {
    await saveUser(user);
});

// Good
it("saves the user", async () => {
    await saveUser(user);
    expect(store.get(user.id)).toEqual(user);
});
"#
);

impl Rule for MinAssertions {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        if !is_test_file(&file.metadata().filename) {
            return Vec::new();
        }

        let mut visitor = AssertionVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            min: self.options.min_assertions,
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

struct AssertionVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    min: usize,
}

impl AstVisitor for AssertionVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        if !is_test_call(node) {
            return ControlFlow::Continue(());
        }

        let Some(callback) = node
            .args
            .iter()
            .map(|arg| unwrap_expr(&arg.expr))
            .find(|expr| matches!(expr, Expr::Fn(_) | Expr::Arrow(_)))
        else {
            return ControlFlow::Continue(());
        };

        let mut count = 0usize;
        match callback {
            Expr::Fn(fn_expr) => {
                if let Some(body) = &fn_expr.function.body {
                    for s in &body.stmts {
                        count_assertions_in_stmt(s, &mut count);
                    }
                }
            }
            Expr::Arrow(arrow) => match arrow.body.as_ref() {
                BlockStmtOrExpr::BlockStmt(block) => {
                    for s in &block.stmts {
                        count_assertions_in_stmt(s, &mut count);
                    }
                }
                BlockStmtOrExpr::Expr(body) => count_assertions_in_expr(body, &mut count),
            },
            _ => unreachable!(),
        }

        if count < self.min {
            let name = test_title(node);
            let diagnostic = ctx
                .report(
                    self.metadata,
                    node.span,
                    format!(
                        "Test '{}' makes {} assertions, fewer than the minimum of {}",
                        name, count, self.min
                    ),
                )
                .with_message_id("tooFewAssertions")
                .with_data("name", name)
                .with_data("count", count.to_string())
                .with_data("min", self.min.to_string())
                .with_suggestion("Assert on the observable outcome of the code under test");

            self.diagnostics.push(diagnostic);
        }

        ControlFlow::Continue(())
    }
}

/// `it(...)`, `test(...)`, and their `.only` variants. `.skip` tests do
/// not run, so they are not held to the assertion minimum.
fn is_test_call(call: &CallExpr) -> bool {
    let Some(callee) = call.callee.as_expr() else {
        return false;
    };
    match unwrap_expr(callee) {
        Expr::Ident(ident) => matches!(ident.sym.as_ref(), "it" | "test"),
        Expr::Member(member) => {
            let base_is_test = matches!(
                unwrap_expr(&member.obj),
                Expr::Ident(ident) if matches!(ident.sym.as_ref(), "it" | "test")
            );
            let prop_is_only = matches!(&member.prop, MemberProp::Ident(i) if i.sym.as_ref() == "only");
            base_is_test && prop_is_only
        }
        _ => false,
    }
}

fn test_title(call: &CallExpr) -> String {
    match call.args.first().map(|arg| unwrap_expr(&arg.expr)) {
        Some(Expr::Lit(Lit::Str(s))) => s.value.to_string(),
        Some(Expr::Tpl(tpl)) if tpl.exprs.is_empty() && tpl.quasis.len() == 1 => {
            tpl.quasis[0].raw.to_string()
        }
        _ => "<anonymous>".to_string(),
    }
}

fn is_assertion_call(call: &CallExpr) -> bool {
    let Some(callee) = call.callee.as_expr() else {
        return false;
    };
    match unwrap_expr(callee) {
        Expr::Ident(ident) => matches!(ident.sym.as_ref(), "expect" | "assert"),
        Expr::Member(member) => matches!(
            unwrap_expr(&member.obj),
            Expr::Ident(ident) if ident.sym.as_ref() == "assert"
        ),
        _ => false,
    }
}

fn count_assertions_in_stmt(stmt: &Stmt, count: &mut usize) {
    match stmt {
        Stmt::Expr(expr_stmt) => count_assertions_in_expr(&expr_stmt.expr, count),
        Stmt::Block(block) => {
            for s in &block.stmts {
                count_assertions_in_stmt(s, count);
            }
        }
        Stmt::If(if_stmt) => {
            count_assertions_in_expr(&if_stmt.test, count);
            count_assertions_in_stmt(&if_stmt.cons, count);
            if let Some(alt) = &if_stmt.alt {
                count_assertions_in_stmt(alt, count);
            }
        }
        Stmt::Return(ret) => {
            if let Some(arg) = &ret.arg {
                count_assertions_in_expr(arg, count);
            }
        }
        Stmt::While(while_stmt) => count_assertions_in_stmt(&while_stmt.body, count),
        Stmt::DoWhile(do_while) => count_assertions_in_stmt(&do_while.body, count),
        Stmt::For(for_stmt) => {
            if let Some(VarDeclOrExpr::Expr(expr)) = &for_stmt.init {
                count_assertions_in_expr(expr, count);
            }
            count_assertions_in_stmt(&for_stmt.body, count);
        }
        Stmt::ForIn(for_in) => count_assertions_in_stmt(&for_in.body, count),
        Stmt::ForOf(for_of) => count_assertions_in_stmt(&for_of.body, count),
        Stmt::Switch(switch) => {
            for case in &switch.cases {
                for s in &case.cons {
                    count_assertions_in_stmt(s, count);
                }
            }
        }
        Stmt::Try(try_stmt) => {
            for s in &try_stmt.block.stmts {
                count_assertions_in_stmt(s, count);
            }
            if let Some(handler) = &try_stmt.handler {
                for s in &handler.body.stmts {
                    count_assertions_in_stmt(s, count);
                }
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                for s in &finalizer.stmts {
                    count_assertions_in_stmt(s, count);
                }
            }
        }
        Stmt::Labeled(labeled) => count_assertions_in_stmt(&labeled.body, count),
        Stmt::Decl(swc_ecma_ast::Decl::Var(var)) => {
            for declarator in &var.decls {
                if let Some(init) = &declarator.init {
                    count_assertions_in_expr(init, count);
                }
            }
        }
        _ => {}
    }
}

fn count_assertions_in_expr(expr: &Expr, count: &mut usize) {
    match expr {
        Expr::Call(call) => {
            // a nested it/test keeps its own assertion budget
            if is_test_call(call) {
                return;
            }
            if is_assertion_call(call) {
                *count += 1;
            }
            if let Callee::Expr(callee) = &call.callee {
                count_assertions_in_expr(callee, count);
            }
            for arg in &call.args {
                count_assertions_in_expr(&arg.expr, count);
            }
        }
        Expr::Member(member) => count_assertions_in_expr(&member.obj, count),
        Expr::Await(await_expr) => count_assertions_in_expr(&await_expr.arg, count),
        Expr::Paren(paren) => count_assertions_in_expr(&paren.expr, count),
        Expr::Bin(bin) => {
            count_assertions_in_expr(&bin.left, count);
            count_assertions_in_expr(&bin.right, count);
        }
        Expr::Unary(unary) => count_assertions_in_expr(&unary.arg, count),
        Expr::Cond(cond) => {
            count_assertions_in_expr(&cond.test, count);
            count_assertions_in_expr(&cond.cons, count);
            count_assertions_in_expr(&cond.alt, count);
        }
        Expr::Seq(seq) => {
            for e in &seq.exprs {
                count_assertions_in_expr(e, count);
            }
        }
        Expr::Assign(assign) => count_assertions_in_expr(&assign.right, count),
        // helper closures inside the test still assert for it
        Expr::Arrow(arrow) => match arrow.body.as_ref() {
            BlockStmtOrExpr::BlockStmt(block) => {
                for s in &block.stmts {
                    count_assertions_in_stmt(s, count);
                }
            }
            BlockStmtOrExpr::Expr(body) => count_assertions_in_expr(body, count),
        },
        Expr::Fn(fn_expr) => {
            if let Some(body) = &fn_expr.function.body {
                for s in &body.stmts {
                    count_assertions_in_stmt(s, count);
                }
            }
        }
        Expr::OptChain(opt) => match &*opt.base {
            swc_ecma_ast::OptChainBase::Member(member) => {
                count_assertions_in_expr(&member.obj, count);
            }
            swc_ecma_ast::OptChainBase::Call(call) => {
                count_assertions_in_expr(&call.callee, count);
                for arg in &call.args {
                    count_assertions_in_expr(&arg.expr, count);
                }
            }
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_rule(code: &str) -> Vec<Diagnostic> {
        let file = ParsedFile::from_source("widget.test.js", code);
        MinAssertions::new().check(&file)
    }

    #[test]
    fn test_with_expect_is_clean() {
        let code = r#"
it("adds", () => {
    expect(add(1, 2)).toBe(3);
});
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn assertion_free_test_reported() {
        let code = r#"
it("saves the user", async () => {
    await saveUser(user);
});
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message_id.as_deref(),
            Some("tooFewAssertions")
        );
        assert_eq!(
            diagnostics[0].data.get("name").map(String::as_str),
            Some("saves the user")
        );
        assert_eq!(diagnostics[0].data.get("count").map(String::as_str), Some("0"));
        assert_eq!(diagnostics[0].data.get("min").map(String::as_str), Some("1"));
    }

    #[test]
    fn assert_member_calls_count() {
        let code = r#"
test("node assert style", () => {
    assert.strictEqual(add(1, 2), 3);
});
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn assertions_in_helper_closures_count() {
        let code = r#"
it("checks every item", () => {
    items.forEach((item) => {
        expect(item.id).toBeDefined();
    });
});
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn nested_test_assertions_do_not_leak_out() {
        let code = r#"
it("outer has none of its own", () => {
    it("inner asserts", () => {
        expect(1).toBe(1);
    });
});
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].data.get("name").map(String::as_str),
            Some("outer has none of its own")
        );
    }

    #[test]
    fn custom_minimum_applies() {
        let code = r#"
it("single assertion", () => {
    expect(result).toBe(1);
});
"#;
        let file = ParsedFile::from_source("widget.test.js", code);
        let rule = MinAssertions::with_options(MinAssertionsOptions { min_assertions: 2 });
        let diagnostics = rule.check(&file);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].data.get("count").map(String::as_str), Some("1"));
    }

    #[test]
    fn skip_variant_ignored() {
        let code = r#"
it.skip("not running", () => {
    doNothing();
});
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn only_variant_checked() {
        let code = r#"
it.only("focused but empty", () => {
    doNothing();
});
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn non_test_files_are_skipped() {
        let code = r#"
it("looks like a test", () => {
    doNothing();
});
"#;
        let file = ParsedFile::from_source("widget.js", code);
        assert!(MinAssertions::new().check(&file).is_empty());
    }

    #[test]
    fn non_test_calls_ignored() {
        let code = "setup(); run(); teardown();";
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn test_without_callback_ignored() {
        let code = r#"it("todo");"#;
        assert!(run_rule(code).is_empty());
    }
}
