//! C001: max-nesting-depth
//!
//! Flags control-flow statements nested deeper than the configured
//! limit. Each function body is measured independently; nesting at
//! module level is never reported.

use std::ops::ControlFlow;

use serde::Deserialize;
use swc_common::Span;
use swc_ecma_ast::{ArrowExpr, BlockStmt, BlockStmtOrExpr, Function, Stmt};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MaxNestingDepthOptions {
    pub max_nesting_depth: usize,
}

impl Default for MaxNestingDepthOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 4,
        }
    }
}

declare_rule!(
    MaxNestingDepth,
    id = "C001",
    name = "max-nesting-depth",
    description = "Control flow nested too deeply is hard to follow and usually hides an extractable function",
    category = Complexity,
    severity = Warning,
    options = MaxNestingDepthOptions,
    examples = r#"
// Bad: five levels of control flow
function handle(items) {
    for (const item of items) {
        if (item.active) {
            for (const tag of item.tags) {
                if (tag.visible) {
                    if (tag.priority > 2) {
                        render(tag);
                    }
                }
            }
        }
    }
}

// Good: early returns and extracted helpers keep each level shallow
function handle(items) {
    for (const item of items) {
        if (!item.active) continue;
        renderVisibleTags(item.tags);
    }
}
"#
);

impl Rule for MaxNestingDepth {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = NestingVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            max: self.options.max_nesting_depth,
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

struct NestingVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    max: usize,
}

impl NestingVisitor<'_> {
    fn check_body(&mut self, stmts: &[Stmt], ctx: &VisitorContext) {
        for stmt in stmts {
            self.scan_stmt(stmt, 0, ctx);
        }
    }

    /// Depth counts enclosing if/loop/switch statements. Nested
    /// functions are not descended into; the walk delivers them as
    /// separate bodies starting back at zero.
    fn scan_stmt(&mut self, stmt: &Stmt, depth: usize, ctx: &VisitorContext) {
        match stmt {
            Stmt::If(if_stmt) => {
                self.entered(depth + 1, if_stmt.span, ctx);
                self.scan_stmt(&if_stmt.cons, depth + 1, ctx);
                if let Some(alt) = &if_stmt.alt {
                    if matches!(alt.as_ref(), Stmt::If(_)) {
                        // else-if chains stay at the level of the first if
                        self.scan_stmt(alt, depth, ctx);
                    } else {
                        self.scan_stmt(alt, depth + 1, ctx);
                    }
                }
            }
            Stmt::While(while_stmt) => {
                self.entered(depth + 1, while_stmt.span, ctx);
                self.scan_stmt(&while_stmt.body, depth + 1, ctx);
            }
            Stmt::DoWhile(do_while) => {
                self.entered(depth + 1, do_while.span, ctx);
                self.scan_stmt(&do_while.body, depth + 1, ctx);
            }
            Stmt::For(for_stmt) => {
                self.entered(depth + 1, for_stmt.span, ctx);
                self.scan_stmt(&for_stmt.body, depth + 1, ctx);
            }
            Stmt::ForIn(for_in) => {
                self.entered(depth + 1, for_in.span, ctx);
                self.scan_stmt(&for_in.body, depth + 1, ctx);
            }
            Stmt::ForOf(for_of) => {
                self.entered(depth + 1, for_of.span, ctx);
                self.scan_stmt(&for_of.body, depth + 1, ctx);
            }
            Stmt::Switch(switch) => {
                self.entered(depth + 1, switch.span, ctx);
                for case in &switch.cases {
                    for s in &case.cons {
                        self.scan_stmt(s, depth + 1, ctx);
                    }
                }
            }
            Stmt::Block(block) => {
                for s in &block.stmts {
                    self.scan_stmt(s, depth, ctx);
                }
            }
            Stmt::Labeled(labeled) => {
                self.scan_stmt(&labeled.body, depth, ctx);
            }
            Stmt::With(with) => {
                self.scan_stmt(&with.body, depth, ctx);
            }
            Stmt::Try(try_stmt) => {
                for s in &try_stmt.block.stmts {
                    self.scan_stmt(s, depth, ctx);
                }
                if let Some(handler) = &try_stmt.handler {
                    for s in &handler.body.stmts {
                        self.scan_stmt(s, depth, ctx);
                    }
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    for s in &finalizer.stmts {
                        self.scan_stmt(s, depth, ctx);
                    }
                }
            }
            _ => {}
        }
    }

    fn entered(&mut self, depth: usize, span: Span, ctx: &VisitorContext) {
        if depth != self.max + 1 {
            return;
        }

        let diagnostic = ctx
            .report(
                self.metadata,
                span,
                format!(
                    "Nesting depth of {} exceeds the maximum of {}",
                    depth, self.max
                ),
            )
            .with_message_id("excessiveNesting")
            .with_data("depth", depth.to_string())
            .with_data("max", self.max.to_string())
            .with_suggestion(
                "Extract the inner levels into a helper function or use early returns",
            );

        self.diagnostics.push(diagnostic);
    }
}

impl AstVisitor for NestingVisitor<'_> {
    fn visit_function(&mut self, node: &Function, ctx: &VisitorContext) -> ControlFlow<()> {
        if let Some(body) = &node.body {
            self.check_body(&body.stmts, ctx);
        }
        ControlFlow::Continue(())
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        if let BlockStmtOrExpr::BlockStmt(block) = node.body.as_ref() {
            self.check_body(&block.stmts, ctx);
        }
        ControlFlow::Continue(())
    }

    // constructors, static blocks, and object-literal accessors
    fn visit_block_body(&mut self, node: &BlockStmt, ctx: &VisitorContext) -> ControlFlow<()> {
        self.check_body(&node.stmts, ctx);
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_rule(code: &str) -> Vec<Diagnostic> {
        let file = ParsedFile::from_source("test.js", code);
        MaxNestingDepth::new().check(&file)
    }

    fn run_rule_with_max(code: &str, max: usize) -> Vec<Diagnostic> {
        let file = ParsedFile::from_source("test.js", code);
        MaxNestingDepth::with_options(MaxNestingDepthOptions {
            max_nesting_depth: max,
        })
        .check(&file)
    }

    #[test]
    fn shallow_function_is_clean() {
        let code = r#"
function f(x) {
    if (x) {
        for (const y of x) {
            log(y);
        }
    }
}
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn reports_fifth_level() {
        let code = r#"
function f(items) {
    for (const a of items) {
        if (a) {
            for (const b of a) {
                if (b) {
                    if (b.deep) {
                        use(b);
                    }
                }
            }
        }
    }
}
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "C001");
        assert_eq!(
            diagnostics[0].message_id.as_deref(),
            Some("excessiveNesting")
        );
        assert_eq!(diagnostics[0].data.get("depth").map(String::as_str), Some("5"));
        assert_eq!(diagnostics[0].data.get("max").map(String::as_str), Some("4"));
    }

    #[test]
    fn custom_max_applies() {
        let code = r#"
function f(x) {
    if (x) {
        if (x.y) {
            use(x.y);
        }
    }
}
"#;
        let diagnostics = run_rule_with_max(code, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].data.get("depth").map(String::as_str), Some("2"));
    }

    #[test]
    fn module_level_nesting_not_reported() {
        let code = r#"
if (a) {
    if (b) {
        if (c) {
            if (d) {
                if (e) {
                    go();
                }
            }
        }
    }
}
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn nested_function_resets_depth() {
        let code = r#"
function outer(items) {
    if (items) {
        if (items.length) {
            const inner = function (x) {
                if (x) {
                    if (x.y) {
                        use(x);
                    }
                }
            };
            inner(items[0]);
        }
    }
}
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn arrow_body_is_measured() {
        let code = r#"
const f = (items) => {
    for (const a of items) {
        if (a) {
            for (const b of a) {
                if (b) {
                    if (b.c) {
                        use(b);
                    }
                }
            }
        }
    }
};
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn constructor_body_is_measured() {
        let code = r#"
class Loader {
    constructor(entries) {
        for (const entry of entries) {
            if (entry.valid) {
                use(entry);
            }
        }
    }
}
"#;
        let diagnostics = run_rule_with_max(code, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].data.get("depth").map(String::as_str), Some("2"));
    }

    #[test]
    fn else_if_chain_does_not_accumulate() {
        let code = r#"
function classify(x) {
    if (x === 1) {
        return "one";
    } else if (x === 2) {
        return "two";
    } else if (x === 3) {
        return "three";
    } else if (x === 4) {
        return "four";
    } else if (x === 5) {
        return "five";
    }
    return "many";
}
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn try_does_not_add_depth() {
        let code = r#"
function f(items) {
    try {
        for (const a of items) {
            if (a) {
                for (const b of a) {
                    if (b) {
                        use(b);
                    }
                }
            }
        }
    } catch (e) {
        report(e);
    }
}
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn one_report_per_crossing_branch() {
        let code = r#"
function f(x) {
    if (x) {
        if (x.a) {
            use(x.a);
        }
        if (x.b) {
            use(x.b);
        }
    }
}
"#;
        let diagnostics = run_rule_with_max(code, 1);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn unparsable_file_yields_nothing() {
        assert!(run_rule("function {").is_empty());
    }
}
