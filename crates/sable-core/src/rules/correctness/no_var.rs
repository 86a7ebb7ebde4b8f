//! R005: no-var
//!
//! `var` hoists to function scope and tolerates redeclaration; `let`
//! and `const` behave like the block scoping the code visually implies.

use std::ops::ControlFlow;

use swc_ecma_ast::{Pat, VarDecl, VarDeclKind};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

declare_rule!(
    NoVar,
    id = "R005",
    name = "no-var",
    description = "var declarations hoist to function scope; prefer let or const",
    category = Correctness,
    severity = Warning,
    examples = r#"
// Bad
var count = 0;

// Good
let count = 0;
"#
);

impl Rule for NoVar {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = VarVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
        };

        let _ = walk_ast(&mut visitor, file);
        visitor.diagnostics
    }
}

struct VarVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
}

impl AstVisitor for VarVisitor<'_> {
    fn visit_var_decl(&mut self, node: &VarDecl, ctx: &VisitorContext) -> ControlFlow<()> {
        if node.kind != VarDeclKind::Var {
            return ControlFlow::Continue(());
        }

        let name = node
            .decls
            .first()
            .and_then(|declarator| first_declared_name(&declarator.name))
            .unwrap_or_else(|| "<destructured>".to_string());

        let diagnostic = ctx
            .report(
                self.metadata,
                node.span,
                format!("'{}' is declared with var", name),
            )
            .with_message_id("preferBlockScoped")
            .with_data("name", name)
            .with_suggestion("Use let, or const when the binding is never reassigned");

        self.diagnostics.push(diagnostic);
        ControlFlow::Continue(())
    }
}

fn first_declared_name(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(ident) => Some(ident.id.sym.to_string()),
        Pat::Assign(assign) => first_declared_name(&assign.left),
        Pat::Array(array) => array
            .elems
            .iter()
            .flatten()
            .find_map(first_declared_name),
        Pat::Object(object) => object.props.iter().find_map(|prop| match prop {
            swc_ecma_ast::ObjectPatProp::Assign(assign) => Some(assign.key.sym.to_string()),
            swc_ecma_ast::ObjectPatProp::KeyValue(kv) => first_declared_name(&kv.value),
            swc_ecma_ast::ObjectPatProp::Rest(rest) => first_declared_name(&rest.arg),
        }),
        Pat::Rest(rest) => first_declared_name(&rest.arg),
        _ => None,
    }
}
