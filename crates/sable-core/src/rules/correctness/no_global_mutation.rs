//! R004: no-global-mutation
//!
//! Flags assignments through a global object (`window.foo = ...`).
//! A local binding that shadows the global name makes the assignment
//! ordinary, so the scope model is consulted before reporting.

use std::ops::ControlFlow;

use serde::Deserialize;
use swc_ecma_ast::{
    AssignExpr, AssignTarget, Expr, Ident, Lit, MemberExpr, MemberProp, SimpleAssignTarget,
};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::helpers::unwrap_expr;
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::semantic::{ScopeBuilder, SemanticModel};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NoGlobalMutationOptions {
    pub global_objects: Vec<String>,
}

impl Default for NoGlobalMutationOptions {
    fn default() -> Self {
        Self {
            global_objects: ["window", "globalThis", "global", "self"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

declare_rule!(
    NoGlobalMutation,
    id = "R004",
    name = "no-global-mutation",
    description = "Writes to global objects create hidden coupling between otherwise unrelated modules",
    category = Correctness,
    severity = Warning,
    options = NoGlobalMutationOptions,
    examples = r#"
// Bad
window.currentUser = user;

// Good: pass state explicitly or keep it in a module
export const session = { currentUser: null };
"#
);

impl Rule for NoGlobalMutation {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let Some(module) = file.module() else {
            return Vec::new();
        };

        let model = ScopeBuilder::build(module);
        let mut visitor = GlobalMutationVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            options: &self.options,
            model,
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

struct GlobalMutationVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    options: &'a NoGlobalMutationOptions,
    model: SemanticModel,
}

impl GlobalMutationVisitor<'_> {
    fn is_global_here(&self, ident: &Ident) -> bool {
        let name = ident.sym.as_ref();
        if !self.options.global_objects.iter().any(|g| g == name) {
            return false;
        }

        // a local binding of the same name shadows the global
        let shadowed = self
            .model
            .scope_tree
            .narrowest_scope_at(ident.span.lo.0)
            .and_then(|scope| {
                self.model
                    .symbol_table
                    .lookup(name, scope, &self.model.scope_tree)
            })
            .is_some();

        !shadowed
    }
}

impl AstVisitor for GlobalMutationVisitor<'_> {
    fn visit_assign_expr(&mut self, node: &AssignExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &node.left else {
            return ControlFlow::Continue(());
        };

        let Some((base, first_prop)) = global_base_and_property(member) else {
            return ControlFlow::Continue(());
        };

        if !self.is_global_here(base) {
            return ControlFlow::Continue(());
        }

        let object = base.sym.to_string();
        let property = property_text(first_prop);
        let diagnostic = ctx
            .report(
                self.metadata,
                node.span,
                format!("Assignment mutates global '{}.{}'", object, property),
            )
            .with_message_id("noGlobalMutation")
            .with_data("object", object)
            .with_data("property", property)
            .with_suggestion("Keep the state in module scope and export an accessor");

        self.diagnostics.push(diagnostic);
        ControlFlow::Continue(())
    }
}

/// Walks `window.a.b.c` down to its base identifier and the property
/// accessed directly on it (`a`).
fn global_base_and_property(member: &MemberExpr) -> Option<(&Ident, &MemberProp)> {
    let mut current = member;
    loop {
        match unwrap_expr(&current.obj) {
            Expr::Ident(ident) => return Some((ident, &current.prop)),
            Expr::Member(inner) => current = inner,
            _ => return None,
        }
    }
}

fn property_text(prop: &MemberProp) -> String {
    match prop {
        MemberProp::Ident(ident) => ident.sym.to_string(),
        MemberProp::Computed(computed) => match unwrap_expr(&computed.expr) {
            Expr::Lit(Lit::Str(s)) => s.value.to_string(),
            _ => "[computed]".to_string(),
        },
        MemberProp::PrivateName(name) => format!("#{}", name.name),
    }
}
