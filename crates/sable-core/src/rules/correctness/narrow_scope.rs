//! R003: prefer-narrower-scope
//!
//! A module-level binding whose every use sits inside one function
//! could be declared in that function instead. Bindings used at module
//! level, shared between functions, imported, or exported stay put.

use swc_common::Span;

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::semantic::{DeclarationKind, ScopeBuilder, ScopeId, SemanticModel, Symbol};
use crate::visitor::VisitorContext;

declare_rule!(
    PreferNarrowerScope,
    id = "R003",
    name = "prefer-narrower-scope",
    description = "Module-level bindings used by a single function belong inside that function",
    category = Correctness,
    severity = Info,
    examples = r#"
// Bad: `seen` leaks into module scope
const seen = new Set();
function dedupe(items) {
    return items.filter((x) => !seen.has(x) && seen.add(x));
}

// Good
function dedupe(items) {
    const seen = new Set();
    return items.filter((x) => !seen.has(x) && seen.add(x));
}
"#
);

impl Rule for PreferNarrowerScope {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let Some(module) = file.module() else {
            return Vec::new();
        };

        let model = ScopeBuilder::build(module);
        let Some(root) = model.scope_tree.root() else {
            return Vec::new();
        };

        let ctx = VisitorContext::new(file);
        let mut diagnostics = Vec::new();

        for symbol in model.symbol_table.all_symbols() {
            if symbol.scope != root {
                continue;
            }
            if symbol.declaration_kind == DeclarationKind::Import || symbol.is_exported {
                continue;
            }

            let Some(target) = sole_using_function(symbol, &model) else {
                continue;
            };

            // the candidate function must sit directly in the declaring
            // scope, otherwise the move crosses another function
            if model.scope_tree.nearest_non_block_ancestor(target) != Some(root) {
                continue;
            }

            let function = model
                .scope_tree
                .get(target)
                .name
                .clone()
                .unwrap_or_else(|| "<anonymous>".to_string());

            diagnostics.push(
                ctx.report(
                    &self.metadata,
                    symbol.span,
                    format!("'{}' is only used inside '{}'", symbol.name, function),
                )
                .with_message_id("moveToNarrowerScope")
                .with_data("name", symbol.name.clone())
                .with_data("function", function)
                .with_suggestion("Move the declaration into the function that uses it"),
            );
        }

        diagnostics
    }
}

/// The single function scope containing every non-initializing
/// reference of `symbol`, or `None` when there are no such references,
/// a reference sits outside all functions, or uses are split across
/// functions.
fn sole_using_function(symbol: &Symbol, model: &SemanticModel) -> Option<ScopeId> {
    let uses: Vec<Span> = symbol
        .references
        .iter()
        .copied()
        .filter(|reference| !symbol.is_initializing_reference(*reference))
        .collect();
    if uses.is_empty() {
        return None;
    }

    let mut target: Option<ScopeId> = None;
    for reference in uses {
        let scope = model.scope_tree.narrowest_scope_at(reference.lo.0)?;
        let fn_scope = model.scope_tree.nearest_function_scope(scope)?;
        match target {
            None => target = Some(fn_scope),
            Some(existing) if existing == fn_scope => {}
            Some(_) => return None,
        }
    }

    target
}
