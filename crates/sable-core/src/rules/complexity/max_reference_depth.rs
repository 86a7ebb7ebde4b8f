//! C005: max-reference-depth
//!
//! Measures outermost property chains. Deep chains couple the code to
//! the full shape of a foreign object; un-guarded links on the way
//! down are a TypeError waiting for the first null.

use std::collections::HashSet;
use std::ops::ControlFlow;

use serde::Deserialize;
use swc_ecma_ast::{
    CallExpr, Decl, Expr, MemberExpr, ModuleDecl, ModuleItem, OptChainBase, OptChainExpr, Pat,
    Stmt, VarDecl,
};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::helpers::{
    ChainBase, MemberChain, flatten_member_chain, flatten_member_expr, flatten_opt_member_expr,
    unwrap_expr,
};
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MaxReferenceDepthOptions {
    pub max_depth: usize,
    pub require_optional_chaining: bool,
    pub allow_single_property_access: bool,
    pub check_call_expressions: bool,
    pub allowed_globals: Vec<String>,
    pub ignored_bases: Vec<String>,
}

impl Default for MaxReferenceDepthOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            require_optional_chaining: true,
            allow_single_property_access: true,
            check_call_expressions: false,
            allowed_globals: [
                "window",
                "globalThis",
                "global",
                "self",
                "document",
                "console",
                "process",
                "Math",
                "JSON",
                "Object",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ignored_bases: Vec::new(),
        }
    }
}

declare_rule!(
    MaxReferenceDepth,
    id = "C005",
    name = "max-reference-depth",
    description = "Deep property chains violate the Law of Demeter and break loudly when any intermediate value is missing",
    category = Complexity,
    severity = Warning,
    options = MaxReferenceDepthOptions,
    examples = r#"
// Bad: four links, any of which can be undefined
const city = order.customer.address.city.name;

// Good: destructure near the source, guard the hops
const { address } = order.customer ?? {};
const city = address?.city?.name;
"#
);

impl Rule for MaxReferenceDepth {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let imported = file
            .module()
            .map(collect_imported_bindings)
            .unwrap_or_default();

        let mut visitor = ReferenceDepthVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            options: &self.options,
            imported,
            handled_spans: HashSet::new(),
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

struct ReferenceDepthVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    options: &'a MaxReferenceDepthOptions,
    imported: HashSet<String>,
    /// Spans of member accesses already consumed: links of a measured
    /// chain, and callees of invoked chains. Preorder visiting makes
    /// the outermost access claim its sub-chain first.
    handled_spans: HashSet<(u32, u32)>,
}

impl ReferenceDepthVisitor<'_> {
    fn claim(&mut self, span: swc_common::Span) -> bool {
        self.handled_spans.insert((span.lo.0, span.hi.0))
    }

    fn claim_chain_links(&mut self, chain: &MemberChain) {
        for link in &chain.links {
            self.handled_spans.insert((link.span.lo.0, link.span.hi.0));
        }
    }

    /// Mark an invoked chain (`a.b.c()`) so its member accesses are not
    /// measured as standalone chains.
    fn skip_callee(&mut self, callee: &Expr) {
        if let Some(chain) = flatten_member_chain(callee) {
            self.claim_chain_links(&chain);
        }
    }

    fn check_chain_head(
        &mut self,
        chain: &MemberChain,
        head_span: swc_common::Span,
        ctx: &VisitorContext,
    ) {
        self.claim_chain_links(chain);

        if self.is_exempt_base(&chain.base) {
            return;
        }

        let depth = chain.depth();
        let path = chain.path();

        if depth > self.options.max_depth {
            let diagnostic = ctx
                .report(
                    self.metadata,
                    head_span,
                    format!(
                        "Property chain '{}' is {} links deep, more than the maximum of {}",
                        path, depth, self.options.max_depth
                    ),
                )
                .with_message_id("tooDeep")
                .with_data("path", path)
                .with_data("chainDepth", depth.to_string())
                .with_data("max", self.options.max_depth.to_string())
                .with_suggestion("Destructure intermediate values closer to their source");

            self.diagnostics.push(diagnostic);
            return;
        }

        if !self.options.require_optional_chaining {
            return;
        }
        if self.options.allow_single_property_access && depth == 1 {
            return;
        }

        if let Some(link) = chain.links.iter().find(|link| !link.optional) {
            let property = link
                .name
                .clone()
                .unwrap_or_else(|| "[computed]".to_string());
            let diagnostic = ctx
                .report(
                    self.metadata,
                    link.span,
                    format!(
                        "Property '{}' in '{}' is accessed without optional chaining",
                        property, path
                    ),
                )
                .with_message_id("missingOptionalChaining")
                .with_data("property", property)
                .with_data("path", path)
                .with_suggestion("Use ?. so a missing intermediate value short-circuits");

            self.diagnostics.push(diagnostic);
        }
    }

    fn is_exempt_base(&self, base: &ChainBase) -> bool {
        match base {
            ChainBase::Ident(ident) => {
                let name = ident.sym.as_ref();
                name == "module"
                    || name == "exports"
                    || self.options.allowed_globals.iter().any(|g| g == name)
                    || self.options.ignored_bases.iter().any(|b| b == name)
                    || self.imported.contains(name)
            }
            ChainBase::This(_) => true,
            ChainBase::Call(_) | ChainBase::Other(_) => false,
        }
    }
}

impl AstVisitor for ReferenceDepthVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        if !self.options.check_call_expressions {
            if let Some(callee) = node.callee.as_expr() {
                self.skip_callee(unwrap_expr(callee));
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_member_expr(&mut self, node: &MemberExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        if !self.handled_spans.contains(&(node.span.lo.0, node.span.hi.0)) {
            let chain = flatten_member_expr(node);
            self.check_chain_head(&chain, node.span, ctx);
        }
        ControlFlow::Continue(())
    }

    fn visit_opt_chain_expr(
        &mut self,
        node: &OptChainExpr,
        ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        match &*node.base {
            OptChainBase::Member(_) => {
                if !self.handled_spans.contains(&(node.span.lo.0, node.span.hi.0)) {
                    if let Some(chain) = flatten_opt_member_expr(node) {
                        self.check_chain_head(&chain, node.span, ctx);
                    }
                }
            }
            OptChainBase::Call(call) => {
                if !self.options.check_call_expressions {
                    self.skip_callee(unwrap_expr(&call.callee));
                }
            }
        }
        ControlFlow::Continue(())
    }
}

/// Names bound by `import` declarations and `require(...)` calls.
/// Chains rooted at a module binding describe this module's own
/// dependencies rather than a runtime data shape.
fn collect_imported_bindings(module: &swc_ecma_ast::Module) -> HashSet<String> {
    let mut bindings = HashSet::new();

    for item in &module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                for specifier in &import.specifiers {
                    match specifier {
                        swc_ecma_ast::ImportSpecifier::Named(named) => {
                            bindings.insert(named.local.sym.to_string());
                        }
                        swc_ecma_ast::ImportSpecifier::Default(default) => {
                            bindings.insert(default.local.sym.to_string());
                        }
                        swc_ecma_ast::ImportSpecifier::Namespace(ns) => {
                            bindings.insert(ns.local.sym.to_string());
                        }
                    }
                }
            }
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                collect_require_bindings(var, &mut bindings);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                if let Decl::Var(var) = &export.decl {
                    collect_require_bindings(var, &mut bindings);
                }
            }
            _ => {}
        }
    }

    bindings
}

fn collect_require_bindings(var: &VarDecl, bindings: &mut HashSet<String>) {
    for declarator in &var.decls {
        let Some(init) = &declarator.init else {
            continue;
        };
        if !is_require_call(unwrap_expr(init)) {
            continue;
        }
        match &declarator.name {
            Pat::Ident(ident) => {
                bindings.insert(ident.id.sym.to_string());
            }
            Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        swc_ecma_ast::ObjectPatProp::Assign(assign) => {
                            bindings.insert(assign.key.sym.to_string());
                        }
                        swc_ecma_ast::ObjectPatProp::KeyValue(kv) => {
                            if let Pat::Ident(ident) = kv.value.as_ref() {
                                bindings.insert(ident.id.sym.to_string());
                            }
                        }
                        swc_ecma_ast::ObjectPatProp::Rest(_) => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_require_call(expr: &Expr) -> bool {
    let Expr::Call(call) = expr else {
        return false;
    };
    matches!(
        call.callee.as_expr().map(|c| unwrap_expr(c)),
        Some(Expr::Ident(ident)) if ident.sym.as_ref() == "require"
    )
}
