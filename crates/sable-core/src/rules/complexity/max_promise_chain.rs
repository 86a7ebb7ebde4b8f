//! C003: max-promise-chain
//!
//! Counts maximal runs of consecutive `.then/.catch/.finally` calls.
//! Each chain is reported at most once, keyed by the span of the
//! expression the chain originates from.

use std::collections::HashSet;
use std::ops::ControlFlow;

use serde::Deserialize;
use swc_common::Spanned;
use swc_ecma_ast::{CallExpr, Expr, MemberProp, OptChainBase, OptChainExpr};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::helpers::unwrap_expr;
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

const CONTINUATION_METHODS: &[&str] = &["then", "catch", "finally"];
const MAX_ORIGIN_TEXT: usize = 40;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MaxPromiseChainOptions {
    pub max_promise_chain_length: usize,
}

impl Default for MaxPromiseChainOptions {
    fn default() -> Self {
        Self {
            max_promise_chain_length: 3,
        }
    }
}

declare_rule!(
    MaxPromiseChain,
    id = "C003",
    name = "max-promise-chain",
    description = "Long then/catch/finally chains are hard to reason about; async/await reads linearly",
    category = Complexity,
    severity = Warning,
    options = MaxPromiseChainOptions,
    examples = r#"
// Bad: four chained continuations
fetch(url)
    .then(parse)
    .then(validate)
    .then(store)
    .catch(report);

// Good: async/await
async function load() {
    try {
        const resp = await fetch(url);
        store(validate(parse(resp)));
    } catch (e) {
        report(e);
    }
}
"#
);

impl Rule for MaxPromiseChain {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut visitor = ChainVisitor {
            diagnostics: Vec::new(),
            metadata: &self.metadata,
            max: self.options.max_promise_chain_length,
            seen_origins: HashSet::new(),
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

struct ChainVisitor<'a> {
    diagnostics: Vec<Diagnostic>,
    metadata: &'a RuleMetadata,
    max: usize,
    /// Origin spans of chains already measured. The walk is preorder,
    /// so the outermost call of a chain registers the origin before any
    /// of its sub-chains fire.
    seen_origins: HashSet<(u32, u32)>,
}

impl ChainVisitor<'_> {
    fn check_chain_head(
        &mut self,
        first_receiver: &Expr,
        head_span: swc_common::Span,
        ctx: &VisitorContext,
    ) {
        let mut count = 1usize;
        let mut current = first_receiver;
        while let Some(receiver) = continuation_receiver(current) {
            count += 1;
            current = receiver;
        }

        let origin = unwrap_expr(current);
        let origin_span = origin.span();
        if !self.seen_origins.insert((origin_span.lo.0, origin_span.hi.0)) {
            return;
        }

        if count <= self.max {
            return;
        }

        let origin_text = render_origin(origin, ctx);
        let diagnostic = ctx
            .report(
                self.metadata,
                head_span,
                format!(
                    "Promise chain on '{}' has {} continuations, more than the maximum of {}",
                    origin_text, count, self.max
                ),
            )
            .with_message_id("tooManyThenCalls")
            .with_data("count", count.to_string())
            .with_data("max", self.max.to_string())
            .with_data("origin", origin_text)
            .with_suggestion("Convert the chain to async/await");

        self.diagnostics.push(diagnostic);
    }
}

impl AstVisitor for ChainVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr, ctx: &VisitorContext) -> ControlFlow<()> {
        if let Some(receiver) = call_continuation_receiver(node) {
            self.check_chain_head(receiver, node.span, ctx);
        }
        ControlFlow::Continue(())
    }

    fn visit_opt_chain_expr(
        &mut self,
        node: &OptChainExpr,
        ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        if let OptChainBase::Call(call) = &*node.base {
            if let Some(receiver) = member_continuation_receiver(&call.callee) {
                self.check_chain_head(receiver, node.span, ctx);
            }
        }
        ControlFlow::Continue(())
    }
}

fn is_continuation_name(prop: &MemberProp) -> bool {
    match prop {
        MemberProp::Ident(ident) => CONTINUATION_METHODS.contains(&ident.sym.as_ref()),
        _ => false,
    }
}

/// The receiver (`x` in `x.then(...)`) when the callee is a
/// continuation method access.
fn member_continuation_receiver(callee: &Expr) -> Option<&Expr> {
    match unwrap_expr(callee) {
        Expr::Member(member) if is_continuation_name(&member.prop) => Some(&member.obj),
        Expr::OptChain(opt) => match &*opt.base {
            OptChainBase::Member(member) if is_continuation_name(&member.prop) => {
                Some(&member.obj)
            }
            _ => None,
        },
        _ => None,
    }
}

fn call_continuation_receiver(call: &CallExpr) -> Option<&Expr> {
    member_continuation_receiver(call.callee.as_expr()?)
}

/// When `expr` is itself a continuation call, the expression it was
/// called on; `None` ends the chain.
fn continuation_receiver(expr: &Expr) -> Option<&Expr> {
    match unwrap_expr(expr) {
        Expr::Call(call) => call_continuation_receiver(call),
        Expr::OptChain(opt) => match &*opt.base {
            OptChainBase::Call(call) => member_continuation_receiver(&call.callee),
            _ => None,
        },
        _ => None,
    }
}

fn render_origin(origin: &Expr, ctx: &VisitorContext) -> String {
    let text = ctx
        .get_source_text(origin.span())
        .unwrap_or("<expression>")
        .trim()
        .to_string();

    if text.len() > MAX_ORIGIN_TEXT {
        let prefix: String = text.chars().take(MAX_ORIGIN_TEXT).collect();
        format!("{}...", prefix)
    } else {
        text
    }
}
