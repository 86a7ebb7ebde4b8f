//! Shared helper functions for rule implementations.

use swc_common::Span;
use swc_ecma_ast::{Callee, Expr, MemberExpr, MemberProp, OptChainBase, OptChainExpr};

/// Strip parentheses and TypeScript assertion wrappers that do not
/// change the runtime value of an expression.
pub fn unwrap_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_expr(&paren.expr),
        Expr::TsNonNull(inner) => unwrap_expr(&inner.expr),
        Expr::TsAs(inner) => unwrap_expr(&inner.expr),
        Expr::TsConstAssertion(inner) => unwrap_expr(&inner.expr),
        Expr::TsSatisfies(inner) => unwrap_expr(&inner.expr),
        Expr::TsTypeAssertion(inner) => unwrap_expr(&inner.expr),
        _ => expr,
    }
}

/// The textual name of a member property, when it has one.
/// Computed properties (`obj[key]`) have no static name.
pub fn member_prop_name(prop: &MemberProp) -> Option<String> {
    match prop {
        MemberProp::Ident(ident) => Some(ident.sym.to_string()),
        MemberProp::PrivateName(name) => Some(format!("#{}", name.name)),
        MemberProp::Computed(_) => None,
    }
}

/// The name a call resolves to for recursion and return-value checks:
/// the identifier for `foo()`, the final property for `obj.foo()` and
/// `obj?.foo()`. `None` for computed or expression callees.
pub fn callee_name(callee: &Callee) -> Option<String> {
    let expr = callee.as_expr()?;
    match unwrap_expr(expr) {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => member_prop_name(&member.prop),
        Expr::OptChain(opt) => match &*opt.base {
            OptChainBase::Member(member) => member_prop_name(&member.prop),
            OptChainBase::Call(_) => None,
        },
        _ => None,
    }
}

/// One property access in a member chain, base-to-tip order.
#[derive(Debug, Clone)]
pub struct ChainLink {
    /// `None` for computed accesses (`obj[key]`).
    pub name: Option<String>,
    /// Whether this access used optional chaining (`?.`).
    pub optional: bool,
    pub span: Span,
}

/// What a member chain bottoms out on.
#[derive(Debug)]
pub enum ChainBase<'a> {
    Ident(&'a swc_ecma_ast::Ident),
    This(Span),
    /// A call expression (`fetch().data` or mid-chain `a.b().c`).
    Call(&'a Expr),
    Other(&'a Expr),
}

#[derive(Debug)]
pub struct MemberChain<'a> {
    pub base: ChainBase<'a>,
    pub links: Vec<ChainLink>,
}

impl MemberChain<'_> {
    pub fn depth(&self) -> usize {
        self.links.len()
    }

    /// Render the chain as source-like text, e.g. `resp.data?.user.id`.
    /// Computed accesses render as `[...]`.
    pub fn path(&self) -> String {
        let mut out = match &self.base {
            ChainBase::Ident(ident) => ident.sym.to_string(),
            ChainBase::This(_) => "this".to_string(),
            ChainBase::Call(_) | ChainBase::Other(_) => "(...)".to_string(),
        };

        for link in &self.links {
            match &link.name {
                Some(name) => {
                    out.push_str(if link.optional { "?." } else { "." });
                    out.push_str(name);
                }
                None => {
                    if link.optional {
                        out.push_str("?.");
                    }
                    out.push_str("[...]");
                }
            }
        }

        out
    }
}

/// Flatten a member access expression into its base and the ordered
/// list of property accesses hanging off it. Returns `None` when the
/// expression is not a member access at all.
pub fn flatten_member_chain(expr: &Expr) -> Option<MemberChain<'_>> {
    let mut links = Vec::new();
    let base = collect_chain(unwrap_expr(expr), &mut links)?;
    links.reverse();
    Some(MemberChain { base, links })
}

/// [`flatten_member_chain`] for an already-unwrapped `MemberExpr` node.
pub fn flatten_member_expr(member: &MemberExpr) -> MemberChain<'_> {
    let mut links = vec![ChainLink {
        name: member_prop_name(&member.prop),
        optional: false,
        span: member.span,
    }];
    let base = chain_base(unwrap_expr(&member.obj), &mut links);
    links.reverse();
    MemberChain { base, links }
}

/// [`flatten_member_chain`] for an optional-chain node. `None` when the
/// chain head is a call rather than a member access.
pub fn flatten_opt_member_expr(opt: &OptChainExpr) -> Option<MemberChain<'_>> {
    let OptChainBase::Member(member) = &*opt.base else {
        return None;
    };
    let mut links = vec![ChainLink {
        name: member_prop_name(&member.prop),
        optional: opt.optional,
        span: opt.span,
    }];
    let base = chain_base(unwrap_expr(&member.obj), &mut links);
    links.reverse();
    Some(MemberChain { base, links })
}

// Collects links tip-to-base; caller reverses.
fn collect_chain<'a>(expr: &'a Expr, links: &mut Vec<ChainLink>) -> Option<ChainBase<'a>> {
    match expr {
        Expr::Member(member) => {
            links.push(ChainLink {
                name: member_prop_name(&member.prop),
                optional: false,
                span: member.span,
            });
            Some(chain_base(unwrap_expr(&member.obj), links))
        }
        Expr::OptChain(opt) => match &*opt.base {
            OptChainBase::Member(member) => {
                links.push(ChainLink {
                    name: member_prop_name(&member.prop),
                    optional: opt.optional,
                    span: opt.span,
                });
                Some(chain_base(unwrap_expr(&member.obj), links))
            }
            OptChainBase::Call(_) => None,
        },
        _ => None,
    }
}

fn chain_base<'a>(expr: &'a Expr, links: &mut Vec<ChainLink>) -> ChainBase<'a> {
    match expr {
        Expr::Member(_) | Expr::OptChain(_) => match collect_chain(expr, links) {
            Some(base) => base,
            // opt-call inside the chain: treat the call as the base
            None => ChainBase::Call(expr),
        },
        Expr::Ident(ident) => ChainBase::Ident(ident),
        Expr::This(this) => ChainBase::This(this.span),
        Expr::Call(_) | Expr::New(_) => ChainBase::Call(expr),
        other => ChainBase::Other(other),
    }
}

/// Check if the filename indicates a test file.
///
/// Recognizes the common suffix conventions (`.test.`, `.spec.`,
/// `_test.`, `_spec.`) and test directories (`test/`, `tests/`,
/// `__tests__/`, `__mocks__/`).
pub fn is_test_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();

    lower.contains(".test.")
        || lower.contains(".spec.")
        || lower.contains("_test.")
        || lower.contains("_spec.")
        || lower.ends_with("/test.js")
        || lower.ends_with("/test.mjs")
        || lower.ends_with("/test.ts")
        || lower == "test.js"
        || lower == "test.mjs"
        || lower == "test.ts"
        || lower.contains("/test/")
        || lower.contains("/tests/")
        || lower.contains("/__tests__/")
        || lower.contains("/__mocks__/")
        || lower.starts_with("test/")
        || lower.starts_with("tests/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedFile;

    fn first_expr(code: &str) -> (ParsedFile, usize) {
        let file = ParsedFile::from_source("test.js", code);
        (file, 0)
    }

    fn with_chain<R>(code: &str, f: impl FnOnce(&MemberChain) -> R) -> R {
        let (file, idx) = first_expr(code);
        let module = file.module().unwrap();
        let stmt = &module.body[idx];
        let expr = stmt
            .as_stmt()
            .and_then(|s| s.as_expr())
            .map(|e| &*e.expr)
            .unwrap();
        let chain = flatten_member_chain(expr).unwrap();
        f(&chain)
    }

    #[test]
    fn flattens_plain_member_chain() {
        with_chain("obj.a.b.c;", |chain| {
            assert_eq!(chain.depth(), 3);
            assert_eq!(chain.path(), "obj.a.b.c");
            assert!(matches!(chain.base, ChainBase::Ident(_)));
            assert!(chain.links.iter().all(|l| !l.optional));
        });
    }

    #[test]
    fn flattens_optional_chain() {
        with_chain("resp.data?.user.id;", |chain| {
            assert_eq!(chain.depth(), 3);
            assert_eq!(chain.path(), "resp.data?.user.id");
            assert!(chain.links[1].optional);
            assert!(!chain.links[0].optional);
        });
    }

    #[test]
    fn computed_access_has_no_name() {
        with_chain("obj[key].c;", |chain| {
            assert_eq!(chain.depth(), 2);
            assert_eq!(chain.links[0].name, None);
            assert_eq!(chain.path(), "obj.[...].c");
        });
    }

    #[test]
    fn this_base() {
        with_chain("this.state.items;", |chain| {
            assert!(matches!(chain.base, ChainBase::This(_)));
            assert_eq!(chain.path(), "this.state.items");
        });
    }

    #[test]
    fn call_base() {
        with_chain("getConfig().db.host;", |chain| {
            assert!(matches!(chain.base, ChainBase::Call(_)));
            assert_eq!(chain.depth(), 2);
            assert_eq!(chain.path(), "(...).db.host");
        });
    }

    #[test]
    fn non_member_expr_is_none() {
        let file = ParsedFile::from_source("test.js", "foo();");
        let module = file.module().unwrap();
        let expr = module.body[0]
            .as_stmt()
            .and_then(|s| s.as_expr())
            .map(|e| &*e.expr)
            .unwrap();
        assert!(flatten_member_chain(expr).is_none());
    }

    #[test]
    fn callee_names() {
        let file = ParsedFile::from_source(
            "test.js",
            "foo(); obj.bar(); obj?.baz(); (qux)(); arr[0]();",
        );
        let module = file.module().unwrap();
        let names: Vec<Option<String>> = module
            .body
            .iter()
            .map(|item| {
                let expr = item
                    .as_stmt()
                    .and_then(|s| s.as_expr())
                    .map(|e| &*e.expr)
                    .unwrap();
                match unwrap_expr(expr) {
                    Expr::Call(call) => callee_name(&call.callee),
                    Expr::OptChain(opt) => match &*opt.base {
                        OptChainBase::Call(call) => match unwrap_expr(&call.callee) {
                            Expr::Member(m) => member_prop_name(&m.prop),
                            Expr::OptChain(inner) => match &*inner.base {
                                OptChainBase::Member(m) => member_prop_name(&m.prop),
                                _ => None,
                            },
                            _ => None,
                        },
                        _ => None,
                    },
                    _ => None,
                }
            })
            .collect();

        assert_eq!(names[0].as_deref(), Some("foo"));
        assert_eq!(names[1].as_deref(), Some("bar"));
        assert_eq!(names[2].as_deref(), Some("baz"));
        assert_eq!(names[3].as_deref(), Some("qux"));
        assert_eq!(names[4], None);
    }

    #[test]
    fn test_file_detection() {
        assert!(is_test_file("component.test.js"));
        assert!(is_test_file("component.spec.ts"));
        assert!(is_test_file("utils_spec.js"));
        assert!(is_test_file("src/__tests__/file.js"));
        assert!(is_test_file("tests/unit/file.js"));
        assert!(is_test_file("test.mjs"));

        assert!(!is_test_file("component.js"));
        assert!(!is_test_file("src/test-utils.js"));
        assert!(!is_test_file("testing.js"));
    }
}
