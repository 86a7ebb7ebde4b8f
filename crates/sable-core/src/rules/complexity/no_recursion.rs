//! C002: no-recursion
//!
//! Flags calls that re-enter the function they appear in (direct
//! recursion) or any lexically enclosing function (mutual/lexical
//! recursion through nesting). Matching is by resolved name; calls
//! inside anonymous functions never match an anonymous frame.

use serde::Deserialize;
use swc_ecma_ast::{
    CallExpr, Class, ClassMember, Decl, DefaultDecl, Expr, Function, ModuleDecl, ModuleItem,
    OptCall, Pat, Prop, PropOrSpread, Stmt, VarDeclOrExpr,
};

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::helpers::{callee_name, member_prop_name, unwrap_expr};
use crate::rules::{Rule, RuleMetadata, parse_rule_options};
use crate::visitor::VisitorContext;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NoRecursionOptions {
    pub allow_recursion: bool,
}

declare_rule!(
    NoRecursion,
    id = "C002",
    name = "no-recursion",
    description = "Recursive calls risk unbounded stack growth; iterative rewrites keep memory use predictable",
    category = Complexity,
    severity = Warning,
    options = NoRecursionOptions,
    examples = r#"
// Bad: direct recursion
function countdown(n) {
    if (n <= 0) return;
    countdown(n - 1);
}

// Good: a loop with an explicit bound
function countdown(n) {
    while (n > 0) {
        n -= 1;
    }
}
"#
);

impl Rule for NoRecursion {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        if self.options.allow_recursion {
            return Vec::new();
        }

        let Some(module) = file.module() else {
            return Vec::new();
        };

        let ctx = VisitorContext::new(file);
        let mut walker = RecursionWalker {
            ctx,
            metadata: &self.metadata,
            frames: Vec::new(),
            diagnostics: Vec::new(),
        };

        for item in &module.body {
            walker.scan_module_item(item);
        }

        walker.diagnostics
    }

    fn configure(&mut self, settings: &toml::Value) {
        if let Some(options) = parse_rule_options(self.metadata.name, settings) {
            self.options = options;
        }
    }
}

struct RecursionWalker<'a> {
    ctx: VisitorContext<'a>,
    metadata: &'a RuleMetadata,
    /// Names of the enclosing function frames, outermost first.
    /// `None` marks an anonymous frame.
    frames: Vec<Option<String>>,
    diagnostics: Vec<Diagnostic>,
}

impl RecursionWalker<'_> {
    fn scan_module_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::Stmt(stmt) => self.scan_stmt(stmt),
            ModuleItem::ModuleDecl(decl) => match decl {
                ModuleDecl::ExportDecl(export) => self.scan_decl(&export.decl),
                ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                    DefaultDecl::Fn(fn_expr) => {
                        let name = fn_expr.ident.as_ref().map(|i| i.sym.to_string());
                        self.scan_function(&fn_expr.function, name);
                    }
                    DefaultDecl::Class(class_expr) => self.scan_class(&class_expr.class),
                    DefaultDecl::TsInterfaceDecl(_) => {}
                },
                ModuleDecl::ExportDefaultExpr(export) => self.scan_expr(&export.expr, None),
                _ => {}
            },
        }
    }

    fn scan_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Fn(fn_decl) => {
                self.scan_function(&fn_decl.function, Some(fn_decl.ident.sym.to_string()));
            }
            Decl::Class(class_decl) => self.scan_class(&class_decl.class),
            Decl::Var(var) => self.scan_var_decl(var),
            _ => {}
        }
    }

    fn scan_var_decl(&mut self, var: &swc_ecma_ast::VarDecl) {
        for declarator in &var.decls {
            self.scan_pat(&declarator.name);
            if let Some(init) = &declarator.init {
                let binding = declarator.name.as_ident().map(|i| i.sym.to_string());
                self.scan_expr(init, binding);
            }
        }
    }

    fn scan_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.scan_decl(decl),
            Stmt::Expr(expr_stmt) => self.scan_expr(&expr_stmt.expr, None),
            Stmt::Block(block) => {
                for s in &block.stmts {
                    self.scan_stmt(s);
                }
            }
            Stmt::If(if_stmt) => {
                self.scan_expr(&if_stmt.test, None);
                self.scan_stmt(&if_stmt.cons);
                if let Some(alt) = &if_stmt.alt {
                    self.scan_stmt(alt);
                }
            }
            Stmt::Return(ret) => {
                if let Some(arg) = &ret.arg {
                    self.scan_expr(arg, None);
                }
            }
            Stmt::Throw(throw) => self.scan_expr(&throw.arg, None),
            Stmt::While(while_stmt) => {
                self.scan_expr(&while_stmt.test, None);
                self.scan_stmt(&while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.scan_stmt(&do_while.body);
                self.scan_expr(&do_while.test, None);
            }
            Stmt::For(for_stmt) => {
                match &for_stmt.init {
                    Some(VarDeclOrExpr::VarDecl(var)) => self.scan_var_decl(var),
                    Some(VarDeclOrExpr::Expr(expr)) => self.scan_expr(expr, None),
                    None => {}
                }
                if let Some(test) = &for_stmt.test {
                    self.scan_expr(test, None);
                }
                if let Some(update) = &for_stmt.update {
                    self.scan_expr(update, None);
                }
                self.scan_stmt(&for_stmt.body);
            }
            Stmt::ForIn(for_in) => {
                self.scan_expr(&for_in.right, None);
                self.scan_stmt(&for_in.body);
            }
            Stmt::ForOf(for_of) => {
                self.scan_expr(&for_of.right, None);
                self.scan_stmt(&for_of.body);
            }
            Stmt::Switch(switch) => {
                self.scan_expr(&switch.discriminant, None);
                for case in &switch.cases {
                    if let Some(test) = &case.test {
                        self.scan_expr(test, None);
                    }
                    for s in &case.cons {
                        self.scan_stmt(s);
                    }
                }
            }
            Stmt::Try(try_stmt) => {
                for s in &try_stmt.block.stmts {
                    self.scan_stmt(s);
                }
                if let Some(handler) = &try_stmt.handler {
                    for s in &handler.body.stmts {
                        self.scan_stmt(s);
                    }
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    for s in &finalizer.stmts {
                        self.scan_stmt(s);
                    }
                }
            }
            Stmt::Labeled(labeled) => self.scan_stmt(&labeled.body),
            Stmt::With(with) => {
                self.scan_expr(&with.obj, None);
                self.scan_stmt(&with.body);
            }
            _ => {}
        }
    }

    /// `binding` carries the name a function expression would take from
    /// its enclosing declarator, assignment, or property key.
    fn scan_expr(&mut self, expr: &Expr, binding: Option<String>) {
        match expr {
            Expr::Call(call) => self.scan_call(call),
            Expr::OptChain(opt) => match &*opt.base {
                swc_ecma_ast::OptChainBase::Member(member) => {
                    self.scan_expr(&member.obj, None);
                    if let swc_ecma_ast::MemberProp::Computed(computed) = &member.prop {
                        self.scan_expr(&computed.expr, None);
                    }
                }
                swc_ecma_ast::OptChainBase::Call(call) => self.scan_opt_call(call),
            },
            Expr::Fn(fn_expr) => {
                // an own identifier takes priority over the binding name
                let name = fn_expr
                    .ident
                    .as_ref()
                    .map(|i| i.sym.to_string())
                    .or(binding);
                self.scan_function(&fn_expr.function, name);
            }
            Expr::Arrow(arrow) => {
                self.frames.push(binding);
                for param in &arrow.params {
                    self.scan_pat(param);
                }
                match arrow.body.as_ref() {
                    swc_ecma_ast::BlockStmtOrExpr::BlockStmt(block) => {
                        for s in &block.stmts {
                            self.scan_stmt(s);
                        }
                    }
                    swc_ecma_ast::BlockStmtOrExpr::Expr(body) => self.scan_expr(body, None),
                }
                self.frames.pop();
            }
            Expr::Assign(assign) => {
                let target_name = match &assign.left {
                    swc_ecma_ast::AssignTarget::Simple(
                        swc_ecma_ast::SimpleAssignTarget::Ident(ident),
                    ) => Some(ident.id.sym.to_string()),
                    swc_ecma_ast::AssignTarget::Simple(
                        swc_ecma_ast::SimpleAssignTarget::Member(member),
                    ) => {
                        self.scan_expr(&member.obj, None);
                        member_prop_name(&member.prop)
                    }
                    _ => None,
                };
                self.scan_expr(&assign.right, target_name);
            }
            Expr::Object(object) => {
                for prop in &object.props {
                    match prop {
                        PropOrSpread::Spread(spread) => self.scan_expr(&spread.expr, None),
                        PropOrSpread::Prop(prop) => match prop.as_ref() {
                            Prop::KeyValue(kv) => {
                                let key = prop_key_name(&kv.key);
                                self.scan_expr(&kv.value, key);
                            }
                            Prop::Method(method) => {
                                self.scan_function(&method.function, prop_key_name(&method.key));
                            }
                            Prop::Getter(getter) => {
                                self.frames.push(prop_key_name(&getter.key));
                                if let Some(body) = &getter.body {
                                    for s in &body.stmts {
                                        self.scan_stmt(s);
                                    }
                                }
                                self.frames.pop();
                            }
                            Prop::Setter(setter) => {
                                self.frames.push(prop_key_name(&setter.key));
                                if let Some(body) = &setter.body {
                                    for s in &body.stmts {
                                        self.scan_stmt(s);
                                    }
                                }
                                self.frames.pop();
                            }
                            Prop::Assign(assign) => self.scan_expr(&assign.value, None),
                            Prop::Shorthand(_) => {}
                        },
                    }
                }
            }
            Expr::Class(class_expr) => self.scan_class(&class_expr.class),
            Expr::New(new_expr) => {
                self.scan_expr(&new_expr.callee, None);
                if let Some(args) = &new_expr.args {
                    for arg in args {
                        self.scan_expr(&arg.expr, None);
                    }
                }
            }
            Expr::Member(member) => {
                self.scan_expr(&member.obj, None);
                if let swc_ecma_ast::MemberProp::Computed(computed) = &member.prop {
                    self.scan_expr(&computed.expr, None);
                }
            }
            Expr::Bin(bin) => {
                self.scan_expr(&bin.left, None);
                self.scan_expr(&bin.right, None);
            }
            Expr::Unary(unary) => self.scan_expr(&unary.arg, None),
            Expr::Update(update) => self.scan_expr(&update.arg, None),
            Expr::Cond(cond) => {
                self.scan_expr(&cond.test, None);
                self.scan_expr(&cond.cons, None);
                self.scan_expr(&cond.alt, None);
            }
            Expr::Seq(seq) => {
                for e in &seq.exprs {
                    self.scan_expr(e, None);
                }
            }
            Expr::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.scan_expr(&elem.expr, None);
                }
            }
            Expr::Tpl(tpl) => {
                for e in &tpl.exprs {
                    self.scan_expr(e, None);
                }
            }
            Expr::TaggedTpl(tagged) => {
                self.scan_expr(&tagged.tag, None);
                for e in &tagged.tpl.exprs {
                    self.scan_expr(e, None);
                }
            }
            Expr::Await(await_expr) => self.scan_expr(&await_expr.arg, None),
            Expr::Yield(yield_expr) => {
                if let Some(arg) = &yield_expr.arg {
                    self.scan_expr(arg, None);
                }
            }
            Expr::Paren(paren) => self.scan_expr(&paren.expr, binding),
            Expr::TsNonNull(_)
            | Expr::TsAs(_)
            | Expr::TsSatisfies(_)
            | Expr::TsConstAssertion(_)
            | Expr::TsTypeAssertion(_) => self.scan_expr(unwrap_expr(expr), binding),
            _ => {}
        }
    }

    fn scan_pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Assign(assign) => {
                self.scan_pat(&assign.left);
                self.scan_expr(&assign.right, None);
            }
            Pat::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.scan_pat(elem);
                }
            }
            Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        swc_ecma_ast::ObjectPatProp::KeyValue(kv) => self.scan_pat(&kv.value),
                        swc_ecma_ast::ObjectPatProp::Assign(assign) => {
                            if let Some(value) = &assign.value {
                                self.scan_expr(value, None);
                            }
                        }
                        swc_ecma_ast::ObjectPatProp::Rest(rest) => self.scan_pat(&rest.arg),
                    }
                }
            }
            Pat::Rest(rest) => self.scan_pat(&rest.arg),
            Pat::Expr(expr) => self.scan_expr(expr, None),
            Pat::Ident(_) | Pat::Invalid(_) => {}
        }
    }

    fn scan_function(&mut self, function: &Function, name: Option<String>) {
        self.frames.push(name);
        for param in &function.params {
            self.scan_pat(&param.pat);
        }
        if let Some(body) = &function.body {
            for s in &body.stmts {
                self.scan_stmt(s);
            }
        }
        self.frames.pop();
    }

    fn scan_class(&mut self, class: &Class) {
        if let Some(super_class) = &class.super_class {
            self.scan_expr(super_class, None);
        }
        for member in &class.body {
            match member {
                ClassMember::Constructor(constructor) => {
                    self.frames.push(Some("constructor".to_string()));
                    if let Some(body) = &constructor.body {
                        for s in &body.stmts {
                            self.scan_stmt(s);
                        }
                    }
                    self.frames.pop();
                }
                ClassMember::Method(method) => {
                    self.scan_function(&method.function, prop_key_name(&method.key));
                }
                ClassMember::PrivateMethod(method) => {
                    let name = format!("#{}", method.key.name);
                    self.scan_function(&method.function, Some(name));
                }
                ClassMember::ClassProp(prop) => {
                    let key = prop_key_name(&prop.key);
                    if let Some(value) = &prop.value {
                        self.scan_expr(value, key);
                    }
                }
                ClassMember::PrivateProp(prop) => {
                    if let Some(value) = &prop.value {
                        self.scan_expr(value, None);
                    }
                }
                ClassMember::StaticBlock(block) => {
                    for s in &block.body.stmts {
                        self.scan_stmt(s);
                    }
                }
                _ => {}
            }
        }
    }

    fn scan_call(&mut self, call: &CallExpr) {
        if let Some(target) = callee_name(&call.callee) {
            self.report_if_recursive(&target, call.span);
        }
        if let swc_ecma_ast::Callee::Expr(callee) = &call.callee {
            self.scan_expr(callee, None);
        }
        for arg in &call.args {
            self.scan_expr(&arg.expr, None);
        }
    }

    fn scan_opt_call(&mut self, call: &OptCall) {
        if let Some(target) = match unwrap_expr(&call.callee) {
            Expr::Ident(ident) => Some(ident.sym.to_string()),
            Expr::Member(member) => member_prop_name(&member.prop),
            Expr::OptChain(opt) => match &*opt.base {
                swc_ecma_ast::OptChainBase::Member(member) => member_prop_name(&member.prop),
                _ => None,
            },
            _ => None,
        } {
            self.report_if_recursive(&target, call.span);
        }
        self.scan_expr(&call.callee, None);
        for arg in &call.args {
            self.scan_expr(&arg.expr, None);
        }
    }

    fn report_if_recursive(&mut self, target: &str, span: swc_common::Span) {
        let Some(innermost) = self.frames.last() else {
            return;
        };

        if innermost.as_deref() == Some(target) {
            self.report("unsafeRecursion", target, target, span);
            return;
        }

        let outer_match = self.frames[..self.frames.len() - 1]
            .iter()
            .rev()
            .any(|frame| frame.as_deref() == Some(target));
        if outer_match {
            let caller = innermost.clone().unwrap_or_else(|| "<anonymous>".to_string());
            self.report("lexicalRecursion", &caller, target, span);
        }
    }

    fn report(&mut self, message_id: &str, caller: &str, target: &str, span: swc_common::Span) {
        let message = if message_id == "unsafeRecursion" {
            format!("Function '{}' calls itself", target)
        } else {
            format!("'{}' re-enters enclosing function '{}'", caller, target)
        };

        let diagnostic = self
            .ctx
            .report(self.metadata, span, message)
            .with_message_id(message_id)
            .with_data("caller", caller.to_string())
            .with_data("target", target.to_string())
            .with_suggestion("Rewrite with an explicit loop or worklist");

        self.diagnostics.push(diagnostic);
    }
}

fn prop_key_name(key: &swc_ecma_ast::PropName) -> Option<String> {
    match key {
        swc_ecma_ast::PropName::Ident(ident) => Some(ident.sym.to_string()),
        swc_ecma_ast::PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_rule(code: &str) -> Vec<Diagnostic> {
        let file = ParsedFile::from_source("test.js", code);
        NoRecursion::new().check(&file)
    }

    #[test]
    fn direct_recursion_in_declaration() {
        let code = r#"
function countdown(n) {
    if (n <= 0) return;
    countdown(n - 1);
}
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message_id.as_deref(), Some("unsafeRecursion"));
        assert_eq!(
            diagnostics[0].data.get("target").map(String::as_str),
            Some("countdown")
        );
    }

    #[test]
    fn named_function_expression_recursion() {
        let code = "const f = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); };";
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message_id.as_deref(), Some("unsafeRecursion"));
    }

    #[test]
    fn arrow_bound_to_variable_recursion() {
        let code = "const walk = (node) => { node.children.forEach(c => walk(c)); };";
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message_id.as_deref(), Some("lexicalRecursion"));
        assert_eq!(
            diagnostics[0].data.get("target").map(String::as_str),
            Some("walk")
        );
    }

    #[test]
    fn lexical_recursion_through_nested_function() {
        let code = r#"
function outer() {
    function inner() {
        outer();
    }
    inner();
}
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message_id.as_deref(), Some("lexicalRecursion"));
        assert_eq!(
            diagnostics[0].data.get("caller").map(String::as_str),
            Some("inner")
        );
        assert_eq!(
            diagnostics[0].data.get("target").map(String::as_str),
            Some("outer")
        );
    }

    #[test]
    fn method_recursion_via_this() {
        let code = r#"
class Tree {
    visit(node) {
        node.children.forEach((c) => this.visit(c));
    }
}
"#;
        let diagnostics = run_rule(code);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message_id.as_deref(), Some("lexicalRecursion"));
    }

    #[test]
    fn different_names_are_clean() {
        let code = r#"
function a() { b(); }
function b() { log(); }
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn anonymous_frames_never_match() {
        let code = "items.forEach(function () { items.forEach(function () { go(); }); });";
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn allow_recursion_disables_the_rule() {
        let code = "function f(n) { return f(n - 1); }";
        let file = ParsedFile::from_source("test.js", code);
        let rule = NoRecursion::with_options(NoRecursionOptions {
            allow_recursion: true,
        });
        assert!(rule.check(&file).is_empty());
    }

    #[test]
    fn sibling_calls_are_not_lexical_recursion() {
        let code = r#"
function parent() {
    function first() { second(); }
    function second() { done(); }
    first();
}
"#;
        assert!(run_rule(code).is_empty());
    }

    #[test]
    fn module_level_call_is_clean() {
        assert!(run_rule("function f() {} f();").is_empty());
    }
}
