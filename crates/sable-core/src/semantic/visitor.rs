//! Scope visitor for building ScopeTree and SymbolTable from AST
//!
//! Traverses a module and builds the scope tree and symbol table with
//! JavaScript scoping semantics: `var` hoists to the enclosing function,
//! `let`/`const` bind in the current block, function declarations at the
//! top level are hoisted before any statement runs.

use std::collections::HashSet;

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, AssignTarget, BlockStmt, BlockStmtOrExpr, CatchClause, ClassDecl, Decl, Expr,
    FnDecl, ForHead, ForInStmt, ForOfStmt, ForStmt, MemberProp, Module, ModuleDecl, ModuleItem,
    ObjectPatProp, Pat, Prop, PropName, PropOrSpread, SimpleAssignTarget, Stmt, SwitchStmt,
    TryStmt, VarDecl, VarDeclKind, VarDeclOrExpr, WhileStmt,
};

use super::scope::{ScopeId, ScopeKind, ScopeTree};
use super::symbols::{DeclarationKind, SymbolKind, SymbolTable, UnresolvedReference};

pub struct SemanticModel {
    pub scope_tree: ScopeTree,
    pub symbol_table: SymbolTable,
    pub unresolved_references: Vec<UnresolvedReference>,
}

pub struct ScopeBuilder {
    pub scope_tree: ScopeTree,
    pub symbol_table: SymbolTable,
    current_scope: Option<ScopeId>,
    declaration_spans: HashSet<Span>,
    unresolved_references: Vec<UnresolvedReference>,
}

impl Default for ScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeBuilder {
    pub fn new() -> Self {
        Self {
            scope_tree: ScopeTree::new(),
            symbol_table: SymbolTable::new(),
            current_scope: None,
            declaration_spans: HashSet::new(),
            unresolved_references: Vec::new(),
        }
    }

    pub fn build(module: &Module) -> SemanticModel {
        let mut builder = Self::new();
        builder.visit_module(module);
        SemanticModel {
            scope_tree: builder.scope_tree,
            symbol_table: builder.symbol_table,
            unresolved_references: builder.unresolved_references,
        }
    }

    fn visit_module(&mut self, module: &Module) {
        let global_scope = self
            .scope_tree
            .create_scope(ScopeKind::Global, None, module.span, None);
        self.current_scope = Some(global_scope);

        // function declarations hoist to the top of their scope
        for item in &module.body {
            self.hoist_module_item(item);
        }

        for item in &module.body {
            self.visit_module_item(item);
        }
    }

    fn hoist_module_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) => {
                if let Decl::Fn(fn_decl) = &export_decl.decl {
                    self.declare_symbol(
                        &fn_decl.ident.sym,
                        SymbolKind::Function,
                        DeclarationKind::Function,
                        fn_decl.ident.span,
                        fn_decl.ident.span,
                        true,
                    );
                }
            }
            ModuleItem::Stmt(Stmt::Decl(Decl::Fn(fn_decl))) => {
                self.declare_symbol(
                    &fn_decl.ident.sym,
                    SymbolKind::Function,
                    DeclarationKind::Function,
                    fn_decl.ident.span,
                    fn_decl.ident.span,
                    false,
                );
            }
            _ => {}
        }
    }

    fn visit_module_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::ModuleDecl(decl) => self.visit_module_decl(decl),
            ModuleItem::Stmt(stmt) => self.visit_stmt(stmt),
        }
    }

    fn visit_module_decl(&mut self, decl: &ModuleDecl) {
        match decl {
            ModuleDecl::ExportDecl(export_decl) => {
                self.visit_decl(&export_decl.decl, true);
            }
            ModuleDecl::ExportDefaultDecl(export_default) => {
                if let Some(fn_expr) = &export_default.decl.as_fn_expr() {
                    let name = fn_expr.ident.as_ref().map(|i| i.sym.to_string());
                    if let Some(ident) = &fn_expr.ident {
                        self.declare_symbol(
                            &ident.sym,
                            SymbolKind::Function,
                            DeclarationKind::Function,
                            ident.span,
                            ident.span,
                            true,
                        );
                    }
                    self.visit_function(&fn_expr.function, name);
                } else if let Some(class_expr) = &export_default.decl.as_class() {
                    if let Some(ident) = &class_expr.ident {
                        self.declare_symbol(
                            &ident.sym,
                            SymbolKind::Class,
                            DeclarationKind::Class,
                            ident.span,
                            ident.span,
                            true,
                        );
                    }
                    self.visit_class(&class_expr.class);
                }
            }
            ModuleDecl::Import(import) => {
                for specifier in &import.specifiers {
                    let local = match specifier {
                        swc_ecma_ast::ImportSpecifier::Named(named) => &named.local,
                        swc_ecma_ast::ImportSpecifier::Default(default) => &default.local,
                        swc_ecma_ast::ImportSpecifier::Namespace(ns) => &ns.local,
                    };
                    self.declare_symbol(
                        &local.sym,
                        SymbolKind::Import,
                        DeclarationKind::Import,
                        local.span,
                        local.span,
                        false,
                    );
                }
            }
            ModuleDecl::ExportDefaultExpr(export_expr) => {
                self.visit_expr(&export_expr.expr);
            }
            ModuleDecl::ExportNamed(named_export) => {
                if named_export.src.is_none() {
                    for specifier in &named_export.specifiers {
                        if let swc_ecma_ast::ExportSpecifier::Named(named) = specifier {
                            if let swc_ecma_ast::ModuleExportName::Ident(ident) = &named.orig {
                                self.visit_ident_reference(ident);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.visit_decl(decl, false),
            Stmt::Block(block) => self.visit_block_stmt(block),
            Stmt::If(if_stmt) => {
                self.visit_expr(&if_stmt.test);
                self.visit_stmt(&if_stmt.cons);
                if let Some(alt) = &if_stmt.alt {
                    self.visit_stmt(alt);
                }
            }
            Stmt::Throw(throw_stmt) => {
                self.visit_expr(&throw_stmt.arg);
            }
            Stmt::For(for_stmt) => self.visit_for_stmt(for_stmt),
            Stmt::ForIn(for_in) => self.visit_for_in_stmt(for_in),
            Stmt::ForOf(for_of) => self.visit_for_of_stmt(for_of),
            Stmt::While(while_stmt) => self.visit_while_stmt(while_stmt),
            Stmt::DoWhile(do_while) => {
                self.visit_stmt(&do_while.body);
                self.visit_expr(&do_while.test);
            }
            Stmt::Switch(switch_stmt) => self.visit_switch_stmt(switch_stmt),
            Stmt::Try(try_stmt) => self.visit_try_stmt(try_stmt),
            Stmt::With(with_stmt) => {
                self.visit_expr(&with_stmt.obj);
                self.visit_stmt(&with_stmt.body);
            }
            Stmt::Labeled(labeled) => {
                self.visit_stmt(&labeled.body);
            }
            Stmt::Return(ret) => {
                if let Some(arg) = &ret.arg {
                    self.visit_expr(arg);
                }
            }
            Stmt::Expr(expr_stmt) => {
                self.visit_expr(&expr_stmt.expr);
            }
            _ => {}
        }
    }

    fn visit_decl(&mut self, decl: &Decl, is_exported: bool) {
        match decl {
            Decl::Var(var_decl) => self.visit_var_decl(var_decl, is_exported),
            Decl::Fn(fn_decl) => self.visit_fn_decl(fn_decl, is_exported),
            Decl::Class(class_decl) => self.visit_class_decl(class_decl, is_exported),
            _ => {}
        }
    }

    fn visit_var_decl(&mut self, var_decl: &VarDecl, is_exported: bool) {
        let (symbol_kind, decl_kind) = var_decl_kinds(var_decl.kind);

        for declarator in &var_decl.decls {
            self.declare_pat(
                &declarator.name,
                symbol_kind,
                decl_kind,
                declarator.span,
                is_exported,
            );

            if let Some(init) = &declarator.init {
                // a function assigned to a binding takes the binding's name
                let binding_name = declarator
                    .name
                    .as_ident()
                    .map(|ident| ident.id.sym.to_string());
                self.visit_possibly_named_expr(init, binding_name);
            }
        }
    }

    fn visit_fn_decl(&mut self, fn_decl: &FnDecl, is_exported: bool) {
        self.declare_symbol(
            &fn_decl.ident.sym,
            SymbolKind::Function,
            DeclarationKind::Function,
            fn_decl.ident.span,
            fn_decl.ident.span,
            is_exported,
        );

        self.visit_function(&fn_decl.function, Some(fn_decl.ident.sym.to_string()));
    }

    fn visit_function(&mut self, func: &swc_ecma_ast::Function, name: Option<String>) {
        let Some(body) = &func.body else {
            return;
        };

        let parent_scope = self.current_scope;
        let func_scope =
            self.scope_tree
                .create_scope(ScopeKind::Function, parent_scope, body.span, name);
        self.current_scope = Some(func_scope);

        for param in &func.params {
            self.declare_pat(
                &param.pat,
                SymbolKind::Parameter,
                DeclarationKind::Parameter,
                param.pat.span(),
                false,
            );
        }

        for stmt in &body.stmts {
            self.visit_stmt(stmt);
        }

        self.current_scope = parent_scope;
    }

    fn visit_class_decl(&mut self, class_decl: &ClassDecl, is_exported: bool) {
        self.declare_symbol(
            &class_decl.ident.sym,
            SymbolKind::Class,
            DeclarationKind::Class,
            class_decl.ident.span,
            class_decl.ident.span,
            is_exported,
        );

        self.visit_class(&class_decl.class);
    }

    fn visit_class(&mut self, class: &swc_ecma_ast::Class) {
        let parent_scope = self.current_scope;

        if let Some(super_class) = &class.super_class {
            self.visit_expr(super_class);
        }

        let class_scope =
            self.scope_tree
                .create_scope(ScopeKind::Class, parent_scope, class.span, None);
        self.current_scope = Some(class_scope);

        for member in &class.body {
            match member {
                swc_ecma_ast::ClassMember::Method(method) => {
                    self.visit_function(&method.function, prop_name_text(&method.key));
                }
                swc_ecma_ast::ClassMember::PrivateMethod(method) => {
                    self.visit_function(
                        &method.function,
                        Some(format!("#{}", method.key.name)),
                    );
                }
                swc_ecma_ast::ClassMember::Constructor(ctor) => {
                    let ctor_scope = self.scope_tree.create_scope(
                        ScopeKind::Function,
                        Some(class_scope),
                        ctor.span,
                        Some("constructor".to_string()),
                    );
                    self.current_scope = Some(ctor_scope);

                    for param in &ctor.params {
                        if let swc_ecma_ast::ParamOrTsParamProp::Param(p) = param {
                            self.declare_pat(
                                &p.pat,
                                SymbolKind::Parameter,
                                DeclarationKind::Parameter,
                                p.pat.span(),
                                false,
                            );
                        }
                    }

                    if let Some(body) = &ctor.body {
                        for stmt in &body.stmts {
                            self.visit_stmt(stmt);
                        }
                    }

                    self.current_scope = Some(class_scope);
                }
                swc_ecma_ast::ClassMember::ClassProp(prop) => {
                    if let Some(value) = &prop.value {
                        self.visit_expr(value);
                    }
                }
                swc_ecma_ast::ClassMember::PrivateProp(prop) => {
                    if let Some(value) = &prop.value {
                        self.visit_expr(value);
                    }
                }
                swc_ecma_ast::ClassMember::StaticBlock(block) => {
                    for stmt in &block.body.stmts {
                        self.visit_stmt(stmt);
                    }
                }
                _ => {}
            }
        }

        self.current_scope = parent_scope;
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        let parent_scope = self.current_scope;
        let block_scope =
            self.scope_tree
                .create_scope(ScopeKind::Block, parent_scope, block.span, None);
        self.current_scope = Some(block_scope);

        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }

        self.current_scope = parent_scope;
    }

    fn visit_for_stmt(&mut self, for_stmt: &ForStmt) {
        let parent_scope = self.current_scope;
        let for_scope =
            self.scope_tree
                .create_scope(ScopeKind::For, parent_scope, for_stmt.span, None);
        self.current_scope = Some(for_scope);

        if let Some(init) = &for_stmt.init {
            match init {
                VarDeclOrExpr::VarDecl(var_decl) => self.visit_var_decl(var_decl, false),
                VarDeclOrExpr::Expr(expr) => self.visit_expr(expr),
            }
        }

        if let Some(test) = &for_stmt.test {
            self.visit_expr(test);
        }
        if let Some(update) = &for_stmt.update {
            self.visit_expr(update);
        }

        self.visit_stmt(&for_stmt.body);
        self.current_scope = parent_scope;
    }

    fn visit_for_in_stmt(&mut self, for_in: &ForInStmt) {
        let parent_scope = self.current_scope;
        let for_scope =
            self.scope_tree
                .create_scope(ScopeKind::For, parent_scope, for_in.span, None);
        self.current_scope = Some(for_scope);

        self.declare_for_head(&for_in.left);
        self.visit_expr(&for_in.right);
        self.visit_stmt(&for_in.body);

        self.current_scope = parent_scope;
    }

    fn visit_for_of_stmt(&mut self, for_of: &ForOfStmt) {
        let parent_scope = self.current_scope;
        let for_scope =
            self.scope_tree
                .create_scope(ScopeKind::For, parent_scope, for_of.span, None);
        self.current_scope = Some(for_scope);

        self.declare_for_head(&for_of.left);
        self.visit_expr(&for_of.right);
        self.visit_stmt(&for_of.body);

        self.current_scope = parent_scope;
    }

    fn declare_for_head(&mut self, head: &ForHead) {
        if let ForHead::VarDecl(var_decl) = head {
            let (symbol_kind, decl_kind) = var_decl_kinds(var_decl.kind);
            for declarator in &var_decl.decls {
                self.declare_pat(
                    &declarator.name,
                    symbol_kind,
                    decl_kind,
                    declarator.span,
                    false,
                );
            }
        }
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileStmt) {
        let parent_scope = self.current_scope;
        let while_scope =
            self.scope_tree
                .create_scope(ScopeKind::While, parent_scope, while_stmt.span, None);
        self.current_scope = Some(while_scope);

        self.visit_expr(&while_stmt.test);
        self.visit_stmt(&while_stmt.body);

        self.current_scope = parent_scope;
    }

    fn visit_switch_stmt(&mut self, switch_stmt: &SwitchStmt) {
        let parent_scope = self.current_scope;
        let switch_scope =
            self.scope_tree
                .create_scope(ScopeKind::Switch, parent_scope, switch_stmt.span, None);
        self.current_scope = Some(switch_scope);

        self.visit_expr(&switch_stmt.discriminant);

        for case in &switch_stmt.cases {
            if let Some(test) = &case.test {
                self.visit_expr(test);
            }
            for stmt in &case.cons {
                self.visit_stmt(stmt);
            }
        }

        self.current_scope = parent_scope;
    }

    fn visit_try_stmt(&mut self, try_stmt: &TryStmt) {
        let parent_scope = self.current_scope;
        let try_scope = self.scope_tree.create_scope(
            ScopeKind::Try,
            parent_scope,
            try_stmt.block.span,
            None,
        );
        self.current_scope = Some(try_scope);

        for stmt in &try_stmt.block.stmts {
            self.visit_stmt(stmt);
        }

        self.current_scope = parent_scope;

        if let Some(catch) = &try_stmt.handler {
            self.visit_catch_clause(catch);
        }

        if let Some(finalizer) = &try_stmt.finalizer {
            let finally_scope =
                self.scope_tree
                    .create_scope(ScopeKind::Block, parent_scope, finalizer.span, None);
            self.current_scope = Some(finally_scope);

            for stmt in &finalizer.stmts {
                self.visit_stmt(stmt);
            }

            self.current_scope = parent_scope;
        }
    }

    fn visit_catch_clause(&mut self, catch: &CatchClause) {
        let parent_scope = self.current_scope;
        let catch_scope =
            self.scope_tree
                .create_scope(ScopeKind::Catch, parent_scope, catch.span, None);
        self.current_scope = Some(catch_scope);

        if let Some(param) = &catch.param {
            self.declare_pat(
                param,
                SymbolKind::Parameter,
                DeclarationKind::Parameter,
                param.span(),
                false,
            );
        }

        for stmt in &catch.body.stmts {
            self.visit_stmt(stmt);
        }

        self.current_scope = parent_scope;
    }

    /// Visit an expression, naming the scope if the expression turns
    /// out to be a function bound to `name`.
    fn visit_possibly_named_expr(&mut self, expr: &Expr, name: Option<String>) {
        match expr {
            Expr::Fn(fn_expr) => {
                let fn_name = fn_expr
                    .ident
                    .as_ref()
                    .map(|i| i.sym.to_string())
                    .or(name);
                self.visit_function(&fn_expr.function, fn_name);
            }
            Expr::Arrow(arrow) => self.visit_arrow_expr(arrow, name),
            _ => self.visit_expr(expr),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => {
                self.visit_ident_reference(ident);
            }
            Expr::Arrow(arrow) => self.visit_arrow_expr(arrow, None),
            Expr::Fn(fn_expr) => {
                let name = fn_expr.ident.as_ref().map(|i| i.sym.to_string());
                self.visit_function(&fn_expr.function, name);
            }
            Expr::Class(class_expr) => {
                self.visit_class(&class_expr.class);
            }
            Expr::Call(call) => {
                if let Some(callee_expr) = call.callee.as_expr() {
                    self.visit_expr(callee_expr);
                }
                for arg in &call.args {
                    self.visit_expr(&arg.expr);
                }
            }
            Expr::New(new_expr) => {
                self.visit_expr(&new_expr.callee);
                if let Some(args) = &new_expr.args {
                    for arg in args {
                        self.visit_expr(&arg.expr);
                    }
                }
            }
            Expr::Member(member) => {
                self.visit_expr(&member.obj);
                if let MemberProp::Computed(computed) = &member.prop {
                    self.visit_expr(&computed.expr);
                }
            }
            Expr::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.visit_expr(&elem.expr);
                }
            }
            Expr::Object(obj) => {
                for prop in &obj.props {
                    match prop {
                        PropOrSpread::Spread(spread) => {
                            self.visit_expr(&spread.expr);
                        }
                        PropOrSpread::Prop(prop) => match prop.as_ref() {
                            Prop::Shorthand(ident) => {
                                self.visit_ident_reference(ident);
                            }
                            Prop::Method(method) => {
                                self.visit_function(
                                    &method.function,
                                    prop_name_text(&method.key),
                                );
                            }
                            Prop::KeyValue(kv) => {
                                if let PropName::Computed(computed) = &kv.key {
                                    self.visit_expr(&computed.expr);
                                }
                                self.visit_possibly_named_expr(
                                    &kv.value,
                                    prop_name_text(&kv.key),
                                );
                            }
                            Prop::Getter(getter) => {
                                if let Some(body) = &getter.body {
                                    self.visit_function_body(body, prop_name_text(&getter.key));
                                }
                            }
                            Prop::Setter(setter) => {
                                if let Some(body) = &setter.body {
                                    let parent = self.current_scope;
                                    let scope = self.scope_tree.create_scope(
                                        ScopeKind::Function,
                                        parent,
                                        body.span,
                                        prop_name_text(&setter.key),
                                    );
                                    self.current_scope = Some(scope);
                                    self.declare_pat(
                                        &setter.param,
                                        SymbolKind::Parameter,
                                        DeclarationKind::Parameter,
                                        setter.param.span(),
                                        false,
                                    );
                                    for stmt in &body.stmts {
                                        self.visit_stmt(stmt);
                                    }
                                    self.current_scope = parent;
                                }
                            }
                            Prop::Assign(assign) => {
                                self.visit_expr(&assign.value);
                            }
                        },
                    }
                }
            }
            Expr::Assign(assign) => {
                self.visit_assign_target(&assign.left);
                let target_name = assign_target_name(&assign.left);
                self.visit_possibly_named_expr(&assign.right, target_name);
            }
            Expr::Bin(bin) => {
                self.visit_expr(&bin.left);
                self.visit_expr(&bin.right);
            }
            Expr::Unary(unary) => {
                self.visit_expr(&unary.arg);
            }
            Expr::Update(update) => {
                self.visit_expr(&update.arg);
            }
            Expr::Cond(cond) => {
                self.visit_expr(&cond.test);
                self.visit_expr(&cond.cons);
                self.visit_expr(&cond.alt);
            }
            Expr::Seq(seq) => {
                for expr in &seq.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::Paren(paren) => {
                self.visit_expr(&paren.expr);
            }
            Expr::Tpl(tpl) => {
                for expr in &tpl.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::TaggedTpl(tagged) => {
                self.visit_expr(&tagged.tag);
                for expr in &tagged.tpl.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::Yield(yield_expr) => {
                if let Some(arg) = &yield_expr.arg {
                    self.visit_expr(arg);
                }
            }
            Expr::Await(await_expr) => {
                self.visit_expr(&await_expr.arg);
            }
            Expr::OptChain(opt_chain) => {
                self.visit_opt_chain_base(&opt_chain.base);
            }
            Expr::TsAs(ts_as) => {
                self.visit_expr(&ts_as.expr);
            }
            Expr::TsNonNull(non_null) => {
                self.visit_expr(&non_null.expr);
            }
            Expr::TsSatisfies(satisfies) => {
                self.visit_expr(&satisfies.expr);
            }
            Expr::TsConstAssertion(const_assert) => {
                self.visit_expr(&const_assert.expr);
            }
            Expr::TsTypeAssertion(assertion) => {
                self.visit_expr(&assertion.expr);
            }
            _ => {}
        }
    }

    fn visit_function_body(&mut self, body: &BlockStmt, name: Option<String>) {
        let parent = self.current_scope;
        let scope = self
            .scope_tree
            .create_scope(ScopeKind::Function, parent, body.span, name);
        self.current_scope = Some(scope);
        for stmt in &body.stmts {
            self.visit_stmt(stmt);
        }
        self.current_scope = parent;
    }

    fn visit_assign_target(&mut self, target: &AssignTarget) {
        match target {
            AssignTarget::Simple(simple) => match simple {
                SimpleAssignTarget::Ident(ident) => {
                    self.visit_ident_reference(&ident.id);
                }
                SimpleAssignTarget::Member(member) => {
                    self.visit_expr(&member.obj);
                    if let MemberProp::Computed(computed) = &member.prop {
                        self.visit_expr(&computed.expr);
                    }
                }
                SimpleAssignTarget::OptChain(opt) => {
                    self.visit_opt_chain_base(&opt.base);
                }
                _ => {}
            },
            AssignTarget::Pat(_) => {}
        }
    }

    fn visit_opt_chain_base(&mut self, base: &swc_ecma_ast::OptChainBase) {
        match base {
            swc_ecma_ast::OptChainBase::Member(member) => {
                self.visit_expr(&member.obj);
                if let MemberProp::Computed(computed) = &member.prop {
                    self.visit_expr(&computed.expr);
                }
            }
            swc_ecma_ast::OptChainBase::Call(call) => {
                self.visit_expr(&call.callee);
                for arg in &call.args {
                    self.visit_expr(&arg.expr);
                }
            }
        }
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr, name: Option<String>) {
        let span = match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => block.span,
            BlockStmtOrExpr::Expr(expr) => expr.span(),
        };

        let parent_scope = self.current_scope;
        let arrow_scope =
            self.scope_tree
                .create_scope(ScopeKind::ArrowFunction, parent_scope, span, name);
        self.current_scope = Some(arrow_scope);

        for param in &arrow.params {
            self.declare_pat(
                param,
                SymbolKind::Parameter,
                DeclarationKind::Parameter,
                param.span(),
                false,
            );
        }

        match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => {
                for stmt in &block.stmts {
                    self.visit_stmt(stmt);
                }
            }
            BlockStmtOrExpr::Expr(expr) => {
                self.visit_expr(expr);
            }
        }

        self.current_scope = parent_scope;
    }

    fn declare_pat(
        &mut self,
        pat: &Pat,
        symbol_kind: SymbolKind,
        decl_kind: DeclarationKind,
        declarator_span: Span,
        is_exported: bool,
    ) {
        match pat {
            Pat::Ident(binding_ident) => {
                self.declare_symbol(
                    &binding_ident.id.sym,
                    symbol_kind,
                    decl_kind,
                    binding_ident.id.span,
                    declarator_span,
                    is_exported,
                );
            }
            Pat::Array(array_pat) => {
                for elem in array_pat.elems.iter().flatten() {
                    self.declare_pat(elem, symbol_kind, decl_kind, declarator_span, is_exported);
                }
            }
            Pat::Object(object_pat) => {
                for prop in &object_pat.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.declare_pat(
                                &kv.value,
                                symbol_kind,
                                decl_kind,
                                declarator_span,
                                is_exported,
                            );
                        }
                        ObjectPatProp::Assign(assign) => {
                            self.declare_symbol(
                                &assign.key.sym,
                                symbol_kind,
                                decl_kind,
                                assign.key.span,
                                declarator_span,
                                is_exported,
                            );
                            if let Some(value) = &assign.value {
                                self.visit_expr(value);
                            }
                        }
                        ObjectPatProp::Rest(rest) => {
                            self.declare_pat(
                                &rest.arg,
                                symbol_kind,
                                decl_kind,
                                declarator_span,
                                is_exported,
                            );
                        }
                    }
                }
            }
            Pat::Rest(rest_pat) => {
                self.declare_pat(
                    &rest_pat.arg,
                    symbol_kind,
                    decl_kind,
                    declarator_span,
                    is_exported,
                );
            }
            Pat::Assign(assign_pat) => {
                self.declare_pat(
                    &assign_pat.left,
                    symbol_kind,
                    decl_kind,
                    declarator_span,
                    is_exported,
                );
                self.visit_expr(&assign_pat.right);
            }
            Pat::Invalid(_) | Pat::Expr(_) => {}
        }
    }

    fn declare_symbol(
        &mut self,
        name: &str,
        kind: SymbolKind,
        decl_kind: DeclarationKind,
        span: Span,
        declarator_span: Span,
        is_exported: bool,
    ) {
        // skip duplicates from the hoisting pass
        if self.declaration_spans.contains(&span) {
            return;
        }

        let scope = if decl_kind == DeclarationKind::Var {
            self.find_hoisting_scope()
        } else {
            match self.current_scope {
                Some(scope) => scope,
                None => return,
            }
        };

        self.declaration_spans.insert(span);
        self.symbol_table
            .declare(name, kind, decl_kind, scope, span, declarator_span, is_exported);
    }

    fn visit_ident_reference(&mut self, ident: &swc_ecma_ast::Ident) {
        if self.declaration_spans.contains(&ident.span) {
            return;
        }

        let Some(current_scope) = self.current_scope else {
            return;
        };
        let name = ident.sym.as_str();

        if let Some(symbol_id) = self
            .symbol_table
            .lookup(name, current_scope, &self.scope_tree)
        {
            self.symbol_table.add_reference(symbol_id, ident.span);
        } else {
            self.unresolved_references.push(UnresolvedReference {
                name: name.to_string(),
                span: ident.span,
                scope: current_scope,
            });
        }
    }

    fn find_hoisting_scope(&self) -> ScopeId {
        let Some(current) = self.current_scope else {
            unreachable!("declarations only happen inside a scope");
        };

        for scope in self.scope_tree.ancestors(current) {
            match scope.kind {
                ScopeKind::Global | ScopeKind::Function | ScopeKind::ArrowFunction => {
                    return scope.id;
                }
                _ => continue,
            }
        }

        current
    }
}

fn var_decl_kinds(kind: VarDeclKind) -> (SymbolKind, DeclarationKind) {
    match kind {
        VarDeclKind::Var => (SymbolKind::Variable, DeclarationKind::Var),
        VarDeclKind::Let => (SymbolKind::Variable, DeclarationKind::Let),
        VarDeclKind::Const => (SymbolKind::Constant, DeclarationKind::Const),
    }
}

fn prop_name_text(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn assign_target_name(target: &AssignTarget) -> Option<String> {
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Ident(ident)) => Some(ident.id.sym.to_string()),
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => match &member.prop {
            MemberProp::Ident(ident) => Some(ident.sym.to_string()),
            _ => None,
        },
        _ => None,
    }
}
