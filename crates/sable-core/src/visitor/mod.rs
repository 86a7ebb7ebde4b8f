//! AST traversal infrastructure
//!
//! `walk_ast` drives an [`AstVisitor`] over a module in document order
//! (every parent is visited before its children). The walk uses an
//! explicit work stack instead of native recursion, so pathologically
//! nested inputs cannot overflow the thread stack; subtrees deeper than
//! [`MAX_WALK_DEPTH`] are silently skipped.

mod context;
mod traits;

pub use context::VisitorContext;
pub use traits::AstVisitor;

use std::ops::ControlFlow;

use swc_ecma_ast::{
    AssignTarget, AssignTargetPat, BlockStmt, BlockStmtOrExpr, Callee, ClassMember, Decl,
    DefaultDecl, Expr, ForHead, MemberProp, Module, ModuleDecl, ModuleItem, ObjectPatProp,
    OptChainBase, ParamOrTsParamProp, Pat, Prop, PropName, PropOrSpread, SimpleAssignTarget, Stmt,
    SuperProp, TsParamPropParam, VarDecl, VarDeclOrExpr,
};

use crate::parser::ParsedFile;

/// Subtrees nested deeper than this are not traversed.
pub const MAX_WALK_DEPTH: usize = 512;

enum Node<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    VarDecl(&'a VarDecl),
    Pat(&'a Pat),
    Function(&'a swc_ecma_ast::Function),
    /// A function-shaped body with no `Function` node: constructor,
    /// `static {}` block, or object-literal accessor.
    FnBody(&'a BlockStmt),
    Class(&'a swc_ecma_ast::Class),
    PropName(&'a PropName),
}

struct WorkItem<'a> {
    node: Node<'a>,
    depth: usize,
}

pub fn walk_ast<V: AstVisitor>(visitor: &mut V, file: &ParsedFile) -> ControlFlow<()> {
    let Some(module) = file.module() else {
        return ControlFlow::Continue(());
    };

    let ctx = VisitorContext::new(file);
    let mut stack: Vec<WorkItem> = Vec::new();

    push_module_items(&mut stack, module);

    while let Some(item) = stack.pop() {
        let WorkItem { node, depth } = item;
        if depth > MAX_WALK_DEPTH {
            continue;
        }

        match node {
            Node::Stmt(stmt) => visit_stmt(visitor, stmt, &ctx, &mut stack, depth)?,
            Node::Expr(expr) => visit_expr(visitor, expr, &ctx, &mut stack, depth)?,
            Node::VarDecl(decl) => {
                visitor.visit_var_decl(decl, &ctx)?;
                // reversed so declarators come off the stack in source order
                for declarator in decl.decls.iter().rev() {
                    if let Some(init) = &declarator.init {
                        push(&mut stack, Node::Expr(init), depth + 1);
                    }
                    push(&mut stack, Node::Pat(&declarator.name), depth + 1);
                }
            }
            Node::Pat(pat) => push_pat_children(&mut stack, pat, depth),
            Node::Function(function) => {
                visitor.visit_function(function, &ctx)?;
                for param in function.params.iter().rev() {
                    push(&mut stack, Node::Pat(&param.pat), depth + 1);
                }
                if let Some(body) = &function.body {
                    for stmt in body.stmts.iter().rev() {
                        push(&mut stack, Node::Stmt(stmt), depth + 1);
                    }
                }
            }
            Node::FnBody(body) => {
                visitor.visit_block_body(body, &ctx)?;
                for stmt in body.stmts.iter().rev() {
                    push(&mut stack, Node::Stmt(stmt), depth + 1);
                }
            }
            Node::Class(class) => push_class_children(&mut stack, class, depth),
            Node::PropName(name) => {
                if let PropName::Computed(computed) = name {
                    push(&mut stack, Node::Expr(&computed.expr), depth + 1);
                }
            }
        }
    }

    ControlFlow::Continue(())
}

fn push<'a>(stack: &mut Vec<WorkItem<'a>>, node: Node<'a>, depth: usize) {
    stack.push(WorkItem { node, depth });
}

fn push_module_items<'a>(stack: &mut Vec<WorkItem<'a>>, module: &'a Module) {
    for item in module.body.iter().rev() {
        match item {
            ModuleItem::Stmt(stmt) => push(stack, Node::Stmt(stmt), 0),
            ModuleItem::ModuleDecl(decl) => match decl {
                ModuleDecl::ExportDecl(export) => match &export.decl {
                    Decl::Fn(_) | Decl::Class(_) | Decl::Var(_) => {
                        push_decl(stack, &export.decl, 0);
                    }
                    _ => {}
                },
                ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                    DefaultDecl::Fn(fn_expr) => {
                        push(stack, Node::Function(&fn_expr.function), 0);
                    }
                    DefaultDecl::Class(class_expr) => {
                        push(stack, Node::Class(&class_expr.class), 0);
                    }
                    DefaultDecl::TsInterfaceDecl(_) => {}
                },
                ModuleDecl::ExportDefaultExpr(export) => {
                    push(stack, Node::Expr(&export.expr), 0);
                }
                // imports and re-exports carry no checkable expressions
                _ => {}
            },
        }
    }
}

fn push_decl<'a>(stack: &mut Vec<WorkItem<'a>>, decl: &'a Decl, depth: usize) {
    match decl {
        Decl::Var(var) => push(stack, Node::VarDecl(var), depth),
        Decl::Class(class) => push(stack, Node::Class(&class.class), depth),
        Decl::Fn(_) => {
            // handled by visit_stmt so the hook sees the FnDecl node
        }
        _ => {}
    }
}

fn visit_stmt<'a, V: AstVisitor>(
    visitor: &mut V,
    stmt: &'a Stmt,
    ctx: &VisitorContext,
    stack: &mut Vec<WorkItem<'a>>,
    depth: usize,
) -> ControlFlow<()> {
    match stmt {
        Stmt::Block(block) => {
            for s in block.stmts.iter().rev() {
                push(stack, Node::Stmt(s), depth + 1);
            }
        }
        Stmt::With(with) => {
            push(stack, Node::Stmt(&with.body), depth + 1);
            push(stack, Node::Expr(&with.obj), depth + 1);
        }
        Stmt::Return(ret) => {
            if let Some(arg) = &ret.arg {
                push(stack, Node::Expr(arg), depth + 1);
            }
        }
        Stmt::Labeled(labeled) => {
            push(stack, Node::Stmt(&labeled.body), depth + 1);
        }
        Stmt::If(if_stmt) => {
            if let Some(alt) = &if_stmt.alt {
                push(stack, Node::Stmt(alt), depth + 1);
            }
            push(stack, Node::Stmt(&if_stmt.cons), depth + 1);
            push(stack, Node::Expr(&if_stmt.test), depth + 1);
        }
        Stmt::Switch(switch) => {
            for case in switch.cases.iter().rev() {
                for s in case.cons.iter().rev() {
                    push(stack, Node::Stmt(s), depth + 1);
                }
                if let Some(test) = &case.test {
                    push(stack, Node::Expr(test), depth + 1);
                }
            }
            push(stack, Node::Expr(&switch.discriminant), depth + 1);
        }
        Stmt::Throw(throw) => {
            push(stack, Node::Expr(&throw.arg), depth + 1);
        }
        Stmt::Try(try_stmt) => {
            if let Some(finalizer) = &try_stmt.finalizer {
                for s in finalizer.stmts.iter().rev() {
                    push(stack, Node::Stmt(s), depth + 1);
                }
            }
            if let Some(handler) = &try_stmt.handler {
                for s in handler.body.stmts.iter().rev() {
                    push(stack, Node::Stmt(s), depth + 1);
                }
                if let Some(param) = &handler.param {
                    push(stack, Node::Pat(param), depth + 1);
                }
            }
            for s in try_stmt.block.stmts.iter().rev() {
                push(stack, Node::Stmt(s), depth + 1);
            }
        }
        Stmt::While(while_stmt) => {
            push(stack, Node::Stmt(&while_stmt.body), depth + 1);
            push(stack, Node::Expr(&while_stmt.test), depth + 1);
        }
        Stmt::DoWhile(do_while) => {
            push(stack, Node::Expr(&do_while.test), depth + 1);
            push(stack, Node::Stmt(&do_while.body), depth + 1);
        }
        Stmt::For(for_stmt) => {
            push(stack, Node::Stmt(&for_stmt.body), depth + 1);
            if let Some(update) = &for_stmt.update {
                push(stack, Node::Expr(update), depth + 1);
            }
            if let Some(test) = &for_stmt.test {
                push(stack, Node::Expr(test), depth + 1);
            }
            if let Some(init) = &for_stmt.init {
                match init {
                    VarDeclOrExpr::VarDecl(var) => push(stack, Node::VarDecl(var), depth + 1),
                    VarDeclOrExpr::Expr(expr) => push(stack, Node::Expr(expr), depth + 1),
                }
            }
        }
        Stmt::ForIn(for_in) => {
            push(stack, Node::Stmt(&for_in.body), depth + 1);
            push(stack, Node::Expr(&for_in.right), depth + 1);
            push_for_head(stack, &for_in.left, depth);
        }
        Stmt::ForOf(for_of) => {
            push(stack, Node::Stmt(&for_of.body), depth + 1);
            push(stack, Node::Expr(&for_of.right), depth + 1);
            push_for_head(stack, &for_of.left, depth);
        }
        Stmt::Decl(decl) => match decl {
            Decl::Fn(fn_decl) => {
                visitor.visit_fn_decl(fn_decl, ctx)?;
                push(stack, Node::Function(&fn_decl.function), depth + 1);
            }
            _ => push_decl(stack, decl, depth + 1),
        },
        Stmt::Expr(expr_stmt) => {
            push(stack, Node::Expr(&expr_stmt.expr), depth + 1);
        }
        Stmt::Empty(_) | Stmt::Debugger(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
    }

    ControlFlow::Continue(())
}

fn push_for_head<'a>(stack: &mut Vec<WorkItem<'a>>, head: &'a ForHead, depth: usize) {
    match head {
        ForHead::VarDecl(var) => push(stack, Node::VarDecl(var), depth + 1),
        ForHead::Pat(pat) => push(stack, Node::Pat(pat), depth + 1),
        ForHead::UsingDecl(_) => {}
    }
}

fn visit_expr<'a, V: AstVisitor>(
    visitor: &mut V,
    expr: &'a Expr,
    ctx: &VisitorContext,
    stack: &mut Vec<WorkItem<'a>>,
    depth: usize,
) -> ControlFlow<()> {
    match expr {
        Expr::Array(array) => {
            for elem in array.elems.iter().rev().flatten() {
                push(stack, Node::Expr(&elem.expr), depth + 1);
            }
        }
        Expr::Object(object) => {
            for prop in object.props.iter().rev() {
                match prop {
                    PropOrSpread::Spread(spread) => {
                        push(stack, Node::Expr(&spread.expr), depth + 1);
                    }
                    PropOrSpread::Prop(prop) => match prop.as_ref() {
                        Prop::Shorthand(_) => {}
                        Prop::KeyValue(kv) => {
                            push(stack, Node::Expr(&kv.value), depth + 1);
                            push(stack, Node::PropName(&kv.key), depth + 1);
                        }
                        Prop::Assign(assign) => {
                            push(stack, Node::Expr(&assign.value), depth + 1);
                        }
                        Prop::Getter(getter) => {
                            if let Some(body) = &getter.body {
                                push(stack, Node::FnBody(body), depth + 1);
                            }
                            push(stack, Node::PropName(&getter.key), depth + 1);
                        }
                        Prop::Setter(setter) => {
                            if let Some(body) = &setter.body {
                                push(stack, Node::FnBody(body), depth + 1);
                            }
                            push(stack, Node::Pat(&setter.param), depth + 1);
                            push(stack, Node::PropName(&setter.key), depth + 1);
                        }
                        Prop::Method(method) => {
                            push(stack, Node::Function(&method.function), depth + 1);
                            push(stack, Node::PropName(&method.key), depth + 1);
                        }
                    },
                }
            }
        }
        Expr::Fn(fn_expr) => {
            push(stack, Node::Function(&fn_expr.function), depth + 1);
        }
        Expr::Arrow(arrow) => {
            visitor.visit_arrow_expr(arrow, ctx)?;
            match arrow.body.as_ref() {
                BlockStmtOrExpr::BlockStmt(block) => {
                    for s in block.stmts.iter().rev() {
                        push(stack, Node::Stmt(s), depth + 1);
                    }
                }
                BlockStmtOrExpr::Expr(body) => {
                    push(stack, Node::Expr(body), depth + 1);
                }
            }
            for param in arrow.params.iter().rev() {
                push(stack, Node::Pat(param), depth + 1);
            }
        }
        Expr::Unary(unary) => {
            push(stack, Node::Expr(&unary.arg), depth + 1);
        }
        Expr::Update(update) => {
            push(stack, Node::Expr(&update.arg), depth + 1);
        }
        Expr::Bin(bin) => {
            push(stack, Node::Expr(&bin.right), depth + 1);
            push(stack, Node::Expr(&bin.left), depth + 1);
        }
        Expr::Assign(assign) => {
            visitor.visit_assign_expr(assign, ctx)?;
            push(stack, Node::Expr(&assign.right), depth + 1);
            push_assign_target(stack, &assign.left, depth);
        }
        Expr::Member(member) => {
            visitor.visit_member_expr(member, ctx)?;
            if let MemberProp::Computed(computed) = &member.prop {
                push(stack, Node::Expr(&computed.expr), depth + 1);
            }
            push(stack, Node::Expr(&member.obj), depth + 1);
        }
        Expr::SuperProp(super_prop) => {
            if let SuperProp::Computed(computed) = &super_prop.prop {
                push(stack, Node::Expr(&computed.expr), depth + 1);
            }
        }
        Expr::Cond(cond) => {
            push(stack, Node::Expr(&cond.alt), depth + 1);
            push(stack, Node::Expr(&cond.cons), depth + 1);
            push(stack, Node::Expr(&cond.test), depth + 1);
        }
        Expr::Call(call) => {
            visitor.visit_call_expr(call, ctx)?;
            for arg in call.args.iter().rev() {
                push(stack, Node::Expr(&arg.expr), depth + 1);
            }
            if let Callee::Expr(callee) = &call.callee {
                push(stack, Node::Expr(callee), depth + 1);
            }
        }
        Expr::New(new_expr) => {
            visitor.visit_new_expr(new_expr, ctx)?;
            if let Some(args) = &new_expr.args {
                for arg in args.iter().rev() {
                    push(stack, Node::Expr(&arg.expr), depth + 1);
                }
            }
            push(stack, Node::Expr(&new_expr.callee), depth + 1);
        }
        Expr::Seq(seq) => {
            for e in seq.exprs.iter().rev() {
                push(stack, Node::Expr(e), depth + 1);
            }
        }
        Expr::Tpl(tpl) => {
            for e in tpl.exprs.iter().rev() {
                push(stack, Node::Expr(e), depth + 1);
            }
        }
        Expr::TaggedTpl(tagged) => {
            for e in tagged.tpl.exprs.iter().rev() {
                push(stack, Node::Expr(e), depth + 1);
            }
            push(stack, Node::Expr(&tagged.tag), depth + 1);
        }
        Expr::Class(class_expr) => {
            push(stack, Node::Class(&class_expr.class), depth + 1);
        }
        Expr::Yield(yield_expr) => {
            if let Some(arg) = &yield_expr.arg {
                push(stack, Node::Expr(arg), depth + 1);
            }
        }
        Expr::Await(await_expr) => {
            push(stack, Node::Expr(&await_expr.arg), depth + 1);
        }
        Expr::Paren(paren) => {
            push(stack, Node::Expr(&paren.expr), depth + 1);
        }
        Expr::OptChain(opt_chain) => {
            visitor.visit_opt_chain_expr(opt_chain, ctx)?;
            match opt_chain.base.as_ref() {
                OptChainBase::Member(member) => {
                    if let MemberProp::Computed(computed) = &member.prop {
                        push(stack, Node::Expr(&computed.expr), depth + 1);
                    }
                    push(stack, Node::Expr(&member.obj), depth + 1);
                }
                OptChainBase::Call(call) => {
                    for arg in call.args.iter().rev() {
                        push(stack, Node::Expr(&arg.expr), depth + 1);
                    }
                    push(stack, Node::Expr(&call.callee), depth + 1);
                }
            }
        }
        Expr::TsNonNull(non_null) => {
            push(stack, Node::Expr(&non_null.expr), depth + 1);
        }
        Expr::TsAs(as_expr) => {
            push(stack, Node::Expr(&as_expr.expr), depth + 1);
        }
        Expr::TsSatisfies(satisfies) => {
            push(stack, Node::Expr(&satisfies.expr), depth + 1);
        }
        Expr::TsConstAssertion(assertion) => {
            push(stack, Node::Expr(&assertion.expr), depth + 1);
        }
        Expr::TsTypeAssertion(assertion) => {
            push(stack, Node::Expr(&assertion.expr), depth + 1);
        }
        // identifiers, literals, JSX and the remaining TS-only wrappers
        // carry nothing the rule hooks inspect
        _ => {}
    }

    ControlFlow::Continue(())
}

fn push_assign_target<'a>(stack: &mut Vec<WorkItem<'a>>, target: &'a AssignTarget, depth: usize) {
    match target {
        AssignTarget::Simple(simple) => match simple {
            SimpleAssignTarget::Member(member) => {
                if let MemberProp::Computed(computed) = &member.prop {
                    push(stack, Node::Expr(&computed.expr), depth + 1);
                }
                push(stack, Node::Expr(&member.obj), depth + 1);
            }
            SimpleAssignTarget::Paren(paren) => {
                push(stack, Node::Expr(&paren.expr), depth + 1);
            }
            _ => {}
        },
        AssignTarget::Pat(pat) => match pat {
            AssignTargetPat::Array(array) => {
                for elem in array.elems.iter().rev().flatten() {
                    push(stack, Node::Pat(elem), depth + 1);
                }
            }
            AssignTargetPat::Object(object) => {
                push_object_pat_props(stack, &object.props, depth);
            }
            AssignTargetPat::Invalid(_) => {}
        },
    }
}

fn push_pat_children<'a>(stack: &mut Vec<WorkItem<'a>>, pat: &'a Pat, depth: usize) {
    match pat {
        Pat::Array(array) => {
            for elem in array.elems.iter().rev().flatten() {
                push(stack, Node::Pat(elem), depth + 1);
            }
        }
        Pat::Rest(rest) => {
            push(stack, Node::Pat(&rest.arg), depth + 1);
        }
        Pat::Object(object) => {
            push_object_pat_props(stack, &object.props, depth);
        }
        Pat::Assign(assign) => {
            push(stack, Node::Expr(&assign.right), depth + 1);
            push(stack, Node::Pat(&assign.left), depth + 1);
        }
        Pat::Expr(expr) => {
            push(stack, Node::Expr(expr), depth + 1);
        }
        Pat::Ident(_) | Pat::Invalid(_) => {}
    }
}

fn push_object_pat_props<'a>(
    stack: &mut Vec<WorkItem<'a>>,
    props: &'a [ObjectPatProp],
    depth: usize,
) {
    for prop in props.iter().rev() {
        match prop {
            ObjectPatProp::KeyValue(kv) => {
                push(stack, Node::Pat(&kv.value), depth + 1);
                push(stack, Node::PropName(&kv.key), depth + 1);
            }
            ObjectPatProp::Assign(assign) => {
                if let Some(value) = &assign.value {
                    push(stack, Node::Expr(value), depth + 1);
                }
            }
            ObjectPatProp::Rest(rest) => {
                push(stack, Node::Pat(&rest.arg), depth + 1);
            }
        }
    }
}

fn push_class_children<'a>(
    stack: &mut Vec<WorkItem<'a>>,
    class: &'a swc_ecma_ast::Class,
    depth: usize,
) {
    for member in class.body.iter().rev() {
        match member {
            ClassMember::Constructor(constructor) => {
                if let Some(body) = &constructor.body {
                    push(stack, Node::FnBody(body), depth + 1);
                }
                for param in constructor.params.iter().rev() {
                    match param {
                        ParamOrTsParamProp::Param(param) => {
                            push(stack, Node::Pat(&param.pat), depth + 1);
                        }
                        ParamOrTsParamProp::TsParamProp(prop) => {
                            if let TsParamPropParam::Assign(assign) = &prop.param {
                                push(stack, Node::Expr(&assign.right), depth + 1);
                            }
                        }
                    }
                }
            }
            ClassMember::Method(method) => {
                push(stack, Node::Function(&method.function), depth + 1);
            }
            ClassMember::PrivateMethod(method) => {
                push(stack, Node::Function(&method.function), depth + 1);
            }
            ClassMember::ClassProp(prop) => {
                if let Some(value) = &prop.value {
                    push(stack, Node::Expr(value), depth + 1);
                }
            }
            ClassMember::PrivateProp(prop) => {
                if let Some(value) = &prop.value {
                    push(stack, Node::Expr(value), depth + 1);
                }
            }
            ClassMember::StaticBlock(block) => {
                push(stack, Node::FnBody(&block.body), depth + 1);
            }
            _ => {}
        }
    }
    if let Some(super_class) = &class.super_class {
        push(stack, Node::Expr(super_class), depth + 1);
    }
}
