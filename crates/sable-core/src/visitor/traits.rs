//! AstVisitor trait for uniform AST traversal.

use std::ops::ControlFlow;

use swc_ecma_ast::{
    ArrowExpr, AssignExpr, BlockStmt, CallExpr, FnDecl, Function, MemberExpr, NewExpr,
    OptChainExpr, VarDecl,
};

use super::context::VisitorContext;

/// Hooks fire in document order (parents before children). Returning
/// `ControlFlow::Break(())` aborts the remainder of the walk.
pub trait AstVisitor {
    fn visit_fn_decl(&mut self, _node: &FnDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Fires for every non-arrow function body: declarations, function
    /// expressions, class methods, and object-literal methods.
    fn visit_function(&mut self, _node: &Function, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_arrow_expr(&mut self, _node: &ArrowExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Fires for function-shaped bodies that carry no `Function` node:
    /// class constructors, `static {}` blocks, and object-literal
    /// getters/setters.
    fn visit_block_body(&mut self, _node: &BlockStmt, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_var_decl(&mut self, _node: &VarDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_call_expr(&mut self, _node: &CallExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_new_expr(&mut self, _node: &NewExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_member_expr(&mut self, _node: &MemberExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_opt_chain_expr(
        &mut self,
        _node: &OptChainExpr,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_assign_expr(&mut self, _node: &AssignExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}
