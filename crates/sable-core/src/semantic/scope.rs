//! Scope analysis for variable bindings and references
//!
//! This module provides a scope tree data structure for representing
//! nested program scopes (global, function, block).

use id_arena::{Arena, Id};
use swc_common::Span;

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    ArrowFunction,
    Block,
    For,
    While,
    Switch,
    Try,
    Catch,
    Class,
}

impl ScopeKind {
    pub fn is_function_like(self) -> bool {
        matches!(self, ScopeKind::Function | ScopeKind::ArrowFunction)
    }

    /// Block-like scopes are transparent when deciding which scope
    /// "owns" a nested function (a function inside a bare block at the
    /// top level still belongs to the root).
    pub fn is_block_like(self) -> bool {
        matches!(
            self,
            ScopeKind::Block
                | ScopeKind::For
                | ScopeKind::While
                | ScopeKind::Switch
                | ScopeKind::Try
                | ScopeKind::Catch
        )
    }
}

#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub span: Span,
    /// Display name for function-like scopes, resolved from the
    /// declaration or enclosing declarator/assignment. `None` for
    /// anonymous functions and non-function scopes.
    pub name: Option<String>,
}

pub struct ScopeTree {
    arena: Arena<Scope>,
    root: Option<ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn create_scope(
        &mut self,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        span: Span,
        name: Option<String>,
    ) -> ScopeId {
        let id = self.arena.alloc_with_id(|id| Scope {
            id,
            kind,
            parent,
            children: Vec::new(),
            span,
            name,
        });

        if let Some(parent_id) = parent {
            self.arena[parent_id].children.push(id);
        }

        if self.root.is_none() {
            self.root = Some(id);
        }

        id
    }

    pub fn root(&self) -> Option<ScopeId> {
        self.root
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }

    pub fn parent(&self, id: ScopeId) -> Option<&Scope> {
        self.arena[id].parent.map(|p| &self.arena[p])
    }

    pub fn children(&self, id: ScopeId) -> impl Iterator<Item = &Scope> {
        self.arena[id].children.iter().map(|&c| &self.arena[c])
    }

    pub fn ancestors(&self, id: ScopeId) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            current: Some(id),
        }
    }

    pub fn is_descendant_of(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        self.ancestors(scope).any(|s| s.id == ancestor)
    }

    /// The innermost scope whose span contains `pos`, starting from the
    /// root. Returns the root when no child claims the position.
    pub fn narrowest_scope_at(&self, pos: u32) -> Option<ScopeId> {
        let mut current = self.root?;

        'descend: loop {
            for &child_id in &self.arena[current].children {
                let child = &self.arena[child_id];
                if child.span.lo.0 <= pos && pos < child.span.hi.0 {
                    current = child_id;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// The nearest function-like scope enclosing `id` (including `id`
    /// itself). `None` when the scope sits directly in module code.
    pub fn nearest_function_scope(&self, id: ScopeId) -> Option<ScopeId> {
        self.ancestors(id)
            .find(|s| s.kind.is_function_like())
            .map(|s| s.id)
    }

    /// The nearest ancestor of `id` that is not block-like.
    pub fn nearest_non_block_ancestor(&self, id: ScopeId) -> Option<ScopeId> {
        let parent = self.arena[id].parent?;
        self.ancestors(parent)
            .find(|s| !s.kind.is_block_like())
            .map(|s| s.id)
    }
}

pub struct AncestorIter<'a> {
    tree: &'a ScopeTree,
    current: Option<ScopeId>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let current_id = self.current?;
        let scope = &self.tree.arena[current_id];
        self.current = scope.parent;
        Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::{BytePos, DUMMY_SP};

    fn span_at(lo: u32, hi: u32) -> Span {
        Span::new(BytePos(lo), BytePos(hi))
    }

    #[test]
    fn creates_global_scope() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);

        assert_eq!(tree.root(), Some(global));

        let scope = tree.get(global);
        assert_eq!(scope.kind, ScopeKind::Global);
        assert!(scope.parent.is_none());
        assert!(scope.children.is_empty());
        assert!(scope.name.is_none());
    }

    #[test]
    fn function_scope_carries_name() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let func = tree.create_scope(
            ScopeKind::Function,
            Some(global),
            span_at(10, 50),
            Some("handler".to_string()),
        );

        let func_scope = tree.get(func);
        assert_eq!(func_scope.kind, ScopeKind::Function);
        assert_eq!(func_scope.parent, Some(global));
        assert_eq!(func_scope.name.as_deref(), Some("handler"));

        assert_eq!(tree.get(global).children, vec![func]);
    }

    #[test]
    fn ancestors_iterator_traverses_parent_chain() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let func = tree.create_scope(ScopeKind::Function, Some(global), DUMMY_SP, None);
        let block = tree.create_scope(ScopeKind::Block, Some(func), DUMMY_SP, None);

        let ancestors: Vec<ScopeKind> = tree.ancestors(block).map(|s| s.kind).collect();

        assert_eq!(
            ancestors,
            vec![ScopeKind::Block, ScopeKind::Function, ScopeKind::Global]
        );
    }

    #[test]
    fn is_descendant_of_checks_ancestry() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let func = tree.create_scope(ScopeKind::Function, Some(global), DUMMY_SP, None);
        let block = tree.create_scope(ScopeKind::Block, Some(func), DUMMY_SP, None);

        assert!(tree.is_descendant_of(block, block));
        assert!(tree.is_descendant_of(block, func));
        assert!(tree.is_descendant_of(block, global));
        assert!(!tree.is_descendant_of(global, func));
        assert!(!tree.is_descendant_of(func, block));
    }

    #[test]
    fn narrowest_scope_at_finds_innermost() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, span_at(0, 100), None);
        let func = tree.create_scope(ScopeKind::Function, Some(global), span_at(10, 90), None);
        let block = tree.create_scope(ScopeKind::Block, Some(func), span_at(20, 40), None);

        assert_eq!(tree.narrowest_scope_at(25), Some(block));
        assert_eq!(tree.narrowest_scope_at(50), Some(func));
        assert_eq!(tree.narrowest_scope_at(95), Some(global));
    }

    #[test]
    fn narrowest_scope_at_empty_tree() {
        let tree = ScopeTree::new();
        assert_eq!(tree.narrowest_scope_at(5), None);
    }

    #[test]
    fn nearest_function_scope_skips_blocks() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let func = tree.create_scope(ScopeKind::Function, Some(global), DUMMY_SP, None);
        let for_scope = tree.create_scope(ScopeKind::For, Some(func), DUMMY_SP, None);
        let block = tree.create_scope(ScopeKind::Block, Some(for_scope), DUMMY_SP, None);

        assert_eq!(tree.nearest_function_scope(block), Some(func));
        assert_eq!(tree.nearest_function_scope(func), Some(func));
        assert_eq!(tree.nearest_function_scope(global), None);
    }

    #[test]
    fn nearest_non_block_ancestor_skips_block_chain() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let block = tree.create_scope(ScopeKind::Block, Some(global), DUMMY_SP, None);
        let func = tree.create_scope(ScopeKind::Function, Some(block), DUMMY_SP, None);

        assert_eq!(tree.nearest_non_block_ancestor(func), Some(global));
        assert_eq!(tree.nearest_non_block_ancestor(global), None);
    }

    #[test]
    fn all_scope_kinds_can_be_created() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);

        let kinds = vec![
            ScopeKind::Function,
            ScopeKind::ArrowFunction,
            ScopeKind::Block,
            ScopeKind::For,
            ScopeKind::While,
            ScopeKind::Switch,
            ScopeKind::Try,
            ScopeKind::Catch,
            ScopeKind::Class,
        ];

        for kind in kinds {
            let scope_id = tree.create_scope(kind, Some(global), DUMMY_SP, None);
            assert_eq!(tree.get(scope_id).kind, kind);
        }
    }
}
