//! Symbol table for tracking declarations and references
//!
//! This module provides a symbol table that stores all declarations
//! with their scope and supports lookup with scope chain traversal.

use std::collections::HashMap;

use id_arena::{Arena, Id};
use swc_common::Span;

use super::scope::{ScopeId, ScopeTree};

pub type SymbolId = Id<Symbol>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function,
    Class,
    Parameter,
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Parameter,
    Import,
}

#[derive(Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub declaration_kind: DeclarationKind,
    pub scope: ScopeId,
    /// Span of the declared identifier itself.
    pub span: Span,
    /// Span of the whole declarator (`x = init()` including the
    /// initializer). References inside this span are initializing
    /// references, not uses. Equals `span` for non-variable symbols.
    pub declarator_span: Span,
    pub is_exported: bool,
    pub references: Vec<Span>,
}

impl Symbol {
    pub fn is_initializing_reference(&self, reference: Span) -> bool {
        reference.lo >= self.declarator_span.lo && reference.hi <= self.declarator_span.hi
    }
}

#[derive(Debug, Clone)]
pub struct UnresolvedReference {
    pub name: String,
    pub span: Span,
    pub scope: ScopeId,
}

pub struct SymbolTable {
    arena: Arena<Symbol>,
    by_scope: HashMap<ScopeId, HashMap<String, SymbolId>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            by_scope: HashMap::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        declaration_kind: DeclarationKind,
        scope: ScopeId,
        span: Span,
        declarator_span: Span,
        is_exported: bool,
    ) -> SymbolId {
        let id = self.arena.alloc_with_id(|id| Symbol {
            id,
            name: name.to_string(),
            kind,
            declaration_kind,
            scope,
            span,
            declarator_span,
            is_exported,
            references: Vec::new(),
        });

        self.by_scope
            .entry(scope)
            .or_default()
            .insert(name.to_string(), id);

        id
    }

    pub fn lookup(&self, name: &str, scope: ScopeId, scope_tree: &ScopeTree) -> Option<SymbolId> {
        if let Some(scope_symbols) = self.by_scope.get(&scope) {
            if let Some(&id) = scope_symbols.get(name) {
                return Some(id);
            }
        }

        if let Some(parent) = scope_tree.get(scope).parent {
            return self.lookup(name, parent, scope_tree);
        }

        None
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id]
    }

    pub fn add_reference(&mut self, symbol_id: SymbolId, reference_span: Span) {
        self.arena[symbol_id].references.push(reference_span);
    }

    pub fn symbols_in_scope(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.by_scope
            .get(&scope)
            .into_iter()
            .flat_map(|symbols| symbols.values().map(|&id| &self.arena[id]))
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.arena.iter().map(|(_, s)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::scope::{ScopeKind, ScopeTree};
    use swc_common::{BytePos, DUMMY_SP};

    fn span_at(lo: u32, hi: u32) -> Span {
        Span::new(BytePos(lo), BytePos(hi))
    }

    fn declare_simple(
        symbols: &mut SymbolTable,
        name: &str,
        scope: ScopeId,
    ) -> SymbolId {
        symbols.declare(
            name,
            SymbolKind::Variable,
            DeclarationKind::Let,
            scope,
            DUMMY_SP,
            DUMMY_SP,
            false,
        )
    }

    #[test]
    fn register_symbol() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);

        let mut symbols = SymbolTable::new();
        let symbol_id = symbols.declare(
            "x",
            SymbolKind::Constant,
            DeclarationKind::Const,
            global,
            span_at(6, 7),
            span_at(6, 12),
            false,
        );

        let symbol = symbols.get(symbol_id);
        assert_eq!(symbol.name, "x");
        assert_eq!(symbol.kind, SymbolKind::Constant);
        assert_eq!(symbol.declaration_kind, DeclarationKind::Const);
        assert_eq!(symbol.scope, global);
        assert_eq!(symbol.declarator_span, span_at(6, 12));
        assert!(!symbol.is_exported);
        assert!(symbol.references.is_empty());
    }

    #[test]
    fn lookup_in_parent_scope() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let func = scope_tree.create_scope(ScopeKind::Function, Some(global), DUMMY_SP, None);
        let block = scope_tree.create_scope(ScopeKind::Block, Some(func), DUMMY_SP, None);

        let mut symbols = SymbolTable::new();
        let declared_id = declare_simple(&mut symbols, "x", global);

        assert_eq!(symbols.lookup("x", block, &scope_tree), Some(declared_id));
        assert_eq!(symbols.lookup("x", func, &scope_tree), Some(declared_id));
    }

    #[test]
    fn shadowing_returns_local() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let block = scope_tree.create_scope(ScopeKind::Block, Some(global), DUMMY_SP, None);

        let mut symbols = SymbolTable::new();
        let outer_x = declare_simple(&mut symbols, "x", global);
        let inner_x = declare_simple(&mut symbols, "x", block);

        assert_eq!(symbols.lookup("x", block, &scope_tree), Some(inner_x));
        assert_eq!(symbols.lookup("x", global, &scope_tree), Some(outer_x));
    }

    #[test]
    fn lookup_nonexistent_returns_none() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);

        let symbols = SymbolTable::new();
        assert!(symbols.lookup("undeclared", global, &scope_tree).is_none());
    }

    #[test]
    fn add_reference_tracks_usage() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);

        let mut symbols = SymbolTable::new();
        let symbol_id = declare_simple(&mut symbols, "x", global);

        symbols.add_reference(symbol_id, span_at(10, 11));
        symbols.add_reference(symbol_id, span_at(20, 21));

        let symbol = symbols.get(symbol_id);
        assert_eq!(symbol.references.len(), 2);
        assert_eq!(symbol.references[0], span_at(10, 11));
    }

    #[test]
    fn initializing_reference_partition() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);

        let mut symbols = SymbolTable::new();
        // const x = make(x0);   declarator covers bytes 6..20
        let symbol_id = symbols.declare(
            "x",
            SymbolKind::Constant,
            DeclarationKind::Const,
            global,
            span_at(6, 7),
            span_at(6, 20),
            false,
        );

        let symbol = symbols.get(symbol_id);
        assert!(symbol.is_initializing_reference(span_at(12, 14)));
        assert!(!symbol.is_initializing_reference(span_at(30, 31)));
    }

    #[test]
    fn symbols_in_scope_iteration() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let func = scope_tree.create_scope(ScopeKind::Function, Some(global), DUMMY_SP, None);

        let mut symbols = SymbolTable::new();
        declare_simple(&mut symbols, "x", global);
        declare_simple(&mut symbols, "y", global);
        declare_simple(&mut symbols, "a", func);

        let global_symbols: Vec<&str> = symbols
            .symbols_in_scope(global)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(global_symbols.len(), 2);
        assert!(global_symbols.contains(&"x"));
        assert!(global_symbols.contains(&"y"));

        let func_symbols: Vec<&str> = symbols
            .symbols_in_scope(func)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(func_symbols, vec!["a"]);
    }

    #[test]
    fn all_symbols_spans_every_scope() {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, DUMMY_SP, None);
        let func = scope_tree.create_scope(ScopeKind::Function, Some(global), DUMMY_SP, None);

        let mut symbols = SymbolTable::new();
        declare_simple(&mut symbols, "x", global);
        declare_simple(&mut symbols, "a", func);

        assert_eq!(symbols.all_symbols().count(), 2);
    }
}
