//! Scope tree
//!
//! A tree of lexical scopes. Each namespace owns a named child scope of its
//! parent; each template owns an anonymous child scope. Bindings and child
//! names keep insertion order so generated output is deterministic.

use indexmap::IndexMap;

use crate::ast::ast::DeclId;
use crate::context::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    bindings: IndexMap<Symbol, DeclId>,
    children: IndexMap<Symbol, ScopeId>,
}

#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    /// Create a child scope reachable from its parent by name. Used for
    /// namespaces, whose members can be addressed from outside.
    pub fn named_child(&mut self, parent: ScopeId, name: Symbol) -> ScopeId {
        let id = self.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        self.scopes[parent.idx()].children.insert(name, id);
        id
    }

    /// Create a child scope with no name. Used for template bodies, which
    /// are never addressed from outside.
    pub fn anonymous_child(&mut self, parent: ScopeId) -> ScopeId {
        self.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        })
    }

    pub fn bind(&mut self, scope: ScopeId, name: Symbol, decl: DeclId) {
        self.scopes[scope.idx()].bindings.insert(name, decl);
    }

    pub fn lookup_local(&self, scope: ScopeId, name: Symbol) -> Option<DeclId> {
        self.scopes[scope.idx()].bindings.get(&name).copied()
    }

    /// Unqualified lookup: search this scope, then each enclosing scope out
    /// to the root.
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<DeclId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if let Some(decl) = self.lookup_local(id, name) {
                return Some(decl);
            }
            cursor = self.scopes[id.idx()].parent;
        }
        None
    }

    /// A direct child scope by name, with no fallback to enclosing scopes.
    pub fn child_scope(&self, scope: ScopeId, name: Symbol) -> Option<ScopeId> {
        self.scopes[scope.idx()].children.get(&name).copied()
    }

    /// The scope a leading qualifier denotes: the nearest enclosing scope
    /// (including this one) with a child of that name.
    pub fn outer_scope(&self, scope: ScopeId, name: Symbol) -> Option<ScopeId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if let Some(child) = self.child_scope(id, name) {
                return Some(child);
            }
            cursor = self.scopes[id.idx()].parent;
        }
        None
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
