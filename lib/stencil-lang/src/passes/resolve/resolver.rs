//! Name resolution
//!
//! Builds the scope tree from the merged declaration list, merging
//! same-named namespaces as it goes, then resolves every nest/import
//! reference to its target template.
//!
//! Qualified names commit to their leading qualifier: the first segment may
//! search outward through enclosing scopes, but every later segment must
//! name a direct child of the scope reached so far.

use crate::ast::ast::{Ast, DeclId, DeclKind, Path, Program, RefId, StmtKind};
use crate::ast::Loc;
use crate::context::Symbol;
use crate::error::{CompileError, CompileErrorKind};
use crate::passes::resolve::{ResolutionTable, ScopeId, ScopeTree};

/// Concatenate the translation units of one compilation into a single
/// declaration list, in file order.
pub fn merge(programs: Vec<Program>) -> Program {
    Program {
        decls: programs.into_iter().flat_map(|p| p.decls).collect(),
    }
}

/// Results of the resolution pass, minus the arenas it borrowed.
pub struct Resolved {
    pub root: Program,
    pub scopes: ScopeTree,
    pub resolutions: ResolutionTable,
}

pub struct NameResolver<'a> {
    ast: &'a mut Ast,
    scopes: ScopeTree,
    resolutions: ResolutionTable,
}

impl<'a> NameResolver<'a> {
    pub fn new(ast: &'a mut Ast) -> Self {
        Self {
            ast,
            scopes: ScopeTree::new(),
            resolutions: ResolutionTable::default(),
        }
    }

    pub fn resolve(mut self, program: Program) -> Result<Resolved, CompileError> {
        let root_scope = self.scopes.root();
        let decls = self.collect(program.decls, root_scope)?;
        self.resolve_bodies(&decls)?;
        Ok(Resolved {
            root: Program { decls },
            scopes: self.scopes,
            resolutions: self.resolutions,
        })
    }

    /// Bind a declaration list into `scope`, merging namespaces. Returns the
    /// surviving declarations: a namespace merged into an earlier one is
    /// dropped from the list, as is any declaration already bound (which
    /// happens when the same unit is merged twice).
    fn collect(&mut self, decls: Vec<DeclId>, scope: ScopeId) -> Result<Vec<DeclId>, CompileError> {
        let mut out = Vec::new();

        for id in decls {
            let decl = self.ast.decls.get(id);
            let name = decl.name();
            let loc = decl.loc.clone();
            let members = match &decl.kind {
                DeclKind::Namespace { members, .. } => Some(members.clone()),
                DeclKind::Template { .. } => None,
            };

            match (self.scopes.lookup_local(scope, name), members) {
                (Some(prev), _) if prev == id => {}
                (Some(prev), Some(new_members)) => {
                    self.merge_namespace(prev, new_members, name, loc)?;
                }
                (Some(_), None) => {
                    return Err(CompileError::new(
                        CompileErrorKind::Redefinition { name },
                        loc,
                    ));
                }
                (None, Some(new_members)) => {
                    let child = self.scopes.named_child(scope, name);
                    self.scopes.bind(scope, name, id);
                    self.resolutions.decl_scopes.insert(id, child);
                    let collected = self.collect(new_members, child)?;
                    if let DeclKind::Namespace { members, .. } = &mut self.ast.decls.get_mut(id).kind
                    {
                        *members = collected;
                    }
                    out.push(id);
                }
                (None, None) => {
                    let child = self.scopes.anonymous_child(scope);
                    self.scopes.bind(scope, name, id);
                    self.resolutions.decl_scopes.insert(id, child);
                    out.push(id);
                }
            }
        }

        Ok(out)
    }

    /// Fold a later namespace's members into the one already bound under
    /// the same name.
    fn merge_namespace(
        &mut self,
        prev: DeclId,
        new_members: Vec<DeclId>,
        name: Symbol,
        loc: Loc,
    ) -> Result<(), CompileError> {
        if !matches!(self.ast.decls.get(prev).kind, DeclKind::Namespace { .. }) {
            return Err(CompileError::new(
                CompileErrorKind::Redefinition { name },
                loc,
            ));
        }

        let prev_scope = match self.resolutions.decl_scopes.get(&prev) {
            Some(scope) => *scope,
            None => {
                return Err(CompileError::internal(
                    "resolve",
                    "namespace bound without a scope",
                    loc,
                ));
            }
        };

        let collected = self.collect(new_members, prev_scope)?;
        if let DeclKind::Namespace { members, .. } = &mut self.ast.decls.get_mut(prev).kind {
            members.extend(collected);
        }

        Ok(())
    }

    fn resolve_bodies(&mut self, decls: &[DeclId]) -> Result<(), CompileError> {
        for &id in decls {
            match &self.ast.decls.get(id).kind {
                DeclKind::Namespace { members, .. } => {
                    let members = members.clone();
                    self.resolve_bodies(&members)?;
                }
                DeclKind::Template { body, .. } => {
                    let body = body.clone();
                    let scope = match self.resolutions.decl_scopes.get(&id) {
                        Some(scope) => *scope,
                        None => {
                            let loc = self.ast.decls.get(id).loc.clone();
                            return Err(CompileError::internal(
                                "resolve",
                                "template bound without a scope",
                                loc,
                            ));
                        }
                    };
                    for stmt in body {
                        let refs = match &self.ast.stmts.get(stmt).kind {
                            StmtKind::Import { refs, .. } | StmtKind::Nest { refs, .. } => {
                                refs.clone()
                            }
                            StmtKind::Raw(_) => continue,
                        };
                        for r in refs {
                            self.resolve_ref(r, scope)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_ref(&mut self, r: RefId, scope: ScopeId) -> Result<(), CompileError> {
        let (path, loc) = {
            let rf = self.ast.refs.get(r);
            (rf.path.clone(), rf.loc.clone())
        };

        let target = match &path {
            Path::Simple(name) => self.scopes.lookup(scope, *name).ok_or_else(|| {
                CompileError::new(CompileErrorKind::UnresolvedReference { name: *name }, loc.clone())
                    .with_context("not found in this scope or any enclosing one")
            })?,
            Path::Qualified(parts) => {
                let (last, quals) = match parts.split_last() {
                    Some(split) => split,
                    None => {
                        return Err(CompileError::internal(
                            "resolve",
                            "qualified path with no segments",
                            loc,
                        ));
                    }
                };
                let (first, rest) = match quals.split_first() {
                    Some(split) => split,
                    None => {
                        return Err(CompileError::internal(
                            "resolve",
                            "qualified path with a single segment",
                            loc,
                        ));
                    }
                };

                let mut cursor = self.scopes.outer_scope(scope, *first).ok_or_else(|| {
                    CompileError::new(
                        CompileErrorKind::UnreachableScope { name: *first },
                        loc.clone(),
                    )
                })?;
                for q in rest {
                    cursor = self.scopes.child_scope(cursor, *q).ok_or_else(|| {
                        CompileError::new(
                            CompileErrorKind::UnreachableScope { name: *q },
                            loc.clone(),
                        )
                        .with_context("qualifiers after the first must name direct child namespaces")
                    })?;
                }

                self.scopes.lookup_local(cursor, *last).ok_or_else(|| {
                    CompileError::new(
                        CompileErrorKind::UnresolvedReference { name: *last },
                        loc.clone(),
                    )
                    .with_context("not declared in the namespace the qualifiers name")
                })?
            }
        };

        if matches!(self.ast.decls.get(target).kind, DeclKind::Namespace { .. }) {
            return Err(CompileError::new(
                CompileErrorKind::NotATemplate { path },
                loc,
            ));
        }

        self.resolutions.refs.insert(r, target);
        Ok(())
    }
}
