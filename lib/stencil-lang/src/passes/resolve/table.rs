use std::collections::HashMap;

use crate::ast::ast::{Ast, DeclId, Program, RefId};
use crate::context::GlobalContext;
use crate::passes::resolve::{ScopeId, ScopeTree};

/// Results of name resolution: every reference mapped to its target
/// declaration, and every declaration mapped to the scope it owns.
#[derive(Debug, Default)]
pub struct ResolutionTable {
    pub refs: HashMap<RefId, DeclId>,
    pub decl_scopes: HashMap<DeclId, ScopeId>,
}

/// A fully resolved compilation, ready for path assignment and code
/// generation.
#[derive(Debug)]
pub struct ResolvedProgram {
    pub ast: Ast,
    pub gcx: GlobalContext,
    pub root: Program,
    pub scopes: ScopeTree,
    pub resolutions: ResolutionTable,
}
