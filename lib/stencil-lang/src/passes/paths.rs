//! Path assignment
//!
//! Maps every declaration to its place in the output tree. A declaration's
//! path is the chain of namespace names from the root down to it, so the
//! generated files mirror the namespace hierarchy on disk and the same
//! paths serve as `#include` lines in the generated code.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::ast::ast::{DeclId, DeclKind};
use crate::passes::resolve::ResolvedProgram;

#[derive(Debug, Default)]
pub struct PathTable {
    segments: HashMap<DeclId, Vec<String>>,
}

impl PathTable {
    pub fn segments(&self, id: DeclId) -> Option<&[String]> {
        self.segments.get(&id).map(Vec::as_slice)
    }

    /// The filesystem path of a declaration's directory entry, without a
    /// file suffix. Namespaces become directories, templates become file
    /// stems.
    pub fn fs_path(&self, id: DeclId) -> Option<PathBuf> {
        self.segments.get(&id).map(|segs| segs.iter().collect())
    }

    /// The root-relative include path, '/'-joined regardless of host
    /// platform since it lands inside generated C code.
    pub fn include_path(&self, id: DeclId) -> Option<String> {
        self.segments.get(&id).map(|segs| segs.join("/"))
    }

    pub fn file_path(&self, id: DeclId, suffix: &str) -> Option<PathBuf> {
        let mut path = self.fs_path(id)?;
        path.set_extension(suffix);
        Some(path)
    }

    pub fn include_file(&self, id: DeclId, suffix: &str) -> Option<String> {
        Some(format!("{}.{}", self.include_path(id)?, suffix))
    }
}

/// Walk the resolved declaration tree top-down and record each
/// declaration's namespace chain.
pub fn assign_paths(program: &ResolvedProgram) -> PathTable {
    let mut table = PathTable::default();
    let mut prefix = Vec::new();
    for &decl in &program.root.decls {
        assign_decl(program, decl, &mut prefix, &mut table);
    }
    table
}

fn assign_decl(
    program: &ResolvedProgram,
    id: DeclId,
    prefix: &mut Vec<String>,
    table: &mut PathTable,
) {
    let decl = program.ast.decls.get(id);
    let name = program.gcx.interner.resolve(decl.name()).to_string();

    prefix.push(name);
    table.segments.insert(id, prefix.clone());

    if let DeclKind::Namespace { members, .. } = &decl.kind {
        for &member in members {
            assign_decl(program, member, prefix, table);
        }
    }

    prefix.pop();
}
