#![allow(dead_code)]

use stencil_lang::ast::ast::{Ast, DeclId, DeclKind};
use stencil_lang::codegen::output::OutputTree;
use stencil_lang::codegen::{GenConfig, Generator};
use stencil_lang::context::GlobalContext;
use stencil_lang::error::CompileError;
use stencil_lang::passes::parse::Parser;
use stencil_lang::passes::paths::assign_paths;
use stencil_lang::passes::resolve::{merge, NameResolver, ResolvedProgram};

/// Run the front half of the pipeline over in-memory units.
pub fn resolve(sources: &[&str]) -> Result<ResolvedProgram, CompileError> {
    let mut gcx = GlobalContext::new();
    let mut ast = Ast::default();
    let mut programs = Vec::new();

    for (i, src) in sources.iter().enumerate() {
        let id = gcx.sources.add(format!("unit{i}"), src.to_string());
        programs.push(Parser::parse_unit(src, id, &mut ast, &mut gcx)?);
    }

    let resolved = NameResolver::new(&mut ast).resolve(merge(programs))?;
    Ok(ResolvedProgram {
        ast,
        gcx,
        root: resolved.root,
        scopes: resolved.scopes,
        resolutions: resolved.resolutions,
    })
}

pub fn generate(sources: &[&str]) -> Result<OutputTree, CompileError> {
    generate_with(sources, GenConfig::default())
}

pub fn generate_with(sources: &[&str], config: GenConfig) -> Result<OutputTree, CompileError> {
    let program = resolve(sources)?;
    let paths = assign_paths(&program);
    Generator::with_config(&program, &paths, config).generate()
}

/// Find a template declaration by name. Panics if absent; tests only call
/// this for names they declared.
pub fn template_id(program: &ResolvedProgram, name: &str) -> DeclId {
    program
        .ast
        .decls
        .iter()
        .find(|(_, d)| {
            matches!(d.kind, DeclKind::Template { .. })
                && program.gcx.interner.resolve(d.name()) == name
        })
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no template named {name}"))
}
