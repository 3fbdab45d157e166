//! Compilation driver
//!
//! Wires the passes together: parse each translation unit, merge, resolve,
//! assign output paths, generate. Errors are collected into the result
//! rather than returned, so callers always get the global context back for
//! rendering diagnostics.

use std::path::PathBuf;

use crate::ast::ast::Ast;
use crate::codegen::output::OutputTree;
use crate::codegen::{GenConfig, Generator};
use crate::context::GlobalContext;
use crate::error::{CompileError, CompileErrors};
use crate::passes::parse::Parser;
use crate::passes::paths::assign_paths;
use crate::passes::resolve::{merge, NameResolver, ResolvedProgram};

pub enum CompilerInput {
    /// Read each file from disk; the file name becomes the unit name.
    Files(Vec<PathBuf>),
    /// An in-memory unit, mainly for tests and tooling.
    Source { name: String, src: String },
}

pub struct CompilationResult {
    pub output: Option<OutputTree>,
    pub errors: CompileErrors,
    pub gcx: GlobalContext,
}

impl CompilationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_err(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Default)]
pub struct Compiler {
    config: GenConfig,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GenConfig) -> Self {
        Self { config }
    }

    pub fn compile(&self, input: CompilerInput) -> CompilationResult {
        let mut units = Vec::new();
        let mut errors = CompileErrors::new();

        match input {
            CompilerInput::Files(files) => {
                for file in files {
                    match std::fs::read_to_string(&file) {
                        Ok(src) => units.push((file.display().to_string(), src)),
                        Err(err) => errors.push(CompileError::from(err)),
                    }
                }
            }
            CompilerInput::Source { name, src } => units.push((name, src)),
        }

        if !errors.is_empty() {
            return CompilationResult {
                output: None,
                errors,
                gcx: GlobalContext::new(),
            };
        }

        self.compile_sources(units)
    }

    fn compile_sources(&self, units: Vec<(String, String)>) -> CompilationResult {
        let mut gcx = GlobalContext::new();
        let mut ast = Ast::default();
        let mut programs = Vec::new();
        let mut errors = CompileErrors::new();

        for (name, src) in units {
            let source_id = gcx.sources.add(name.clone(), src.clone());
            log::debug!("parsing unit {name}");
            match Parser::parse_unit(&src, source_id, &mut ast, &mut gcx) {
                Ok(program) => programs.push(program),
                Err(err) => errors.push(err),
            }
        }

        if !errors.is_empty() {
            return CompilationResult {
                output: None,
                errors,
                gcx,
            };
        }

        let merged = merge(programs);
        log::debug!("resolving {} top-level declarations", merged.decls.len());

        let resolved = match NameResolver::new(&mut ast).resolve(merged) {
            Ok(resolved) => resolved,
            Err(err) => {
                return CompilationResult {
                    output: None,
                    errors: CompileErrors::from(err),
                    gcx,
                };
            }
        };

        let program = ResolvedProgram {
            ast,
            gcx,
            root: resolved.root,
            scopes: resolved.scopes,
            resolutions: resolved.resolutions,
        };

        let paths = assign_paths(&program);
        log::debug!("generating output");

        let generator = Generator::with_config(&program, &paths, self.config.clone());
        match generator.generate() {
            Ok(output) => CompilationResult {
                output: Some(output),
                errors: CompileErrors::new(),
                gcx: program.gcx,
            },
            Err(err) => CompilationResult {
                output: None,
                errors: CompileErrors::from(err),
                gcx: program.gcx,
            },
        }
    }
}
