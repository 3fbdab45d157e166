//! Code generation
//!
//! Turns the resolved declaration tree into preprocessor-only C files.
//! Every template becomes three files:
//!
//! * `T.h` (the package file): the client-facing entry point. Dispatches on
//!   the current package number so several instantiations can coexist.
//! * `T.contents`: the per-slot machinery. Dispatches on (package, depth),
//!   checks required arguments, applies defaults, then includes the body.
//! * `T.body`: the template body, with nest and import statements lowered
//!   to includes of the target templates' contents files.
//!
//! Parameters are carried between files as mangled object-like macros named
//! `Param_<package>_<depth>`, so each (package, depth) slot has its own
//! argument bindings and recursive instantiation never clobbers an outer
//! level. The preprocessor cannot compute the mangled name at expansion
//! time, so every reachable slot is unrolled up to the configured bounds
//! and guarded by `#if` dispatch.

pub mod emitter;
pub mod output;

use std::collections::HashSet;

use crate::ast::ast::{Argument, DeclId, DeclKind, Param, RefId, StmtId, StmtKind};
use crate::ast::Loc;
use crate::context::Symbol;
use crate::codegen::emitter::Emitter;
use crate::codegen::output::OutputTree;
use crate::error::{CompileError, CompileErrorKind};
use crate::passes::paths::PathTable;
use crate::passes::resolve::ResolvedProgram;

/// Knobs of the generated-code contract. The defaults match the runtime
/// headers shipped with the compiler; override them only when targeting a
/// different runtime.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Number of simultaneously live instantiations supported per template.
    pub max_package: usize,
    /// Maximum recursive nesting depth supported per package.
    pub max_depth: usize,
    /// Macro expanding to the current package number.
    pub package_macro: String,
    /// Macro expanding to the current depth.
    pub depth_macro: String,
    /// Line that increments the depth counter.
    pub depth_incr: String,
    /// Line that decrements the depth counter.
    pub depth_decr: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            max_package: 5,
            max_depth: 5,
            package_macro: "STENCIL_PACKAGE".to_string(),
            depth_macro: "STENCIL_DEPTH".to_string(),
            depth_incr: "#include <stencil/depth/incr.h>".to_string(),
            depth_decr: "#include <stencil/depth/decr.h>".to_string(),
        }
    }
}

/// An argument matched to its target parameter. `name` is the parameter
/// the value binds to; positional arguments get theirs from matching
/// position during binding.
struct BoundArg {
    name: String,
    macro_params: String,
    value: String,
}

pub struct Generator<'p> {
    program: &'p ResolvedProgram,
    paths: &'p PathTable,
    config: GenConfig,
}

impl<'p> Generator<'p> {
    pub fn new(program: &'p ResolvedProgram, paths: &'p PathTable) -> Self {
        Self::with_config(program, paths, GenConfig::default())
    }

    pub fn with_config(
        program: &'p ResolvedProgram,
        paths: &'p PathTable,
        config: GenConfig,
    ) -> Self {
        Self {
            program,
            paths,
            config,
        }
    }

    pub fn generate(&self) -> Result<OutputTree, CompileError> {
        let mut out = OutputTree::default();
        for &decl in &self.program.root.decls {
            self.gen_decl(decl, &mut out)?;
        }
        Ok(out)
    }

    fn gen_decl(&self, id: DeclId, out: &mut OutputTree) -> Result<(), CompileError> {
        match &self.program.ast.decls.get(id).kind {
            DeclKind::Namespace { members, .. } => {
                for &member in members {
                    self.gen_decl(member, out)?;
                }
                Ok(())
            }
            DeclKind::Template { name, params, body } => {
                let name = self.program.gcx.interner.resolve(*name).to_string();
                let loc = self.program.ast.decls.get(id).loc.clone();

                let mut package = Emitter::new();
                self.gen_package_file(&name, params, &mut package);
                out.insert(self.output_path(id, "h", &loc)?, package.finish())?;

                let mut contents = Emitter::new();
                self.gen_content_file(&name, params, &mut contents);
                out.insert(self.output_path(id, "contents", &loc)?, contents.finish())?;

                let mut bodyfile = Emitter::new();
                self.gen_body_file(body, &mut bodyfile)?;
                out.insert(self.output_path(id, "body", &loc)?, bodyfile.finish())?;

                Ok(())
            }
        }
    }

    fn output_path(
        &self,
        id: DeclId,
        suffix: &str,
        loc: &Loc,
    ) -> Result<std::path::PathBuf, CompileError> {
        self.paths.file_path(id, suffix).ok_or_else(|| {
            CompileError::internal("codegen", "declaration has no assigned path", loc.clone())
        })
    }

    fn param_name(&self, param: &Param) -> String {
        self.program.gcx.interner.resolve(param.name).to_string()
    }

    fn fmt_macro_params(&self, macro_params: Option<&Vec<Symbol>>) -> String {
        match macro_params {
            Some(params) => {
                let names: Vec<&str> = params
                    .iter()
                    .map(|&p| self.program.gcx.interner.resolve(p))
                    .collect();
                format!("({})", names.join(", "))
            }
            None => String::new(),
        }
    }

    /// `#define P_ CONCAT(P_, <pkg>, _, <depth>)` for every parameter. The
    /// alias is how body text reaches the current slot's binding without
    /// knowing the slot numbers.
    fn gen_inner_aliases(&self, params: &[Param], e: &mut Emitter) {
        for param in params {
            let name = self.param_name(param);
            e.line(format!(
                "#define {name}_ CONCAT({name}_, {pkg}, _, {depth})",
                pkg = self.config.package_macro,
                depth = self.config.depth_macro,
            ));
        }
    }

    fn gen_package_file(&self, name: &str, params: &[Param], e: &mut Emitter) {
        let pkg = &self.config.package_macro;

        self.gen_inner_aliases(params, e);

        // Entry is always at depth 0; the depth counter only moves once
        // templates nest each other.
        for k in 0..self.config.max_package {
            e.line(format!("#if {pkg} == {k}"));
            e.indent();
            for param in params {
                let pname = self.param_name(param);
                let args = self.fmt_macro_params(param.macro_params.as_ref());
                e.line(format!("#define {pname}_{k}_0{args} {pname}"));
            }
            e.line(format!("#include \"{name}.contents\""));
            for param in params {
                let pname = self.param_name(param);
                e.line(format!("#undef {pname}_{k}_0"));
                e.line(format!("#undef {pname}_"));
                e.line(format!("#undef {pname}"));
            }
            e.dedent();
            e.line("#endif");
        }

        e.line(format!("#if {pkg} >= {}", self.config.max_package));
        e.indent();
        e.line(format!(
            "#error \"maximum number of live packages exceeded for template {name}\""
        ));
        e.dedent();
        e.line("#endif");
    }

    fn gen_content_file(&self, name: &str, params: &[Param], e: &mut Emitter) {
        let pkg = &self.config.package_macro;
        let depth = &self.config.depth_macro;

        for k in 0..self.config.max_package {
            e.line(format!("#if {pkg} == {k}"));
            e.indent();

            for d in 0..self.config.max_depth {
                e.line(format!("#if {depth} == {d}"));
                e.indent();

                // Mark this slot instantiated so imports can skip it.
                e.line(format!("#define {name}_{k}_{d}_H 1"));

                for param in params {
                    let mangled = format!("{}_{k}_{d}", self.param_name(param));
                    match &param.default {
                        None => {
                            e.line(format!("#if ! defined({mangled})"));
                            e.indent();
                            e.line(format!(
                                "#error \"missing argument to template parameter {mangled}\""
                            ));
                            e.dedent();
                            e.line("#endif");
                        }
                        Some(default) => {
                            let args = self.fmt_macro_params(param.macro_params.as_ref());
                            e.line(format!("#if ! defined({mangled})"));
                            e.indent();
                            e.line(format!("#define {mangled}{args} {default}"));
                            e.dedent();
                            e.line("#endif");
                        }
                    }
                }

                e.line(format!("#include \"{name}.body\""));

                for param in params {
                    e.line(format!("#undef {}_{k}_{d}", self.param_name(param)));
                }

                e.dedent();
                e.line("#endif");
            }

            e.dedent();
            e.line("#endif");
        }

        e.line(format!("#if {depth} >= {}", self.config.max_depth));
        e.indent();
        e.line(format!(
            "#error \"maximum template nesting depth exceeded in template {name}\""
        ));
        e.dedent();
        e.line("#endif");
    }

    fn gen_body_file(&self, body: &[StmtId], e: &mut Emitter) -> Result<(), CompileError> {
        for &stmt in body {
            let stmt = self.program.ast.stmts.get(stmt);
            match &stmt.kind {
                StmtKind::Raw(text) => e.raw(text),
                StmtKind::Import { refs, .. } => {
                    for &r in refs {
                        let target = self.ref_target(r)?;
                        self.gen_import(target, e, &stmt.loc)?;
                    }
                }
                StmtKind::Nest { refs, args } => {
                    for &r in refs {
                        let target = self.ref_target(r)?;
                        self.gen_nest(target, args, e, &stmt.loc)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn ref_target(&self, r: RefId) -> Result<DeclId, CompileError> {
        self.program.resolutions.refs.get(&r).copied().ok_or_else(|| {
            let loc = self.program.ast.refs.get(r).loc.clone();
            CompileError::internal("codegen", "unresolved reference survived resolution", loc)
        })
    }

    fn template_parts(
        &self,
        id: DeclId,
        loc: &Loc,
    ) -> Result<(String, Vec<Param>), CompileError> {
        match &self.program.ast.decls.get(id).kind {
            DeclKind::Template { name, params, .. } => Ok((
                self.program.gcx.interner.resolve(*name).to_string(),
                params.clone(),
            )),
            DeclKind::Namespace { .. } => Err(CompileError::internal(
                "codegen",
                "namespace target survived resolution",
                loc.clone(),
            )),
        }
    }

    /// Importing makes a template's machinery available at the current slot
    /// without instantiating it, guarded so a slot already holding an
    /// instantiation of the target is left alone.
    fn gen_import(&self, target: DeclId, e: &mut Emitter, loc: &Loc) -> Result<(), CompileError> {
        let (tname, _) = self.template_parts(target, loc)?;
        let include = self.include_file(target, loc)?;

        e.line(format!(
            "#if CONCAT({tname}_, {pkg}, _, {depth}, _H) != 1",
            pkg = self.config.package_macro,
            depth = self.config.depth_macro,
        ));
        e.indent();
        e.line(format!("#include \"{include}\""));
        e.dedent();
        e.line("#endif");
        Ok(())
    }

    /// Nesting instantiates the target one depth level below the current
    /// slot: argument bindings are planted in the `(package, depth + 1)`
    /// slot, then the depth counter is pushed around the include.
    fn gen_nest(
        &self,
        target: DeclId,
        args: &[Argument],
        e: &mut Emitter,
        loc: &Loc,
    ) -> Result<(), CompileError> {
        let (_, params) = self.template_parts(target, loc)?;
        let include = self.include_file(target, loc)?;
        let bound = self.bind_arguments(&params, args)?;

        let pkg = &self.config.package_macro;
        let depth = &self.config.depth_macro;

        for k in 0..self.config.max_package {
            e.line(format!("#if {pkg} == {k}"));
            e.indent();

            for d in 0..self.config.max_depth {
                e.line(format!("#if {depth} == {d}"));
                e.indent();

                // Drop the caller's aliases before rebinding, then restore
                // them so the callee sees its own slot.
                for param in &params {
                    e.line(format!("#undef {}_", self.param_name(param)));
                }
                for arg in &bound {
                    e.line(format!(
                        "#define {}_{k}_{}{} {}",
                        arg.name,
                        d + 1,
                        arg.macro_params,
                        arg.value
                    ));
                }
                self.gen_inner_aliases(&params, e);

                e.dedent();
                e.line("#endif");
            }

            e.dedent();
            e.line("#endif");
        }

        e.line(&self.config.depth_incr);
        e.line(format!("#include \"{include}\""));
        e.line(&self.config.depth_decr);
        Ok(())
    }

    fn include_file(&self, target: DeclId, loc: &Loc) -> Result<String, CompileError> {
        self.paths.include_file(target, "contents").ok_or_else(|| {
            CompileError::internal("codegen", "target has no assigned path", loc.clone())
        })
    }

    /// Match a statement's arguments against the target's parameters.
    /// Positional arguments bind in declaration order; keyword arguments
    /// bind by name. The parse pass already rejected positional-after-
    /// keyword, so positional arguments form a prefix here.
    fn bind_arguments(
        &self,
        params: &[Param],
        args: &[Argument],
    ) -> Result<Vec<BoundArg>, CompileError> {
        let positional = args.iter().take_while(|a| !a.is_keyword()).count();
        if positional > params.len() {
            let loc = args[params.len()].loc.clone();
            return Err(CompileError::new(
                CompileErrorKind::TooManyArguments {
                    expected: params.len(),
                    actual: positional,
                },
                loc,
            ));
        }

        let mut bound = Vec::with_capacity(args.len());
        let mut seen = HashSet::new();
        for (i, arg) in args.iter().enumerate() {
            let param = match arg.name {
                None => &params[i],
                Some(name) => params.iter().find(|p| p.name == name).ok_or_else(|| {
                    CompileError::new(
                        CompileErrorKind::UnknownParameter { name },
                        arg.loc.clone(),
                    )
                })?,
            };

            // Binding a parameter twice would redefine its slotted macro.
            if !seen.insert(param.name) {
                return Err(CompileError::new(
                    CompileErrorKind::DuplicateArgument { name: param.name },
                    arg.loc.clone(),
                ));
            }

            let macro_params = arg
                .macro_params
                .as_ref()
                .or(param.macro_params.as_ref());
            bound.push(BoundArg {
                name: self.param_name(param),
                macro_params: self.fmt_macro_params(macro_params),
                value: arg.value.clone(),
            });
        }
        Ok(bound)
    }
}
