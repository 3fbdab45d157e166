//! Error types and reporting
//!
//! Defines the error types used throughout the compiler and the conversion
//! into user-facing reports via the Ariadne library.

use ariadne::{Label, Report, ReportKind};
use thiserror::Error;

use crate::ast::{ast::Path, Loc};
use crate::context::{Interner, Symbol};

fn format_symbol(sym: Symbol, interner: &Interner) -> String {
    interner.try_resolve(sym).unwrap_or("<unknown>").to_string()
}

fn format_path(path: &Path, interner: &Interner) -> String {
    match path {
        Path::Simple(sym) => format_symbol(*sym, interner),
        Path::Qualified(parts) => parts
            .iter()
            .map(|s| interner.try_resolve(*s).unwrap_or("<unknown>"))
            .collect::<Vec<_>>()
            .join("."),
    }
}

/// A compilation error with location and optional context
#[derive(Debug, Error)]
#[error("{kind:?}")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub loc: Loc,
    pub context: Option<String>,
}

/// Collection of compilation errors
#[derive(Debug, Default)]
pub struct CompileErrors(pub Vec<CompileError>);

impl CompileErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: CompileError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.0.iter()
    }
}

impl std::fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.len())
    }
}

impl std::error::Error for CompileErrors {}

impl From<CompileError> for CompileErrors {
    fn from(err: CompileError) -> Self {
        Self(vec![err])
    }
}

/// The specific kind of compilation error
#[derive(Clone, Debug)]
pub enum CompileErrorKind {
    Parse(String),
    /// A name absent from every reachable scope.
    UnresolvedReference { name: Symbol },
    /// A qualifier naming a scope that is not reachable.
    UnreachableScope { name: Symbol },
    /// Two declarations sharing a name in one scope where merging does not
    /// apply (templates, or a template/namespace collision).
    Redefinition { name: Symbol },
    /// A nest/import target that resolved to something other than a template.
    NotATemplate { path: Path },
    /// A parameter without a default following one with a default.
    NonDefaultAfterDefault { name: Symbol },
    /// A positional argument following a keyword argument.
    PositionalAfterKeyword,
    /// A keyword argument naming a parameter the target does not declare.
    UnknownParameter { name: Symbol },
    /// Two arguments binding the same parameter, which would redefine the
    /// slotted macro in the generated code.
    DuplicateArgument { name: Symbol },
    /// More positional arguments than the target has parameters.
    TooManyArguments { expected: usize, actual: usize },
    /// An output file already exists and force-overwrite was not requested.
    OverwriteRefused { path: String },
    Io(String),
    Internal { phase: &'static str, message: String },
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, loc: Loc) -> Self {
        Self {
            kind,
            loc,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn internal(phase: &'static str, message: impl Into<String>, loc: Loc) -> Self {
        Self::new(
            CompileErrorKind::Internal {
                phase,
                message: message.into(),
            },
            loc,
        )
    }

    /// Get a human-readable error message with proper symbol resolution
    pub fn message(&self, interner: &Interner) -> String {
        use CompileErrorKind::*;

        match &self.kind {
            Parse(msg) => format!("Parse error: {}", msg),
            UnresolvedReference { name } => {
                format!("Unresolved reference '{}'", format_symbol(*name, interner))
            }
            UnreachableScope { name } => {
                format!("Scope '{}' is not reachable", format_symbol(*name, interner))
            }
            Redefinition { name } => {
                format!("Name '{}' is already defined", format_symbol(*name, interner))
            }
            NotATemplate { path } => {
                format!("'{}' is not a template", format_path(path, interner))
            }
            NonDefaultAfterDefault { name } => format!(
                "Parameter '{}' without a default follows a defaulted parameter",
                format_symbol(*name, interner)
            ),
            PositionalAfterKeyword => {
                "Positional argument follows a keyword argument".to_string()
            }
            UnknownParameter { name } => format!(
                "Target template has no parameter named '{}'",
                format_symbol(*name, interner)
            ),
            DuplicateArgument { name } => format!(
                "Parameter '{}' is bound more than once",
                format_symbol(*name, interner)
            ),
            TooManyArguments { expected, actual } => {
                format!("Expected at most {} arguments, got {}", expected, actual)
            }
            OverwriteRefused { path } => {
                format!("Refusing to overwrite existing file '{}'", path)
            }
            Io(msg) => format!("I/O error: {}", msg),
            Internal { phase, message } => {
                format!("Internal compiler error in {}: {}", phase, message)
            }
        }
    }

    /// Generate an Ariadne error report
    pub fn report(&self, interner: &Interner) -> Report<'_, Loc> {
        let mut report =
            Report::build(ReportKind::Error, self.loc.clone()).with_message(self.message(interner));

        let mut label = Label::new(self.loc.clone());

        if let Some(ctx) = &self.context {
            label = label.with_message(ctx);
        }

        report = report.with_label(label);

        match &self.kind {
            CompileErrorKind::UnresolvedReference { .. } => {
                report = report.with_help(
                    "Templates must be declared in a reachable namespace. Check spelling and qualifiers.",
                );
            }
            CompileErrorKind::NonDefaultAfterDefault { .. } => {
                report = report.with_help(
                    "Once a parameter has a default, every following parameter needs one too.",
                );
            }
            CompileErrorKind::OverwriteRefused { .. } => {
                report = report.with_help("Pass --force to overwrite existing output files.");
            }
            CompileErrorKind::Internal { phase, .. } => {
                report = report.with_help(format!(
                    "This is a bug in the {} phase of the compiler. Please file a bug report.",
                    phase
                ));
            }
            _ => {}
        }

        report.finish()
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::new(CompileErrorKind::Io(err.to_string()), Loc::generated())
    }
}
