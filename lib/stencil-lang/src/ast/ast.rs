use crate::ast::Loc;
use crate::context::{Arena, NodeId, Symbol};

pub type DeclId = NodeId<Decl>;
pub type StmtId = NodeId<Stmt>;
pub type RefId = NodeId<Ref>;

/// The arenas backing every parsed translation unit. All units of one
/// compilation share the same arenas, so declarations from different files
/// can be merged by id.
#[derive(Default, Debug)]
pub struct Ast {
    pub decls: Arena<Decl>,
    pub stmts: Arena<Stmt>,
    pub refs: Arena<Ref>,
}

/// The top-level declarations of one translation unit, in source order.
/// Units are concatenated by `resolve::merge` before resolution.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub decls: Vec<DeclId>,
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub loc: Loc,
    pub kind: DeclKind,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    /// A named group of declarations. Two namespaces with the same name in
    /// the same scope denote the same logical namespace and are merged.
    Namespace { name: Symbol, members: Vec<DeclId> },
    /// A template: parameters plus a body of raw text and nest/import
    /// statements. Same-scope name collisions are an error.
    Template {
        name: Symbol,
        params: Vec<Param>,
        body: Vec<StmtId>,
    },
}

impl Decl {
    pub fn name(&self) -> Symbol {
        match self.kind {
            DeclKind::Namespace { name, .. } => name,
            DeclKind::Template { name, .. } => name,
        }
    }
}

/// A template parameter. `macro_params` is present when the parameter
/// denotes a function-like macro, e.g. `NodeNext(node)`.
#[derive(Debug, Clone)]
pub struct Param {
    pub loc: Loc,
    pub name: Symbol,
    pub macro_params: Option<Vec<Symbol>>,
    pub default: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub loc: Loc,
    pub kind: StmtKind,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// An uninterpreted C payload, emitted verbatim into the body file.
    Raw(String),
    /// Pull in the targets' machinery at the current slot without
    /// instantiating a fresh depth level.
    Import { refs: Vec<RefId>, args: Vec<Argument> },
    /// Instantiate the targets inline, pushing a depth level.
    Nest { refs: Vec<RefId>, args: Vec<Argument> },
}

/// An argument to a nest (or import) statement. Positional arguments carry
/// no name; they are matched against the target's parameter list in order
/// during generation.
#[derive(Debug, Clone)]
pub struct Argument {
    pub loc: Loc,
    pub name: Option<Symbol>,
    pub macro_params: Option<Vec<Symbol>>,
    pub value: String,
}

impl Argument {
    pub fn is_keyword(&self) -> bool {
        self.name.is_some()
    }
}

/// A reference to a template, by simple or dotted name. The resolver maps
/// each `RefId` to its target declaration in the resolution table.
#[derive(Debug, Clone)]
pub struct Ref {
    pub loc: Loc,
    pub path: Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Path {
    Simple(Symbol),
    /// Qualifiers followed by the trailing name; always at least two parts.
    Qualified(Vec<Symbol>),
}
