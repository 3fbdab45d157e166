mod resolver;
mod scope;
mod table;

pub use resolver::{merge, NameResolver, Resolved};
pub use scope::{Scope, ScopeId, ScopeTree};
pub use table::{ResolutionTable, ResolvedProgram};
