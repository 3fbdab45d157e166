pub mod parse;
pub mod paths;
pub mod resolve;

pub use crate::context::GlobalContext;
