pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod context;
pub mod error;
pub mod parser;
pub mod passes;
