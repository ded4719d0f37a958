pub mod result;

pub mod cli;
pub mod compiler;
pub mod diagnostics;
pub mod io;
pub mod project;

pub use cli::*;
pub use compiler::{
    ast::Program,
    compiler::Compiler,
    semantics::{resolve, type_check, SymbolArena},
};
pub use io::{read_input, Format, Input};
