/*!
Semantic analysis of a parsed program.  This is done in two passes:

1. Name resolution: every declaration and parameter gets a symbol and every name
   reference is bound to the symbol of the declaration it refers to.
2. Type checking: the type of every expression is computed and checked against the
   rules of each operator, call, declaration and return statement.

Both passes report every error they find rather than stopping at the first one.
*/
mod error;
mod resolver;
mod stack;
mod symbol_table;
mod type_checker;


pub use error::SemanticError;
pub use resolver::resolve;
pub use stack::SymbolTableScopeStack;
pub use symbol_table::{Symbol, SymbolArena, SymbolId, SymbolKind, SymbolTable};
pub use type_checker::{type_check, type_of};

use super::CompilerError;

/// Captures the Failure state of a semantic analysis pass, which will, if it
/// fails, result in every [`SemanticError`] found wrapped in a [`CompilerError`].
pub type SemanticResult<T> = Result<T, Vec<CompilerError<SemanticError>>>;
