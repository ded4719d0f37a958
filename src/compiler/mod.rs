/*!
The compiler takes a declaration list, binds every name to a symbol, checks
the static types of the program, and then converts it into x86-64 assembly
(GNU assembler, AT&T syntax).

Each phase is a full traversal of the tree and runs only when the phase before
it finished without any errors:

1. `lexer` and `parser` turn source text into a [`ast::Program`].
2. `semantics::resolve` creates a symbol for every declaration and parameter
   and binds every name reference to one of them.
3. `semantics::type_check` computes the type of every expression, infers the
   types of `auto` declarations and validates return statements against the
   function that encloses them.
4. [`compiler::Compiler`] lowers the checked tree to assembly.

Resolution and type errors are accumulated so that a single run reports
every problem. During code generation, running out of scratch registers is
fatal, while unsupported constructs are reported and only the affected
declaration is skipped.
*/
pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantics;

mod arch;
mod memory;
mod x86;

pub use error::CompilerError;
