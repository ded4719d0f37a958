use super::CompilerError;

#[cfg(test)]
mod tests;

pub mod lexer;
pub mod tokens;

pub use lexer::Lexer;
pub use tokens::{Lex, Primitive, Token};

pub type LexerResult<T> = Result<T, CompilerError<LexerError>>;

/// Errors which can be encountered while tokenizing a compilation unit
#[derive(Clone, Debug, PartialEq)]
pub enum LexerError {
    Locked(Option<char>),
    InvalidInteger,
    IntegerOutOfRange(String),
    InvalidCharLiteral,
    ExpectedEscapeCharacter,
    UnterminatedString,
    StringNewline,
    StringTooLong,
    IdentifierTooLong(String),
    UnterminatedComment,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LexerError::*;
        match self {
            Locked(None) => f.write_str("Lexer locked on EOF"),
            Locked(Some(c)) => f.write_fmt(format_args!("Lexer locked on {:?}", c)),
            InvalidInteger => f.write_str("Invalid integer, should not contain characters"),
            IntegerOutOfRange(text) => {
                f.write_fmt(format_args!("Integer {} does not fit in 64 bits", text))
            }
            InvalidCharLiteral => f.write_str("Invalid character literal"),
            ExpectedEscapeCharacter => f.write_str("Expected an escape character after \\"),
            UnterminatedString => f.write_str("String literal is missing its closing quote"),
            StringNewline => {
                f.write_str("String literal cannot contain a newline, use \\n instead")
            }
            StringTooLong => f.write_fmt(format_args!(
                "String literal is longer than {} characters",
                255
            )),
            IdentifierTooLong(id) => f.write_fmt(format_args!(
                "Identifier {} is longer than {} characters",
                id, 255
            )),
            UnterminatedComment => f.write_str("Block comment is never closed"),
        }
    }
}
