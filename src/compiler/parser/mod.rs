use super::{lexer::tokens::Lex, CompilerError};

/// Prints the name of the current parsing function and the token it is
/// looking at, when the stream's tracing config covers that token's line.
macro_rules! trace {
    ($ts:expr) => {
        if let Some(token) = $ts.peek() {
            if $ts.tracing().traces(token.l as usize) {
                println!("{} <- {}", function_name!(), token)
            }
        }
    };
}

mod expression;
mod parser;
mod statement;
#[cfg(test)]
mod tests;
mod tokenstream;

pub use parser::parse;
pub use tokenstream::TokenStream;

pub(super) type ParserResult<T> = Result<Option<T>, CompilerError<ParserError>>;

/// Compiler errors that happen within the Parser stage of compilation.
#[derive(Clone, Debug, PartialEq)]
pub enum ParserError {
    Locked(Option<Lex>),
    ExpectedButFound(Vec<Lex>, Option<Lex>),
    ExpectedType(Option<Lex>),
    ArrayExpectedIntLiteral,
    ParamExpectedIdDecl,
    DeclExpectedInitializer(String),
    FnBodyNotGlobal(String),
    FnCallExpectedParams,
    IndexOpInvalidExpr,
    NotABinaryOp(Lex),
    ExpectedExprAfter(Lex),
    ExpectedTermAfter(Lex),
    IfExpectedConditional,
    IfTrueArmMissingStmt,
    IfElseMissingStmt,
    LoopMissingBody,
    ExpectedExpression(Option<Lex>),
}

fn lex_to_string(lex: &Option<Lex>) -> String {
    match lex {
        Some(lex) => lex.to_string(),
        None => "EOF".into(),
    }
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ParserError::*;
        match self {
            Locked(lex) => write!(f, "Parser cannot advance past {}", lex_to_string(lex)),
            ExpectedButFound(expected, found) => {
                let expected = expected
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(" or ");
                write!(f, "Expected {}, but found {}", expected, lex_to_string(found))
            }
            ExpectedType(found) => {
                write!(f, "Expected a type, but found {}", lex_to_string(found))
            }
            ArrayExpectedIntLiteral => f.write_str("Expected integer literal for array size"),
            ParamExpectedIdDecl => {
                f.write_str("Expected parameter declaration of the form name: type")
            }
            DeclExpectedInitializer(name) => {
                write!(f, "Expected an initial value after = in declaration of {}", name)
            }
            FnBodyNotGlobal(name) => write!(
                f,
                "Function {} cannot be defined inside of another function",
                name
            ),
            FnCallExpectedParams => f.write_str("Expected parameters after function call point"),
            IndexOpInvalidExpr => f.write_str("Index operator must contain valid expression"),
            NotABinaryOp(lex) => write!(f, "{} is not a binary operator", lex),
            ExpectedExprAfter(lex) => write!(f, "Expected expression after {}", lex),
            ExpectedTermAfter(lex) => write!(f, "Expected term after {}", lex),
            IfExpectedConditional => f.write_str("Expected conditional expression after if"),
            IfTrueArmMissingStmt => f.write_str("Expected statement after if condition"),
            IfElseMissingStmt => f.write_str("Expected statement after else"),
            LoopMissingBody => f.write_str("Expected statement for loop body"),
            ExpectedExpression(found) => {
                write!(f, "Expected an expression, but found {}", lex_to_string(found))
            }
        }
    }
}
