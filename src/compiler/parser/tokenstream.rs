use crate::compiler::lexer::tokens::{Lex, Token};
use crate::compiler::CompilerError;
use crate::diagnostics::config::{Tracing, TracingConfig};

use super::ParserError;

/// A cursor over the tokens of a compilation unit.  Parsing functions take
/// tokens off the front of the stream and can rewind it with `set_index`.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    index: usize,
    tracing: TracingConfig,
}

impl<'a> Tracing for TokenStream<'a> {
    fn set_tracing(&mut self, config: TracingConfig) {
        self.tracing = config;
    }
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> TokenStream<'a> {
        TokenStream {
            tokens,
            index: 0,
            tracing: TracingConfig::Off,
        }
    }

    pub fn tracing(&self) -> TracingConfig {
        self.tracing
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, i: usize) {
        self.index = i;
    }

    /// Line of the next token, or of the last token when the stream is
    /// exhausted.
    pub fn line(&self) -> u32 {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.l)
    }

    pub fn next(&mut self) -> Option<Token> {
        if self.index >= self.tokens.len() {
            None
        } else {
            self.index += 1;
            Some(self.tokens[self.index - 1].clone())
        }
    }

    pub fn next_if(&mut self, test: &Lex) -> Option<Token> {
        if self.test_if(test) {
            self.next()
        } else {
            None
        }
    }

    pub fn next_if_id(&mut self) -> Option<(u32, String)> {
        match self.next_if(&Lex::Identifier(String::new())) {
            Some(Token {
                l,
                s: Lex::Identifier(id),
            }) => Some((l, id)),
            _ => None,
        }
    }

    pub fn next_must_be(&mut self, test: &Lex) -> Result<Token, CompilerError<ParserError>> {
        let line = self.line();
        let found = self.peek().map(|t| t.s.clone());
        self.next_if(test).ok_or_else(|| {
            CompilerError::new(
                line,
                ParserError::ExpectedButFound(vec![test.clone()], found),
            )
        })
    }

    pub fn next_ifn(&mut self, test: Vec<Lex>) -> Option<Vec<Token>> {
        let end = self.index + test.len();
        if self.test_ifn(test) {
            let v: Vec<Token> = self.tokens[self.index..end].into();
            self.index = end;
            Some(v)
        } else {
            None
        }
    }

    pub fn next_if_one_of(&mut self, set: &[Lex]) -> Option<Token> {
        if self.test_if_one_of(set) {
            self.next()
        } else {
            None
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn peek_at(&self, i: usize) -> Option<&Token> {
        self.tokens.get(self.index + i)
    }

    pub fn test_if(&self, test: &Lex) -> bool {
        match self.peek() {
            None => false,
            Some(t) => t.token_eq(test),
        }
    }

    pub fn test_ifn(&self, test: Vec<Lex>) -> bool {
        test.iter().enumerate().all(|(i, lex)| match self.peek_at(i) {
            Some(token) => token.token_eq(lex),
            None => false,
        })
    }

    pub fn test_if_one_of(&self, set: &[Lex]) -> bool {
        set.iter().any(|lex| self.test_if(lex))
    }
}
