// Token - a type which captures the different types of tokens and which is output
// by tokenize
use log::debug;
use stdext::function_name;

use crate::diagnostics::config::{Tracing, TracingConfig};

use super::super::CompilerError;
use super::tokens::{Lex, Primitive, Token};
use super::{LexerError, LexerResult};
use Lex::*;

/// Identifiers and string literals may not be longer than this
const MAX_TEXT_LEN: usize = 255;

macro_rules! trace {
    ($ts:expr) => {
        if $ts.tracing.traces($ts.line() as usize) {
            println!(
                "{} <- L{}:{:?}",
                function_name!(),
                $ts.line(),
                $ts.current_char()
            )
        }
    };
}

struct LexerBranch<'a> {
    lexer: &'a mut Lexer,
    index: usize,
    line: u32,
}

impl<'a> LexerBranch<'a> {
    fn from(l: &mut Lexer) -> LexerBranch {
        LexerBranch {
            index: l.index,
            line: l.line,
            lexer: l,
        }
    }

    /// Accepts everything this branch has consumed, moving the source
    /// Lexer's cursor up to the branch's cursor, and returns the text
    /// that was consumed.
    fn merge(self) -> String {
        let s: String = self.lexer.chars[self.lexer.index..self.index].iter().collect();

        self.lexer.index = self.index;
        self.lexer.line = self.line;

        s
    }

    /// Advances the cursor one character and returns the character that was
    /// pointed to by the cursor before the advance.
    fn next(&mut self) -> Option<char> {
        if self.index < self.lexer.chars.len() {
            let c = self.lexer.chars[self.index];
            self.index += 1;
            if c == '\n' {
                self.line += 1;
            }
            Some(c)
        } else {
            None
        }
    }

    fn next_if(&mut self, t: char) -> bool {
        match self.peek() {
            Some(c) if c == t => self.next().is_some(),
            _ => false,
        }
    }

    /// Advances past `t` if the stream after the cursor starts with it.
    fn next_ifn(&mut self, t: &str) -> bool {
        if self.peek_ifn(t) {
            for _ in t.chars() {
                self.next();
            }
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.lexer.chars.get(self.index).copied()
    }

    fn peek_ifn(&self, t: &str) -> bool {
        let tc: Vec<char> = t.chars().collect();
        self.lexer.chars[self.index..].starts_with(&tc)
    }
}

pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: u32,
    tracing: TracingConfig,
}

impl Tracing for Lexer {
    fn set_tracing(&mut self, config: TracingConfig) {
        self.tracing = config;
    }
}

impl Lexer {
    pub fn new(text: &str) -> Lexer {
        Lexer {
            chars: text.chars().collect(),
            index: 0,
            line: 1,
            tracing: TracingConfig::Off,
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn err<T>(&self, e: LexerError) -> LexerResult<T> {
        Err(CompilerError::new(self.line, e))
    }

    /// Converts the source text into a vector of tokens.  Tokenizing stops
    /// after the first error, which is the last element of the vector.
    pub fn tokenize(&mut self) -> Vec<LexerResult<Token>> {
        debug!("Tokenizing {} characters", self.chars.len());
        let mut tokens = vec![];

        while self.index < self.chars.len() {
            let prev_index = self.index;

            match self.next_token() {
                Ok(Some(t)) => tokens.push(Ok(t)),
                Ok(None) => (),
                Err(msg) => {
                    tokens.push(Err(msg));
                    break;
                }
            }

            // Can no longer consume the input text
            if prev_index == self.index {
                tokens.push(self.err(LexerError::Locked(self.current_char())));
                break;
            }
        }

        tokens
    }

    fn next_token(&mut self) -> LexerResult<Option<Token>> {
        self.consume_whitespace();
        if self.consume_line_comment() || self.consume_block_comment()? {
            return Ok(None);
        }
        if self.index >= self.chars.len() {
            return Ok(None);
        }

        match self.consume_literal()? {
            Some(i) => Ok(Some(i)),
            None => match self.consume_identifier()? {
                Some(id) => Ok(Some(self.if_keyword_map(id))),
                None => self.consume_operator(),
            },
        }
    }

    fn consume_whitespace(&mut self) {
        trace!(self);
        while self.index < self.chars.len() && self.chars[self.index].is_whitespace() {
            if self.chars[self.index] == '\n' {
                self.line += 1;
            }
            self.index += 1;
        }
    }

    fn consume_line_comment(&mut self) -> bool {
        trace!(self);
        let mut branch = LexerBranch::from(self);
        if branch.next_ifn("//") {
            while let Some(c) = branch.next() {
                if c == '\n' {
                    break;
                }
            }
            branch.merge();
            true
        } else {
            false
        }
    }

    fn consume_block_comment(&mut self) -> LexerResult<bool> {
        trace!(self);
        let mut branch = LexerBranch::from(self);
        if branch.next_ifn("/*") {
            while !branch.next_ifn("*/") {
                if branch.next().is_none() {
                    return self.err(LexerError::UnterminatedComment);
                }
            }
            branch.merge();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume_literal(&mut self) -> LexerResult<Option<Token>> {
        trace!(self);
        match self.consume_integer()? {
            Some(i) => Ok(Some(i)),
            None => match self.consume_char_literal()? {
                Some(c) => Ok(Some(c)),
                None => self.consume_string_literal(),
            },
        }
    }

    fn consume_integer(&mut self) -> LexerResult<Option<Token>> {
        trace!(self);
        let line = self.line;
        let mut branch = LexerBranch::from(self);

        if !branch.peek().map_or(false, |c| c.is_ascii_digit()) {
            return Ok(None);
        }

        while let Some(c) = branch.peek() {
            if !c.is_ascii_digit() {
                if c.is_alphabetic() || c == '_' {
                    return Err(CompilerError::new(line, LexerError::InvalidInteger));
                }
                break;
            }
            branch.next();
        }

        let num = branch.merge();
        match num.parse::<i64>() {
            Ok(i) => Ok(Some(Token::new(line, Integer(i)))),
            Err(_) => self.err(LexerError::IntegerOutOfRange(num)),
        }
    }

    fn consume_char_literal(&mut self) -> LexerResult<Option<Token>> {
        trace!(self);
        let line = self.line;
        let mut branch = LexerBranch::from(self);

        if !branch.next_if('\'') {
            return Ok(None);
        }

        let c = match branch.next() {
            Some('\\') => match branch.next() {
                Some('n') => '\n',
                Some('0') => '\0',
                Some(c) => c,
                None => return Err(CompilerError::new(line, LexerError::ExpectedEscapeCharacter)),
            },
            Some('\'') | Some('\n') | None => {
                return Err(CompilerError::new(line, LexerError::InvalidCharLiteral))
            }
            Some(c) => c,
        };

        if branch.next_if('\'') {
            branch.merge();
            Ok(Some(Token::new(line, Character(c))))
        } else {
            Err(CompilerError::new(line, LexerError::InvalidCharLiteral))
        }
    }

    fn consume_string_literal(&mut self) -> LexerResult<Option<Token>> {
        trace!(self);
        let line = self.line;
        let mut branch = LexerBranch::from(self);

        if !branch.next_if('"') {
            return Ok(None);
        }

        let mut text = String::new();
        loop {
            match branch.next() {
                Some('"') => break,
                Some('\n') => return Err(CompilerError::new(line, LexerError::StringNewline)),
                Some('\\') => match branch.next() {
                    Some('\n') | None => {
                        return Err(CompilerError::new(line, LexerError::ExpectedEscapeCharacter))
                    }
                    Some(c) => {
                        text.push('\\');
                        text.push(c);
                    }
                },
                Some(c) => text.push(c),
                None => return Err(CompilerError::new(line, LexerError::UnterminatedString)),
            }
        }

        if text.chars().count() > MAX_TEXT_LEN {
            return Err(CompilerError::new(line, LexerError::StringTooLong));
        }

        branch.merge();
        Ok(Some(Token::new(line, StringLiteral(text))))
    }

    fn consume_identifier(&mut self) -> LexerResult<Option<Token>> {
        trace!(self);
        let line = self.line;
        let mut branch = LexerBranch::from(self);
        if branch
            .peek()
            .map_or_else(|| false, |c| c.is_ascii_alphabetic() || c == '_')
        {
            while branch
                .peek()
                .map_or_else(|| false, |c| c.is_ascii_alphanumeric() || c == '_')
            {
                branch.next();
            }
        }

        let id = branch.merge();
        if id.is_empty() {
            Ok(None)
        } else if id.len() > MAX_TEXT_LEN {
            self.err(LexerError::IdentifierTooLong(id))
        } else {
            Ok(Some(Token::new(line, Identifier(id))))
        }
    }

    fn consume_operator(&mut self) -> LexerResult<Option<Token>> {
        trace!(self);
        let line = self.line;
        let mut branch = LexerBranch::from(self);
        let mut operators = vec![
            ("++", Increment),
            ("--", Decrement),
            ("&&", BAnd),
            ("||", BOr),
            ("!=", NEq),
            ("==", Eq),
            (">=", GrEq),
            ("<=", LsEq),
            ("(", LParen),
            (")", RParen),
            ("{", LBrace),
            ("}", RBrace),
            ("[", LBracket),
            ("]", RBracket),
            ("^", Pow),
            ("*", Mul),
            ("/", Div),
            ("%", Mod),
            ("+", Add),
            ("-", Minus),
            ("=", Assign),
            (";", Semicolon),
            (":", Colon),
            (",", Comma),
            (">", Gr),
            ("<", Ls),
            ("!", Not),
        ];
        operators.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut token = None;
        for (op, t) in operators.into_iter() {
            if branch.next_ifn(op) {
                token = Some(Token::new(line, t));
                break;
            }
        }
        branch.merge();
        Ok(token)
    }

    fn if_keyword_map(&self, token: Token) -> Token {
        trace!(self);
        match token {
            Token {
                l,
                s: Identifier(ref id),
            } => match id.as_str() {
                "array" => Token::new(l, Array),
                "function" => Token::new(l, Function),
                "if" => Token::new(l, If),
                "else" => Token::new(l, Else),
                "for" => Token::new(l, For),
                "while" => Token::new(l, While),
                "print" => Token::new(l, Print),
                "return" => Token::new(l, Return),
                "true" => Token::new(l, Bool(true)),
                "false" => Token::new(l, Bool(false)),
                "integer" => Token::new(l, Lex::Primitive(Primitive::Integer)),
                "boolean" => Token::new(l, Lex::Primitive(Primitive::Boolean)),
                "char" => Token::new(l, Lex::Primitive(Primitive::Char)),
                "string" => Token::new(l, Lex::Primitive(Primitive::String)),
                "void" => Token::new(l, Lex::Primitive(Primitive::Void)),
                "auto" => Token::new(l, Lex::Primitive(Primitive::Auto)),
                _ => token,
            },
            _ => token,
        }
    }
}
