use log::debug;
use stdext::function_name;

use crate::{
    compiler::{
        ast::{Declaration, Initializer, Parameter, ParameterList, Program, Statement, Type},
        lexer::tokens::{Lex, Primitive, Token},
        CompilerError,
    },
    diagnostics::config::{Tracing, TracingConfig},
};

use super::{
    expression::{arguments, required_expression},
    statement::statement,
    tokenstream::TokenStream,
    ParserError, ParserResult,
};

/*
    Grammar
    PROGRAM := DECLARATION*
    DECLARATION := IDENTIFIER : TYPE [= INITIALIZER] ;
                 | IDENTIFIER : FUNCTION_TYPE = { STATEMENT* }
    INITIALIZER := EXPRESSION | { [EXPRESSION [, EXPRESSION]*] }
    TYPE := integer | boolean | char | string | void | auto
          | array [ [INTEGER] ] TYPE
          | FUNCTION_TYPE
    FUNCTION_TYPE := function TYPE ( [PARAM [, PARAM]*] )
    PARAM := IDENTIFIER : TYPE
*/

/// Parses a complete compilation unit.  Parsing stops at the first syntax
/// error.
pub fn parse(tokens: &[Token], tracing: TracingConfig) -> Result<Program, CompilerError<ParserError>> {
    debug!("Parsing {} tokens", tokens.len());
    let mut stream = TokenStream::new(tokens);
    stream.set_tracing(tracing);

    let mut decls = vec![];
    while stream.peek().is_some() {
        match declaration(&mut stream, true)? {
            Some(decl) => decls.push(decl),
            None => {
                return Err(CompilerError::new(
                    stream.line(),
                    ParserError::Locked(stream.peek().map(|t| t.s.clone())),
                ))
            }
        }
    }

    debug!("Parsed {} global declarations", decls.len());
    Ok(Program::new(decls))
}

/// Parses a declaration.  Function definitions are only accepted when
/// `global` is set.
pub(super) fn declaration(stream: &mut TokenStream, global: bool) -> ParserResult<Declaration> {
    trace!(stream);
    if !stream.test_ifn(vec![Lex::Identifier(String::new()), Lex::Colon]) {
        return Ok(None);
    }

    let (line, name) = match stream.next_if_id() {
        Some(id) => id,
        None => return Ok(None),
    };
    stream.next_must_be(&Lex::Colon)?;
    let ty = required_type(stream)?;

    if ty.is_function() {
        if stream.next_if(&Lex::Semicolon).is_some() {
            return Ok(Some(Declaration::new_function(line, &name, ty, None)));
        }
        stream.next_must_be(&Lex::Assign)?;
        if !global {
            return Err(CompilerError::new(line, ParserError::FnBodyNotGlobal(name)));
        }
        let code = block_body(stream)?;
        // A trailing semicolon after the body is tolerated
        stream.next_if(&Lex::Semicolon);
        return Ok(Some(Declaration::new_function(line, &name, ty, Some(code))));
    }

    let value = match stream.next_if(&Lex::Assign) {
        Some(_) => Some(initializer(stream, &name)?),
        None => None,
    };
    stream.next_must_be(&Lex::Semicolon)?;

    Ok(Some(Declaration::new(line, &name, ty, value)))
}

/// `{ STATEMENT* }`, returning the statements between the braces.
pub(super) fn block_body(
    stream: &mut TokenStream,
) -> Result<Vec<Statement>, CompilerError<ParserError>> {
    trace!(stream);
    stream.next_must_be(&Lex::LBrace)?;
    let mut stmts = vec![];
    while let Some(stmt) = statement(stream)? {
        stmts.push(stmt);
    }
    stream.next_must_be(&Lex::RBrace)?;
    Ok(stmts)
}

fn initializer(
    stream: &mut TokenStream,
    name: &str,
) -> Result<Initializer, CompilerError<ParserError>> {
    trace!(stream);
    match stream.next_if(&Lex::LBrace) {
        Some(_) => {
            let elements = arguments(stream)?;
            stream.next_must_be(&Lex::RBrace)?;
            Ok(Initializer::List(elements))
        }
        None => {
            let line = stream.line();
            required_expression(stream)
                .map(Initializer::Expr)
                .map_err(|_| {
                    CompilerError::new(line, ParserError::DeclExpectedInitializer(name.into()))
                })
        }
    }
}

fn required_type(stream: &mut TokenStream) -> Result<Type, CompilerError<ParserError>> {
    let line = stream.line();
    let found = stream.peek().map(|t| t.s.clone());
    ty(stream)?.ok_or_else(|| CompilerError::new(line, ParserError::ExpectedType(found)))
}

fn ty(stream: &mut TokenStream) -> ParserResult<Type> {
    trace!(stream);
    let token = match stream.next_if_one_of(&[
        Lex::Primitive(Primitive::Integer),
        Lex::Array,
        Lex::Function,
    ]) {
        Some(token) => token,
        None => return Ok(None),
    };

    let ty = match token.s {
        Lex::Primitive(p) => match p {
            Primitive::Integer => Type::Integer,
            Primitive::Boolean => Type::Boolean,
            Primitive::Char => Type::Character,
            Primitive::String => Type::String,
            Primitive::Void => Type::Void,
            Primitive::Auto => Type::Auto,
        },
        Lex::Array => {
            stream.next_must_be(&Lex::LBracket)?;
            let size = match stream.peek().map(|t| t.s.clone()) {
                Some(Lex::Integer(sz)) if sz >= 0 => {
                    stream.next();
                    sz as usize
                }
                Some(Lex::RBracket) => 0,
                _ => {
                    return Err(CompilerError::new(
                        stream.line(),
                        ParserError::ArrayExpectedIntLiteral,
                    ))
                }
            };
            stream.next_must_be(&Lex::RBracket)?;
            Type::Array(Box::new(required_type(stream)?), size)
        }
        _ => {
            let ret = required_type(stream)?;
            stream.next_must_be(&Lex::LParen)?;
            let params = parameters(stream)?;
            stream.next_must_be(&Lex::RParen)?;
            Type::Function(Box::new(ret), params)
        }
    };

    Ok(Some(ty))
}

fn parameters(stream: &mut TokenStream) -> Result<ParameterList, CompilerError<ParserError>> {
    trace!(stream);
    let mut params = vec![];
    if stream.test_if(&Lex::RParen) {
        return Ok(ParameterList::new(params));
    }

    loop {
        let line = stream.line();
        let (_, name) = stream
            .next_if_id()
            .ok_or_else(|| CompilerError::new(line, ParserError::ParamExpectedIdDecl))?;
        stream
            .next_must_be(&Lex::Colon)
            .map_err(|_| CompilerError::new(line, ParserError::ParamExpectedIdDecl))?;
        params.push(Parameter::new(&name, required_type(stream)?));

        if stream.next_if(&Lex::Comma).is_none() {
            break;
        }
    }

    Ok(ParameterList::new(params))
}
