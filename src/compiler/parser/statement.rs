use stdext::function_name;

use crate::compiler::{
    ast::{Statement, StmtKind},
    lexer::tokens::Lex,
    CompilerError,
};

use super::{
    expression::{arguments, expression, required_expression},
    parser::{block_body, declaration},
    tokenstream::TokenStream,
    ParserError, ParserResult,
};

/*
    Grammar
    STATEMENT := DECLARATION
               | if ( EXPRESSION ) STATEMENT [else STATEMENT]
               | for ( [EXPRESSION] ; [EXPRESSION] ; [EXPRESSION] ) STATEMENT
               | while ( EXPRESSION ) STATEMENT
               | print [EXPRESSION [, EXPRESSION]*] ;
               | return [EXPRESSION] ;
               | { STATEMENT* }
               | EXPRESSION ;
*/

pub(super) fn statement(stream: &mut TokenStream) -> ParserResult<Statement> {
    trace!(stream);
    let line = stream.line();

    if let Some(decl) = declaration(stream, false)? {
        return Ok(Some(Statement::new(line, StmtKind::Decl(Box::new(decl)))));
    }

    let stmt = match stream.peek().map(|t| t.s.clone()) {
        Some(Lex::If) => if_else(stream)?,
        Some(Lex::For) => for_loop(stream)?,
        Some(Lex::While) => while_loop(stream)?,
        Some(Lex::Print) => print(stream)?,
        Some(Lex::Return) => return_stmt(stream)?,
        Some(Lex::LBrace) => Statement::new(line, StmtKind::Block(block_body(stream)?)),
        _ => match expression(stream)? {
            Some(exp) => {
                stream.next_must_be(&Lex::Semicolon)?;
                Statement::new(line, StmtKind::Expr(exp))
            }
            None => return Ok(None),
        },
    };

    Ok(Some(stmt))
}

fn body(
    stream: &mut TokenStream,
    missing: ParserError,
) -> Result<Box<Statement>, CompilerError<ParserError>> {
    let line = stream.line();
    statement(stream)?
        .map(Box::new)
        .ok_or_else(|| CompilerError::new(line, missing))
}

fn if_else(stream: &mut TokenStream) -> Result<Statement, CompilerError<ParserError>> {
    trace!(stream);
    let token = stream.next_must_be(&Lex::If)?;
    stream.next_must_be(&Lex::LParen)?;
    let cond = expression(stream)?
        .ok_or_else(|| CompilerError::new(token.l, ParserError::IfExpectedConditional))?;
    stream.next_must_be(&Lex::RParen)?;
    let body = body(stream, ParserError::IfTrueArmMissingStmt)?;

    let else_body = match stream.next_if(&Lex::Else) {
        Some(_) => Some(self::body(stream, ParserError::IfElseMissingStmt)?),
        None => None,
    };

    Ok(Statement::new(
        token.l,
        StmtKind::IfElse {
            cond,
            body,
            else_body,
        },
    ))
}

fn for_loop(stream: &mut TokenStream) -> Result<Statement, CompilerError<ParserError>> {
    trace!(stream);
    let token = stream.next_must_be(&Lex::For)?;
    stream.next_must_be(&Lex::LParen)?;
    let init = expression(stream)?;
    stream.next_must_be(&Lex::Semicolon)?;
    let cond = expression(stream)?;
    stream.next_must_be(&Lex::Semicolon)?;
    let step = expression(stream)?;
    stream.next_must_be(&Lex::RParen)?;
    let body = body(stream, ParserError::LoopMissingBody)?;

    Ok(Statement::new(
        token.l,
        StmtKind::For {
            init,
            cond,
            step,
            body,
        },
    ))
}

/// `while (c) s` is read as `for (; c;) s`.
fn while_loop(stream: &mut TokenStream) -> Result<Statement, CompilerError<ParserError>> {
    trace!(stream);
    let token = stream.next_must_be(&Lex::While)?;
    stream.next_must_be(&Lex::LParen)?;
    let cond = required_expression(stream)?;
    stream.next_must_be(&Lex::RParen)?;
    let body = body(stream, ParserError::LoopMissingBody)?;

    Ok(Statement::new(
        token.l,
        StmtKind::For {
            init: None,
            cond: Some(cond),
            step: None,
            body,
        },
    ))
}

fn print(stream: &mut TokenStream) -> Result<Statement, CompilerError<ParserError>> {
    trace!(stream);
    let token = stream.next_must_be(&Lex::Print)?;
    let exprs = arguments(stream)?;
    stream.next_must_be(&Lex::Semicolon)?;
    Ok(Statement::new(token.l, StmtKind::Print(exprs)))
}

fn return_stmt(stream: &mut TokenStream) -> Result<Statement, CompilerError<ParserError>> {
    trace!(stream);
    let token = stream.next_must_be(&Lex::Return)?;
    let value = expression(stream)?;
    stream.next_must_be(&Lex::Semicolon)?;
    Ok(Statement::new_return(token.l, value))
}
