use stdext::function_name;

use crate::compiler::{
    ast::{BinaryOperator, ExprKind, Expression, UnaryOperator},
    lexer::tokens::{Lex, Token},
    CompilerError,
};

use super::{tokenstream::TokenStream, ParserError, ParserResult};

/*
    Grammar
    EXPRESSION := LOGICAL_OR [= EXPRESSION]
    LOGICAL_OR := LOGICAL_AND [|| LOGICAL_AND]*
    LOGICAL_AND := COMPARISON [&& COMPARISON]*
    COMPARISON := SUM [(< | <= | > | >= | == | !=) SUM]*
    SUM := TERM [(+ | -) TERM]*
    TERM := POWER [(* | / | %) POWER]*
    POWER := NEGATE [^ POWER]
    NEGATE := (- | !) NEGATE | POSTFIX
    POSTFIX := ACCESS [++ | --]*
    ACCESS := FACTOR [ (ARGS) | [EXPRESSION] ]*
    FACTOR := LITERAL | IDENTIFIER | (EXPRESSION)
*/

pub(super) fn expression(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    match logical_or(stream)? {
        Some(left) => match stream.next_if(&Lex::Assign) {
            Some(op) => {
                let right = expression(stream)?
                    .ok_or_else(|| CompilerError::new(op.l, ParserError::ExpectedExprAfter(op.s)))?;
                Ok(Some(Expression::new(
                    left.line,
                    ExprKind::Assign(Box::new(left), Box::new(right)),
                )))
            }
            None => Ok(Some(left)),
        },
        None => Ok(None),
    }
}

/// Parses an expression which must be present, reporting the next token
/// when it is not.
pub(super) fn required_expression(stream: &mut TokenStream) -> Result<Expression, CompilerError<ParserError>> {
    let line = stream.line();
    let found = stream.peek().map(|t| t.s.clone());
    expression(stream)?
        .ok_or_else(|| CompilerError::new(line, ParserError::ExpectedExpression(found)))
}

fn logical_or(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    binary_op(stream, &[Lex::BOr], logical_and)
}

fn logical_and(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    binary_op(stream, &[Lex::BAnd], comparison)
}

fn comparison(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    binary_op(
        stream,
        &[Lex::Eq, Lex::NEq, Lex::Ls, Lex::LsEq, Lex::Gr, Lex::GrEq],
        sum,
    )
}

fn sum(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    binary_op(stream, &[Lex::Add, Lex::Minus], term)
}

fn term(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    binary_op(stream, &[Lex::Mul, Lex::Div, Lex::Mod], power)
}

/// Exponentiation groups to the right: `a ^ b ^ c` is `a ^ (b ^ c)`.
fn power(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    match negate(stream)? {
        Some(left) => match stream.next_if(&Lex::Pow) {
            Some(op) => {
                let right = power(stream)?.ok_or_else(|| {
                    CompilerError::new(op.l, ParserError::ExpectedExprAfter(op.s.clone()))
                })?;
                binary_expression(&op, left, right).map(Some)
            }
            None => Ok(Some(left)),
        },
        None => Ok(None),
    }
}

/// Parses a left associative chain of binary operators which all have the
/// same precedence.  The operands are parsed by `left_pattern`.
fn binary_op(
    stream: &mut TokenStream,
    test: &[Lex],
    left_pattern: fn(&mut TokenStream) -> ParserResult<Expression>,
) -> ParserResult<Expression> {
    trace!(stream);
    match left_pattern(stream)? {
        Some(mut left) => {
            while let Some(op) = stream.next_if_one_of(test) {
                let right = left_pattern(stream)?.ok_or_else(|| {
                    CompilerError::new(op.l, ParserError::ExpectedExprAfter(op.s.clone()))
                })?;
                left = binary_expression(&op, left, right)?;
            }
            Ok(Some(left))
        }
        None => Ok(None),
    }
}

fn binary_expression(
    op: &Token,
    left: Expression,
    right: Expression,
) -> Result<Expression, CompilerError<ParserError>> {
    let bop = match op.s {
        Lex::Add => BinaryOperator::Add,
        Lex::Minus => BinaryOperator::Sub,
        Lex::Mul => BinaryOperator::Mul,
        Lex::Div => BinaryOperator::Div,
        Lex::Mod => BinaryOperator::Mod,
        Lex::Pow => BinaryOperator::Pow,
        Lex::BAnd => BinaryOperator::BAnd,
        Lex::BOr => BinaryOperator::BOr,
        Lex::Eq => BinaryOperator::Eq,
        Lex::NEq => BinaryOperator::NEq,
        Lex::Ls => BinaryOperator::Ls,
        Lex::LsEq => BinaryOperator::LsEq,
        Lex::Gr => BinaryOperator::Gr,
        Lex::GrEq => BinaryOperator::GrEq,
        _ => {
            return Err(CompilerError::new(
                op.l,
                ParserError::NotABinaryOp(op.s.clone()),
            ))
        }
    };
    Ok(Expression::binary(left.line, bop, left, right))
}

fn negate(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    match stream.next_if_one_of(&[Lex::Minus, Lex::Not]) {
        Some(op) => {
            let operand = negate(stream)?.ok_or_else(|| {
                CompilerError::new(op.l, ParserError::ExpectedTermAfter(op.s.clone()))
            })?;
            let uop = if op.s == Lex::Minus {
                UnaryOperator::Minus
            } else {
                UnaryOperator::Not
            };
            Ok(Some(Expression::unary(op.l, uop, operand)))
        }
        None => postfix(stream),
    }
}

fn postfix(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    match access(stream)? {
        Some(mut operand) => {
            while let Some(op) = stream.next_if_one_of(&[Lex::Increment, Lex::Decrement]) {
                let uop = if op.s == Lex::Increment {
                    UnaryOperator::Increment
                } else {
                    UnaryOperator::Decrement
                };
                operand = Expression::unary(operand.line, uop, operand);
            }
            Ok(Some(operand))
        }
        None => Ok(None),
    }
}

/// Function calls and array indexing.  Consecutive indices are collected
/// into a single index expression, one per dimension.
fn access(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    match factor(stream)? {
        Some(f) => {
            let mut base = f;
            while let Some(token) = stream.next_if_one_of(&[Lex::LParen, Lex::LBracket]) {
                base = match token.s {
                    Lex::LParen => {
                        let args = arguments(stream)?;
                        stream.next_must_be(&Lex::RParen).map_err(|_| {
                            CompilerError::new(token.l, ParserError::FnCallExpectedParams)
                        })?;
                        Expression::new(base.line, ExprKind::Call(Box::new(base), args))
                    }
                    _ => {
                        let index = expression(stream)?.ok_or_else(|| {
                            CompilerError::new(token.l, ParserError::IndexOpInvalidExpr)
                        })?;
                        stream.next_must_be(&Lex::RBracket)?;
                        let line = base.line;
                        match base.kind {
                            ExprKind::Index { base, mut indices } => {
                                indices.push(index);
                                Expression::new(line, ExprKind::Index { base, indices })
                            }
                            kind => Expression::new(
                                line,
                                ExprKind::Index {
                                    base: Box::new(Expression::new(line, kind)),
                                    indices: vec![index],
                                },
                            ),
                        }
                    }
                };
            }
            Ok(Some(base))
        }
        None => Ok(None),
    }
}

/// A comma separated list of expressions.  Used by function calls, print
/// statements and array initializers.
pub(super) fn arguments(
    stream: &mut TokenStream,
) -> Result<Vec<Expression>, CompilerError<ParserError>> {
    trace!(stream);
    let mut args = vec![];
    if let Some(first) = expression(stream)? {
        args.push(first);
        while let Some(comma) = stream.next_if(&Lex::Comma) {
            let arg = expression(stream)?
                .ok_or_else(|| CompilerError::new(comma.l, ParserError::ExpectedExprAfter(comma.s)))?;
            args.push(arg);
        }
    }
    Ok(args)
}

fn factor(stream: &mut TokenStream) -> ParserResult<Expression> {
    trace!(stream);
    let token = match stream.peek() {
        Some(token) => token.clone(),
        None => return Ok(None),
    };

    let kind = match token.s {
        Lex::LParen => {
            stream.next();
            let inner = expression(stream)?.ok_or_else(|| {
                CompilerError::new(token.l, ParserError::ExpectedExprAfter(Lex::LParen))
            })?;
            stream.next_must_be(&Lex::RParen)?;
            return Ok(Some(Expression::new(
                token.l,
                ExprKind::Group(Box::new(inner)),
            )));
        }
        Lex::Integer(i) => ExprKind::Integer(i),
        Lex::Bool(b) => ExprKind::Boolean(b),
        Lex::Character(c) => ExprKind::Character(c),
        Lex::StringLiteral(s) => ExprKind::StringLiteral(s),
        Lex::Identifier(name) => ExprKind::Name { name, symbol: None },
        _ => return Ok(None),
    };
    stream.next();
    Ok(Some(Expression::new(token.l, kind)))
}
