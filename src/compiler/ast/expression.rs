use serde::{Deserialize, Serialize};

use crate::compiler::semantics::SymbolId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub line: u32,
    pub kind: ExprKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Assign(Box<Expression>, Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    Unary(UnaryOperator, Box<Expression>),
    Integer(i64),
    Boolean(bool),
    Character(char),
    /// The text between the quotes, with escape sequences left as written.
    StringLiteral(String),
    Name {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol: Option<SymbolId>,
    },
    Call(Box<Expression>, Vec<Expression>),
    /// `base[i][j]...`, one index per dimension.
    Index {
        base: Box<Expression>,
        indices: Vec<Expression>,
    },
    Group(Box<Expression>),
}

impl Expression {
    pub fn new(line: u32, kind: ExprKind) -> Expression {
        Expression { line, kind }
    }

    pub fn integer(line: u32, i: i64) -> Expression {
        Expression::new(line, ExprKind::Integer(i))
    }

    pub fn name(line: u32, name: &str) -> Expression {
        Expression::new(
            line,
            ExprKind::Name {
                name: name.into(),
                symbol: None,
            },
        )
    }

    pub fn binary(line: u32, op: BinaryOperator, l: Expression, r: Expression) -> Expression {
        Expression::new(line, ExprKind::Binary(op, Box::new(l), Box::new(r)))
    }

    pub fn unary(line: u32, op: UnaryOperator, operand: Expression) -> Expression {
        Expression::new(line, ExprKind::Unary(op, Box::new(operand)))
    }

    /// Returns the name this expression refers to if it is a bare name
    /// reference.
    pub fn get_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the symbol bound to this expression if it is a resolved name.
    pub fn get_symbol(&self) -> Option<SymbolId> {
        match &self.kind {
            ExprKind::Name { symbol, .. } => *symbol,
            _ => None,
        }
    }

    /// Variables and array elements are the only expressions which can be
    /// stored into.
    pub fn is_addressable(&self) -> bool {
        matches!(self.kind, ExprKind::Name { .. } | ExprKind::Index { .. })
    }

    /// Returns the value of this expression if it is an integer, boolean or
    /// character literal, optionally negated.
    pub fn constant_value(&self) -> Option<i64> {
        match &self.kind {
            ExprKind::Integer(i) => Some(*i),
            ExprKind::Boolean(b) => Some(*b as i64),
            ExprKind::Character(c) => Some(*c as i64),
            ExprKind::Group(e) => e.constant_value(),
            ExprKind::Unary(UnaryOperator::Minus, e) => e.constant_value().map(|v| v.wrapping_neg()),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BAnd,
    BOr,
    Eq,
    NEq,
    Ls,
    LsEq,
    Gr,
    GrEq,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        use BinaryOperator::*;
        match self {
            Add => f.write_str("+"),
            Sub => f.write_str("-"),
            Mul => f.write_str("*"),
            Div => f.write_str("/"),
            Mod => f.write_str("%"),
            Pow => f.write_str("^"),
            BAnd => f.write_str("&&"),
            BOr => f.write_str("||"),
            Eq => f.write_str("=="),
            NEq => f.write_str("!="),
            Ls => f.write_str("<"),
            LsEq => f.write_str("<="),
            Gr => f.write_str(">"),
            GrEq => f.write_str(">="),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Minus,
    Not,
    /// Postfix `++`
    Increment,
    /// Postfix `--`
    Decrement,
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        use UnaryOperator::*;
        match self {
            Minus => f.write_str("-"),
            Not => f.write_str("!"),
            Increment => f.write_str("++"),
            Decrement => f.write_str("--"),
        }
    }
}
