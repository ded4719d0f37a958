use serde::{Deserialize, Serialize};

use super::{declaration::Declaration, expression::Expression};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub line: u32,
    pub kind: StmtKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Decl(Box<Declaration>),
    Expr(Expression),
    IfElse {
        cond: Expression,
        body: Box<Statement>,
        else_body: Option<Box<Statement>>,
    },
    For {
        init: Option<Expression>,
        cond: Option<Expression>,
        step: Option<Expression>,
        body: Box<Statement>,
    },
    Print(Vec<Expression>),
    Return {
        value: Option<Expression>,
        /// Name of the function this return exits.  Filled in by the type
        /// checker before the return is validated.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function: Option<String>,
    },
    Block(Vec<Statement>),
}

impl Statement {
    pub fn new(line: u32, kind: StmtKind) -> Statement {
        Statement { line, kind }
    }

    pub fn new_return(line: u32, value: Option<Expression>) -> Statement {
        Statement::new(
            line,
            StmtKind::Return {
                value,
                function: None,
            },
        )
    }

    /// Counts every declaration in this statement and in any statement nested
    /// inside of it.
    pub fn count_decls(&self) -> usize {
        match &self.kind {
            StmtKind::Decl(_) => 1,
            StmtKind::IfElse {
                body, else_body, ..
            } => body.count_decls() + else_body.as_ref().map_or(0, |e| e.count_decls()),
            StmtKind::For { body, .. } => body.count_decls(),
            StmtKind::Block(stmts) => stmts.iter().map(|s| s.count_decls()).sum(),
            StmtKind::Expr(_) | StmtKind::Print(_) | StmtKind::Return { .. } => 0,
        }
    }
}
