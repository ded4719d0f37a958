use serde::{Deserialize, Serialize};

use crate::compiler::semantics::SymbolId;

use super::{expression::Expression, statement::Statement, ty::Type};

/// A named variable or function.  Variables may have an initial value and
/// function definitions have a body.  A function declaration without a body
/// is a prototype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub line: u32,
    pub name: String,
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Initializer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<Statement>>,

    /// The symbol created for this declaration by the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolId>,

    /// When this is a function which was already declared in the same scope,
    /// the symbol of that earlier declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype: Option<SymbolId>,
}

impl Declaration {
    pub fn new(line: u32, name: &str, ty: Type, value: Option<Initializer>) -> Declaration {
        Declaration {
            line,
            name: name.into(),
            ty,
            value,
            code: None,
            symbol: None,
            prototype: None,
        }
    }

    pub fn new_function(line: u32, name: &str, ty: Type, code: Option<Vec<Statement>>) -> Declaration {
        Declaration {
            line,
            name: name.into(),
            ty,
            value: None,
            code,
            symbol: None,
            prototype: None,
        }
    }

    /// Number of stack slots, beyond the parameters, a function body needs.
    pub fn local_count(&self) -> usize {
        self.code
            .as_ref()
            .map_or(0, |code| code.iter().map(|s| s.count_decls()).sum())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    Expr(Expression),
    /// `{ e1, e2, ... }` for arrays
    List(Vec<Expression>),
}

impl Initializer {
    pub fn exprs_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            Initializer::Expr(e) => vec![e],
            Initializer::List(es) => es.iter_mut().collect(),
        }
    }
}

/// A complete compilation unit: the list of top level declarations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub decls: Vec<Declaration>,
}

impl Program {
    pub fn new(decls: Vec<Declaration>) -> Program {
        Program { decls }
    }
}
