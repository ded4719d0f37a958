mod declaration;
mod expression;
mod parameter;
mod printer;
mod statement;
mod ty;

pub use self::declaration::{Declaration, Initializer, Program};
pub use self::expression::{BinaryOperator, ExprKind, Expression, UnaryOperator};
pub use self::parameter::{Parameter, ParameterList};
pub use self::statement::{Statement, StmtKind};
pub use self::ty::Type;
