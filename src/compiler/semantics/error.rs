use crate::compiler::ast::{BinaryOperator, Type, UnaryOperator};

/// Errors generated during name resolution and type checking of a compilation unit.
#[derive(Clone, Debug, PartialEq)]
pub enum SemanticError {
    Undeclared(String),
    NotResolved(String),
    NotAssignable(String),
    AssignMismatch(String, Type, Type),
    BinaryOpExpected(BinaryOperator, Type, Type, Type),
    UnaryOpExpected(UnaryOperator, Type, Type),
    EqualityMismatch(Type, Type),
    EqualityInvalidType(Type),
    IndexInvalidType(String, Type),
    IndexNotInteger(String, Type),
    CallNotFunction(String, Type),
    CallParamsMismatch(String, Type, Vec<Type>),
    CondExpectedBool(&'static str, Type),
    PrintInvalidType(Type),
    DeclMismatch(String, Type, Type),
    StringDeclMismatch(String, Type),
    ArrayElementMismatch(String, Type, Type),
    ArraySizeMismatch(String, usize, usize),
    AutoWithoutValue(String),
    VoidVariable(String),
    PrototypeMismatch(String, Type, Type),
    ReturnExpected(String, Type, Type),
    ReturnMissingValue(String, Type),
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SemanticError::*;
        match self {
            Undeclared(name) => f.write_fmt(format_args!("{} is undeclared", name)),
            NotResolved(name) => {
                f.write_fmt(format_args!("{} has not been resolved to a symbol", name))
            }
            NotAssignable(expr) => f.write_fmt(format_args!("cannot assign to {}", expr)),
            AssignMismatch(target, expected, actual) => f.write_fmt(format_args!(
                "cannot assign {} of type {} a value of type {}",
                target, expected, actual
            )),
            BinaryOpExpected(op, expected, l, r) => f.write_fmt(format_args!(
                "{} expected {} but found {} and {}",
                op, expected, l, r
            )),
            UnaryOpExpected(op, expected, actual) => f.write_fmt(format_args!(
                "{} expected {} but found {}",
                op, expected, actual
            )),
            EqualityMismatch(l, r) => {
                f.write_fmt(format_args!("cannot compare {} with {}", l, r))
            }
            EqualityInvalidType(ty) => {
                f.write_fmt(format_args!("cannot use equality operators on {}", ty))
            }
            IndexInvalidType(base, ty) => {
                f.write_fmt(format_args!("cannot index {} of type {}", base, ty))
            }
            IndexNotInteger(base, ty) => f.write_fmt(format_args!(
                "cannot index {} with non-integer {}",
                base, ty
            )),
            CallNotFunction(name, ty) => {
                f.write_fmt(format_args!("cannot call non-function {} of type {}", name, ty))
            }
            CallParamsMismatch(name, ty, args) => f.write_fmt(format_args!(
                "parameters do not match in call of {}: expected {} but got ({})",
                name,
                ty,
                args.iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            CondExpectedBool(stmt, ty) => f.write_fmt(format_args!(
                "{} condition must be boolean but found {}",
                stmt, ty
            )),
            PrintInvalidType(ty) => f.write_fmt(format_args!("cannot print a value of type {}", ty)),
            DeclMismatch(name, expected, actual) => f.write_fmt(format_args!(
                "{} is declared {} but initialized with {}",
                name, expected, actual
            )),
            StringDeclMismatch(name, actual) => f.write_fmt(format_args!(
                "string {} is initialized with {}",
                name, actual
            )),
            ArrayElementMismatch(name, expected, actual) => f.write_fmt(format_args!(
                "array {} holds {} but is initialized with {}",
                name, expected, actual
            )),
            ArraySizeMismatch(name, found, declared) => f.write_fmt(format_args!(
                "array {} declaration has {} elements instead of {}",
                name, found, declared
            )),
            AutoWithoutValue(name) => f.write_fmt(format_args!(
                "cannot infer the type of {} without an initial value",
                name
            )),
            VoidVariable(name) => {
                f.write_fmt(format_args!("cannot declare variable {} with type void", name))
            }
            PrototypeMismatch(name, proto, def) => f.write_fmt(format_args!(
                "declaration of {} as {} does not match its prototype {}",
                name, def, proto
            )),
            ReturnExpected(func, expected, actual) => f.write_fmt(format_args!(
                "return in {} expected {} but got {}",
                func, expected, actual
            )),
            ReturnMissingValue(func, expected) => f.write_fmt(format_args!(
                "return in {} must have a value of type {}",
                func, expected
            )),
        }
    }
}
