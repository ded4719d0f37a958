use serde::{Deserialize, Serialize};

use super::parameter::ParameterList;

/**
The static types a value can have in B-minor.  This covers the primitive types along
with the two aggregate types (the array and the function).  This also includes the
`Auto` type, which is a placeholder for a declaration whose type will be inferred
from its initializer by the type checker.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Void,
    Boolean,
    Character,
    Integer,
    String,
    /// Element type and declared size.  A size of `0` means no size was given.
    Array(Box<Type>, usize),
    /// Return type and parameter list.
    Function(Box<Type>, ParameterList),
    Auto,
}

impl Type {
    /// Structural comparison of two types.
    ///
    /// Arrays compare their element types (the declared size is not part of the
    /// comparison) and functions compare their return types and every parameter
    /// pairwise.  All other types are equal when they are the same kind of type.
    /// Two types of different kinds are never equal.
    pub fn compare(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Array(l, _), Type::Array(r, _)) => l.compare(r),
            (Type::Function(lret, lparams), Type::Function(rret, rparams)) => {
                lret.compare(rret) && lparams.compare_types(rparams)
            }
            (l, r) => std::mem::discriminant(l) == std::mem::discriminant(r),
        }
    }

    pub fn is_integer(&self) -> bool {
        *self == Type::Integer
    }

    pub fn is_boolean(&self) -> bool {
        *self == Type::Boolean
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(..))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(..))
    }

    /// Returns the element type if this is an array.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(el, _) => Some(el),
            _ => None,
        }
    }

    /// Returns the return type if this is a function.
    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Type::Function(ret, _) => Some(ret),
            _ => None,
        }
    }

    pub fn params(&self) -> Option<&ParameterList> {
        match self {
            Type::Function(_, params) => Some(params),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Boolean => f.write_str("boolean"),
            Type::Character => f.write_str("char"),
            Type::Integer => f.write_str("integer"),
            Type::String => f.write_str("string"),
            Type::Auto => f.write_str("auto"),
            Type::Array(el, 0) => f.write_fmt(format_args!("array [] {}", el)),
            Type::Array(el, sz) => f.write_fmt(format_args!("array [{}] {}", sz, el)),
            Type::Function(ret, params) => {
                f.write_fmt(format_args!("function {} ({})", ret, params))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::Parameter;

    fn func(ret: Type, params: Vec<(&str, Type)>) -> Type {
        Type::Function(
            Box::new(ret),
            ParameterList::new(
                params
                    .into_iter()
                    .map(|(n, t)| Parameter::new(n, t))
                    .collect(),
            ),
        )
    }

    #[test]
    fn compare_is_reflexive() {
        for ty in vec![
            Type::Void,
            Type::Boolean,
            Type::Character,
            Type::Integer,
            Type::String,
            Type::Auto,
            Type::Array(Box::new(Type::Array(Box::new(Type::Integer), 2)), 3),
            func(
                Type::Integer,
                vec![
                    ("a", Type::Integer),
                    ("s", Type::Array(Box::new(Type::Character), 0)),
                ],
            ),
        ] {
            assert!(ty.compare(&ty.clone()), "{}", ty);
        }
    }

    #[test]
    fn compare_arrays_ignores_size() {
        let a = Type::Array(Box::new(Type::Integer), 3);
        let b = Type::Array(Box::new(Type::Integer), 0);
        let c = Type::Array(Box::new(Type::Boolean), 3);
        assert!(a.compare(&b));
        assert!(!a.compare(&c));
    }

    #[test]
    fn compare_different_kinds() {
        assert!(!Type::Integer.compare(&Type::Boolean));
        assert!(!Type::Array(Box::new(Type::Integer), 1).compare(&Type::Integer));
        assert!(!func(Type::Integer, vec![]).compare(&Type::Integer));
        assert!(!Type::Integer.compare(&func(Type::Integer, vec![])));
    }

    #[test]
    fn compare_functions_checks_every_parameter() {
        let f = func(
            Type::Void,
            vec![("a", Type::Integer), ("b", Type::Integer)],
        );
        let g = func(
            Type::Void,
            vec![("x", Type::Integer), ("y", Type::Boolean)],
        );
        let h = func(Type::Integer, vec![("a", Type::Integer), ("b", Type::Integer)]);
        assert!(!f.compare(&g));
        assert!(!f.compare(&h));
        assert!(f.compare(&func(
            Type::Void,
            vec![("p", Type::Integer), ("q", Type::Integer)]
        )));
    }

    #[test]
    fn display_types() {
        assert_eq!(
            Type::Array(Box::new(Type::Integer), 5).to_string(),
            "array [5] integer"
        );
        assert_eq!(
            Type::Array(Box::new(Type::Character), 0).to_string(),
            "array [] char"
        );
        assert_eq!(
            func(Type::Void, vec![("x", Type::Integer), ("c", Type::Character)]).to_string(),
            "function void (x: integer, c: char)"
        );
    }
}
