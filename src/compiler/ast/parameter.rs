use serde::{Deserialize, Serialize};

use crate::compiler::semantics::SymbolId;

use super::ty::Type;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    /// Set by the resolver to the parameter symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolId>,
}

impl Parameter {
    pub fn new(name: &str, ty: Type) -> Parameter {
        Parameter {
            name: name.into(),
            ty,
            symbol: None,
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}: {}", self.name, self.ty))
    }
}

/// The ordered parameters of a function type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterList(Vec<Parameter>);

impl ParameterList {
    pub fn new(params: Vec<Parameter>) -> ParameterList {
        ParameterList(params)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Parameter> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<Parameter> {
        self.0.iter_mut()
    }

    /// Two parameter lists are the same when they have the same length and
    /// every parameter's type compares equal to the parameter at the same
    /// position.  Names are not compared.
    pub fn compare_types(&self, other: &ParameterList) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(l, r)| l.ty.compare(&r.ty))
    }

    /// Checks the types of the arguments at a call site against this list.
    pub fn compare_call(&self, args: &[Type]) -> bool {
        self.len() == args.len()
            && self
                .iter()
                .zip(args.iter())
                .all(|(p, arg)| p.ty.compare(arg))
    }
}

impl std::fmt::Display for ParameterList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        f.write_str(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_must_match_count_and_types() {
        let params = ParameterList::new(vec![
            Parameter::new("x", Type::Integer),
            Parameter::new("c", Type::Character),
        ]);
        assert!(params.compare_call(&[Type::Integer, Type::Character]));
        assert!(!params.compare_call(&[Type::Integer]));
        assert!(!params.compare_call(&[Type::Integer, Type::Integer]));
        assert!(!params.compare_call(&[Type::Integer, Type::Character, Type::Integer]));
    }

    #[test]
    fn names_do_not_matter() {
        let a = ParameterList::new(vec![Parameter::new("x", Type::Integer)]);
        let b = ParameterList::new(vec![Parameter::new("y", Type::Integer)]);
        assert!(a.compare_types(&b));
        assert!(!a.compare_types(&ParameterList::default()));
    }
}
