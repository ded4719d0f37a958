use std::collections::HashMap;

/// The string literals used within function bodies.  Each distinct literal
/// is stored once in the data section under its own label.
#[derive(Debug, Default, PartialEq)]
pub struct StringPool {
    pool: HashMap<String, usize>,
    order: Vec<String>,
}

impl StringPool {
    pub fn new() -> StringPool {
        StringPool {
            pool: HashMap::new(),
            order: vec![],
        }
    }

    /// If the given string is not in the string pool, this will insert the
    /// string and generate a unique ID for it.  Returns the label of the string.
    pub fn insert(&mut self, s: &str) -> String {
        let id = match self.pool.get(s) {
            Some(id) => *id,
            None => {
                let id = self.order.len();
                self.pool.insert(s.into(), id);
                self.order.push(s.into());
                id
            }
        };
        Self::label(id)
    }

    /// Iterates over every label and string, in the order they were inserted.
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        self.order
            .iter()
            .enumerate()
            .map(|(id, s)| (Self::label(id), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    fn label(id: usize) -> String {
        format!(".str_{}", id)
    }
}
