use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::compiler::ast::Type;

/// Identifies a [`Symbol`] within the [`SymbolArena`] of a compilation unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SymbolKind {
    Global,
    Local,
    Param,
}

/**
 A resolved binding of a name.  One `Symbol` is created for every declaration and every
 function parameter; name references in the tree point at it through its [`SymbolId`].

 `which` is the slot index of a local or parameter within its function's stack frame.
 Globals are addressed by name and do not use it.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub ty: Type,
    pub name: String,
    pub which: usize,
}

impl Symbol {
    pub fn new(kind: SymbolKind, ty: Type, name: &str) -> Symbol {
        Symbol {
            kind,
            ty,
            name: name.into(),
            which: 0,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SymbolKind::Global => f.write_fmt(format_args!("global {}", self.name)),
            SymbolKind::Local => f.write_fmt(format_args!("local {}", self.which)),
            SymbolKind::Param => f.write_fmt(format_args!("param {}", self.which)),
        }
    }
}

/// Owns every symbol of a compilation unit.  Symbols stay in the arena after
/// the scope that declared them is left, so later phases can still look them up
/// through the ids stored in the tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena { symbols: vec![] }
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.push(symbol);
        SymbolId(self.symbols.len() - 1)
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0)
    }

    /// Iterates over the symbols in the order they were declared.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i), s))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum ScopeType {
    Global,
    Local,
    Routine,
}

impl std::fmt::Display for ScopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeType::Global => f.write_str("Global"),
            ScopeType::Local => f.write_str("Local"),
            ScopeType::Routine => f.write_str("Routine"),
        }
    }
}

/**
 `SymbolTable` holds the names declared directly within one lexical scope.  For example:

``` ignore
 f: function void (n: integer) = {
      x: integer = n;
      {
          y: integer = x;
      }
 }
```

 The table for the body of `f` holds `n` and `x`; `y` lives in the table of the inner
 block, which is discarded when the block ends.

 Each table also carries the next free slot index.  Binding a name takes the next slot.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    ty: ScopeType,
    sym: HashMap<String, SymbolId>,
    next_slot: usize,
}

impl SymbolTable {
    pub(super) fn new_global() -> Self {
        SymbolTable {
            ty: ScopeType::Global,
            sym: HashMap::new(),
            next_slot: 0,
        }
    }

    /// A block scope.  Slot numbering continues from `first_slot` so that
    /// the locals of nested blocks never overlap the locals of the blocks
    /// enclosing them.
    pub(super) fn new_local(first_slot: usize) -> Self {
        SymbolTable {
            ty: ScopeType::Local,
            sym: HashMap::new(),
            next_slot: first_slot,
        }
    }

    pub(super) fn new_routine() -> Self {
        SymbolTable {
            ty: ScopeType::Routine,
            sym: HashMap::new(),
            next_slot: 0,
        }
    }

    pub(super) fn scope_type(&self) -> ScopeType {
        self.ty
    }

    pub(super) fn next_slot(&self) -> usize {
        self.next_slot
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.sym.get(name).copied()
    }

    /// Returns the next free slot index and advances past it.
    pub(super) fn take_slot(&mut self) -> usize {
        let which = self.next_slot;
        self.next_slot += 1;
        which
    }

    /// Adds `name` to this table.  A name which is already in this table
    /// is replaced.
    pub(super) fn insert(&mut self, name: &str, id: SymbolId) {
        self.sym.insert(name.into(), id);
    }
}

impl std::fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}\n", self.ty))?;
        let mut names: Vec<_> = self.sym.keys().collect();
        names.sort();
        for name in names {
            f.write_fmt(format_args!("\t{}\n", name))?;
        }
        Ok(())
    }
}
