use log::trace;

use super::symbol_table::{ScopeType, Symbol, SymbolArena, SymbolId, SymbolTable};

/**
 The stack of scopes that are open at the current point of a traversal.  The
 global scope is always at the bottom of the stack and cannot be left.

 The stack also owns the [`SymbolArena`] into which every bound symbol is
 moved; when the traversal is done the arena is taken with
 [`SymbolTableScopeStack::into_arena`].
*/
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTableScopeStack {
    stack: Vec<SymbolTable>,
    head: SymbolTable,
    arena: SymbolArena,
}

impl std::fmt::Display for SymbolTableScopeStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("0: {}", self.head))?;
        for (i, scope) in self.stack.iter().rev().enumerate() {
            f.write_fmt(format_args!("{}: {}", i + 1, scope))?;
        }
        Ok(())
    }
}

impl SymbolTableScopeStack {
    pub fn new() -> SymbolTableScopeStack {
        SymbolTableScopeStack {
            stack: vec![],
            head: SymbolTable::new_global(),
            arena: SymbolArena::new(),
        }
    }

    /// Opens a block scope.
    pub fn enter(&mut self) {
        let first_slot = match self.head.scope_type() {
            ScopeType::Global => 0,
            ScopeType::Local | ScopeType::Routine => self.head.next_slot(),
        };
        self.push(SymbolTable::new_local(first_slot));
    }

    /// Opens the scope of a function.  Slot numbering starts over at zero, with
    /// the parameters taking the first slots.
    pub fn enter_function(&mut self) {
        self.push(SymbolTable::new_routine());
    }

    fn push(&mut self, table: SymbolTable) {
        let old = std::mem::replace(&mut self.head, table);
        self.stack.push(old);
        trace!("Enter scope: level {}", self.level());
    }

    /// Closes the innermost scope and returns its table.  The symbols declared
    /// in it stay in the arena.  Returns `None` if only the global scope is
    /// open.
    pub fn exit(&mut self) -> Option<SymbolTable> {
        let next = self.stack.pop()?;
        trace!("Leave scope: level {}", self.level());
        Some(std::mem::replace(&mut self.head, next))
    }

    /// The number of open scopes, `1` being the global scope.
    pub fn level(&self) -> usize {
        self.stack.len() + 1
    }

    /// Binds `name` in the innermost scope, assigning the symbol the next slot
    /// index of that scope.
    pub fn bind(&mut self, name: &str, mut symbol: Symbol) -> SymbolId {
        symbol.which = self.head.take_slot();
        trace!("Bind {} as {}", name, symbol);
        let id = self.arena.add(symbol);
        self.head.insert(name, id);
        id
    }

    /// Searches the open scopes, innermost first, for `name`.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.head
            .get(name)
            .or_else(|| self.stack.iter().rev().find_map(|scope| scope.get(name)))
    }

    /// Searches only the innermost scope for `name`.
    pub fn lookup_current(&self, name: &str) -> Option<SymbolId> {
        self.head.get(name)
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.arena.get(id)
    }

    pub fn into_arena(self) -> SymbolArena {
        self.arena
    }
}

impl Default for SymbolTableScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
