use crate::compiler::ast::Declaration;

/// Every value occupies one 8 byte slot.
pub const SLOT_SIZE: usize = 8;

/**
The stack frame of a function.  After the saved base pointer come the
parameters, pushed in order, and then the locals.  Slot `n` lives at
`-8 * (n + 1)` from the base pointer:

```text
    |  return address  |
    |  saved %rbp      | <- %rbp
    |  param 0         | -8(%rbp)
    |  ...             |
    |  local 0         | -8 * (params + 1)(%rbp)
    |  ...             |
    |  saved registers |
```

Locals are numbered after the parameters by the resolver, so slot numbers
can be used directly.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackFrame {
    params: usize,
    locals: usize,
}

impl StackFrame {
    pub fn new(params: usize, locals: usize) -> StackFrame {
        StackFrame { params, locals }
    }

    pub fn from_function(decl: &Declaration) -> StackFrame {
        let params = decl.ty.params().map_or(0, |p| p.len());
        StackFrame::new(params, decl.local_count())
    }

    pub fn params(&self) -> usize {
        self.params
    }

    /// Bytes reserved below the parameters for the locals.
    pub fn locals_size(&self) -> usize {
        self.locals * SLOT_SIZE
    }

    /// Distance below the base pointer of the given slot.
    pub fn offset(slot: usize) -> usize {
        (slot + 1) * SLOT_SIZE
    }
}
