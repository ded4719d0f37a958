/**
 * ScratchRegisters tracks which of a fixed bank of registers are holding an
 * intermediate value.  Allocation is first-fit: the lowest numbered free
 * register is always handed out, which makes the generated code deterministic.
 * It is independent of specific CPU architectures; the bank is supplied by
 * the code generator.
 */
#[derive(Debug)]
pub struct ScratchRegisters<R> {
    bank: Vec<R>,
    in_use: Vec<bool>,
}

impl<R: Copy + PartialEq + std::fmt::Debug> ScratchRegisters<R> {
    pub fn new(bank: &[R]) -> ScratchRegisters<R> {
        ScratchRegisters {
            bank: bank.to_vec(),
            in_use: vec![false; bank.len()],
        }
    }

    /// Claims the first free register.  Returns `None` when every register
    /// in the bank is in use.
    pub fn alloc(&mut self) -> Option<R> {
        let idx = self.in_use.iter().position(|used| !used)?;
        self.in_use[idx] = true;
        Some(self.bank[idx])
    }

    /// Returns `reg` to the bank.  Freeing a register that is not part of
    /// the bank does nothing.
    pub fn free(&mut self, reg: R) {
        if let Some(idx) = self.bank.iter().position(|r| *r == reg) {
            self.in_use[idx] = false;
        }
    }

    pub fn in_use(&self) -> usize {
        self.in_use.iter().filter(|used| **used).count()
    }

    /// Marks every register as free.
    pub fn reset(&mut self) {
        self.in_use.iter_mut().for_each(|used| *used = false);
    }
}
