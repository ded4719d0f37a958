/// Hands out the labels used within function bodies.  Every label produced
/// is unique across the whole compilation unit.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    count: u32,
}

impl LabelAllocator {
    pub fn new() -> LabelAllocator {
        LabelAllocator { count: 0 }
    }

    /// Returns a fresh `.L<n>` label.
    pub fn next(&mut self) -> String {
        let lbl = format!(".L{}", self.count);
        self.count += 1;
        lbl
    }

    /// The label every return statement in `func` jumps to.
    pub fn epilogue(func: &str) -> String {
        format!(".{}_epilogue", func)
    }
}
