/// Offset cursor for the frame being laid out.
///
/// Each declaration takes the current offset, then the cursor moves by
/// `size * step`: parameters grow upward from `+4`, locals downward from `-2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalVariables {
    offset: i32,
    step: i32,
}

impl Default for LocalVariables {
    fn default() -> Self {
        Self::class_body()
    }
}

impl LocalVariables {
    pub fn new(offset: i32, step: i32) -> Self {
        Self { offset, step }
    }

    /// Parameter lists: above the frame base.
    pub fn params() -> Self {
        Self::new(4, 1)
    }

    /// Method bodies: below the frame base.
    pub fn locals() -> Self {
        Self::new(-2, -1)
    }

    pub fn class_body() -> Self {
        Self::new(2, -1)
    }

    pub fn get_last_offset(&self) -> i32 {
        self.offset
    }

    pub fn reset(&mut self, to: LocalVariables) {
        *self = to;
    }

    pub fn restore(&mut self, offset: i32) {
        self.offset = offset;
    }

    /// Hands out the offset for a declaration of `size` bytes.
    pub fn declare(&mut self, size: i32) -> i32 {
        let offset = self.offset;
        self.offset += size * self.step;
        offset
    }
}
