//! Fixed-capacity LIFO buffer used for the operand and call stacks.

/// Why a stack operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    Overflow,
    Underflow,
}

/// A LIFO stack that never grows past its capacity.
///
/// Every mutating operation checks capacity or occupancy first and leaves
/// the stack untouched when it refuses.
#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: Copy> Stack<T> {
    /// Create an empty stack holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fail with `Underflow` unless at least `count` entries are present.
    pub fn require(&self, count: usize) -> Result<(), StackError> {
        if self.items.len() < count {
            Err(StackError::Underflow)
        } else {
            Ok(())
        }
    }

    /// Fail with `Overflow` unless `count` more entries fit.
    pub fn reserve(&self, count: usize) -> Result<(), StackError> {
        if self.capacity - self.items.len() < count {
            Err(StackError::Overflow)
        } else {
            Ok(())
        }
    }

    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        self.reserve(1)?;
        self.items.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T, StackError> {
        self.items.pop().ok_or(StackError::Underflow)
    }

    /// The entry `depth` places below the top (0 is the top).
    pub fn peek(&self, depth: usize) -> Result<T, StackError> {
        self.items
            .len()
            .checked_sub(depth + 1)
            .map(|index| self.items[index])
            .ok_or(StackError::Underflow)
    }

    /// Exchange the top two entries.
    pub fn swap_top(&mut self) -> Result<(), StackError> {
        self.require(2)?;
        let len = self.items.len();
        self.items.swap(len - 1, len - 2);
        Ok(())
    }

    /// Entries from the top of the stack down to the bottom.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }

    /// Entries bottom first.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}
