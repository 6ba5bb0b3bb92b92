//! Machine sizing.

/// Default capacity of the operand stack and of the call stack.
pub const DEFAULT_STACK_CAPACITY: usize = 1024;

/// Default number of memory cells.
pub const DEFAULT_MEMORY_CELLS: usize = 16_777_216;

/// Fixed sizes of a machine's stacks and memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum entries on the operand stack, and separately on the call stack.
    pub stack_capacity: usize,
    /// Number of addressable memory cells.
    pub memory_cells: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            memory_cells: DEFAULT_MEMORY_CELLS,
        }
    }
}

impl MachineConfig {
    pub fn with_stack_capacity(mut self, stack_capacity: usize) -> Self {
        self.stack_capacity = stack_capacity;
        self
    }

    pub fn with_memory_cells(mut self, memory_cells: usize) -> Self {
        self.memory_cells = memory_cells;
        self
    }
}
