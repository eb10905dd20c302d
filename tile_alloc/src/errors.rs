use thiserror::Error;

/// The three kinds of per-tile resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Instruction,
    DataWord,
    Register,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Instruction => "instruction",
            ResourceKind::DataWord => "data word",
            ResourceKind::Register => "register",
        };
        fmt.write_str(name)
    }
}

/// A caller broke the query-then-commit protocol.
///
/// Running out of room is not an error: the `find_free_*` queries
/// return `None` for that.  Every `TileError` means the assembler
/// asked for something it never validly queried, and the pass that
/// produced it cannot be trusted to emit a correct program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("attempted to re-use instruction cycle {cycle}")]
    InstructionReused { cycle: usize },

    #[error("attempted to use instruction cycle {cycle} too early: cycle {watermark} is already committed")]
    InstructionOutOfOrder { cycle: usize, watermark: usize },

    #[error("attempted to use instruction cycle {cycle} with all {capacity} instruction slots committed")]
    InstructionsExhausted { cycle: usize, capacity: usize },

    #[error("{kind} {index} (+{size}) is outside of the {capacity} available")]
    OutOfRange {
        kind: ResourceKind,
        index: usize,
        size: usize,
        capacity: usize,
    },
}

impl TileError {
    /// The index or cycle that the caller tried to commit
    pub fn offending_index(&self) -> usize {
        match self {
            TileError::InstructionReused { cycle } => *cycle,
            TileError::InstructionOutOfOrder { cycle, .. } => *cycle,
            TileError::InstructionsExhausted { cycle, .. } => *cycle,
            TileError::OutOfRange { index, .. } => *index,
        }
    }
}
