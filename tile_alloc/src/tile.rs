use crate::errors::{ResourceKind, TileError};
use crate::instruction::{InstructionPolicy, InstructionSlots};
use crate::machine::{Machine, MachineDescription};
use crate::slot::SlotPool;
use tracing::{debug, trace, warn};

/// Tracks which instruction slots, data words and registers of a
/// single tile are in use.
///
/// Allocation is a two step protocol: a `find_free_*` query proposes a
/// location (or `None` when the tile is out of room) without changing
/// anything, and the matching `use_*` call commits it.  Commits are
/// permanent for the life of the tile.
#[derive(Debug, Clone)]
pub struct Tile {
    machine: MachineDescription,
    instructions: InstructionSlots,
    data: SlotPool,
    registers: SlotPool,
}

impl Tile {
    pub fn new<M: Machine + ?Sized>(machine: &M, policy: InstructionPolicy) -> Self {
        let machine = MachineDescription::of(machine);
        Self {
            instructions: InstructionSlots::new(policy, machine.code_mem_depth),
            data: SlotPool::new(machine.data_mem_depth),
            registers: SlotPool::new(machine.register_count),
            machine,
        }
    }

    /// The capacities this tile was sized from
    pub fn machine(&self) -> &MachineDescription {
        &self.machine
    }

    pub fn policy(&self) -> InstructionPolicy {
        self.instructions.policy()
    }

    /// Find the earliest instruction slot at or after `start` that may
    /// be committed.
    pub fn find_free_instruction(&self, start: usize) -> Option<usize> {
        let found = self.instructions.find_free(start);
        trace!(start, ?found, policy = %self.policy(), "find_free_instruction");
        found
    }

    pub fn use_instruction(&mut self, index: usize) -> Result<(), TileError> {
        let result = self.instructions.commit(index);
        match &result {
            Ok(()) => debug!(index, policy = %self.policy(), "use_instruction"),
            Err(err) => warn!(index, policy = %self.policy(), "use_instruction: {}", err),
        }
        result
    }

    /// Under the cycle-ordered policy this is the most recently
    /// committed cycle; `None` until something has been committed.
    pub fn last_used_instruction(&self) -> Option<usize> {
        self.instructions.last_used()
    }

    /// Find the lowest offset with `size` consecutive free data words
    pub fn find_free_array(&self, size: usize) -> Option<usize> {
        let found = self.data.find_free_run(size);
        trace!(size, ?found, "find_free_array");
        found
    }

    /// Mark the `size` data words from `offset` as busy.
    /// Words that are already busy are silently re-claimed.
    pub fn use_array(&mut self, offset: usize, size: usize) -> Result<(), TileError> {
        if !self.data.contains_run(offset, size) {
            let err = TileError::OutOfRange {
                kind: ResourceKind::DataWord,
                index: offset,
                size,
                capacity: self.data.len(),
            };
            warn!(offset, size, "use_array: {}", err);
            return Err(err);
        }
        for word in offset..offset + size {
            self.data.claim(word, word);
        }
        debug!(offset, size, "use_array");
        Ok(())
    }

    pub fn find_free_register(&self) -> Option<usize> {
        let found = self.registers.find_free(0);
        trace!(?found, "find_free_register");
        found
    }

    /// Mark register `index` busy.  A busy register is silently re-claimed.
    pub fn use_register(&mut self, index: usize) -> Result<(), TileError> {
        if !self.registers.contains_run(index, 1) {
            let err = TileError::OutOfRange {
                kind: ResourceKind::Register,
                index,
                size: 1,
                capacity: self.registers.len(),
            };
            warn!(index, "use_register: {}", err);
            return Err(err);
        }
        self.registers.claim(index, index);
        debug!(index, "use_register");
        Ok(())
    }

    /// Who committed a slot, if anyone
    pub fn claimant(&self, kind: ResourceKind, index: usize) -> Option<usize> {
        match kind {
            ResourceKind::Instruction => self.instructions.claimant(index),
            ResourceKind::DataWord => self.data.get(index).and_then(|s| s.claimant()),
            ResourceKind::Register => self.registers.get(index).and_then(|s| s.claimant()),
        }
    }

    pub fn instructions_used(&self) -> usize {
        self.instructions.used()
    }

    pub fn data_words_used(&self) -> usize {
        self.data.busy_count()
    }

    pub fn registers_used(&self) -> usize {
        self.registers.busy_count()
    }
}
