use crate::errors::{ResourceKind, TileError};
use crate::slot::SlotPool;
use anyhow::bail;
use std::collections::BTreeSet;
use std::str::FromStr;

/// How instructions are placed on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionPolicy {
    /// A flat, pre-sized slot table; any free slot may be used in any order.
    Positional,
    /// Slots are execution cycles and must be committed in strictly
    /// increasing order.
    CycleOrdered,
}

impl Default for InstructionPolicy {
    fn default() -> Self {
        InstructionPolicy::CycleOrdered
    }
}

impl std::fmt::Display for InstructionPolicy {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InstructionPolicy::Positional => fmt.write_str("positional"),
            InstructionPolicy::CycleOrdered => fmt.write_str("cycle-ordered"),
        }
    }
}

impl FromStr for InstructionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "positional" => Ok(InstructionPolicy::Positional),
            "cycle-ordered" | "cycle_ordered" => Ok(InstructionPolicy::CycleOrdered),
            _ => bail!(
                "unknown instruction policy {:?}; expected positional or cycle-ordered",
                s
            ),
        }
    }
}

/// Cycles committed under the cycle-ordered policy.
/// `watermark` is `None` until the first commit, which places it
/// below every valid cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CycleSchedule {
    capacity: usize,
    committed: BTreeSet<usize>,
    watermark: Option<usize>,
}

impl CycleSchedule {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    fn find_free(&self, hint: usize) -> Option<usize> {
        if self.committed.len() >= self.capacity {
            return None;
        }
        match self.watermark {
            None => Some(hint),
            Some(watermark) => Some(hint.max(watermark.checked_add(1)?)),
        }
    }

    fn commit(&mut self, cycle: usize) -> Result<(), TileError> {
        if self.committed.contains(&cycle) {
            return Err(TileError::InstructionReused { cycle });
        }
        if let Some(watermark) = self.watermark {
            if cycle <= watermark {
                return Err(TileError::InstructionOutOfOrder { cycle, watermark });
            }
        }
        if self.committed.len() >= self.capacity {
            return Err(TileError::InstructionsExhausted {
                cycle,
                capacity: self.capacity,
            });
        }
        self.committed.insert(cycle);
        self.watermark = Some(cycle);
        Ok(())
    }
}

/// The instruction slots of a tile under one of the two policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InstructionSlots {
    Positional(SlotPool),
    CycleOrdered(CycleSchedule),
}

impl InstructionSlots {
    pub(crate) fn new(policy: InstructionPolicy, code_mem_depth: usize) -> Self {
        match policy {
            InstructionPolicy::Positional => {
                InstructionSlots::Positional(SlotPool::new(code_mem_depth))
            }
            InstructionPolicy::CycleOrdered => {
                InstructionSlots::CycleOrdered(CycleSchedule::new(code_mem_depth))
            }
        }
    }

    pub(crate) fn policy(&self) -> InstructionPolicy {
        match self {
            InstructionSlots::Positional(_) => InstructionPolicy::Positional,
            InstructionSlots::CycleOrdered(_) => InstructionPolicy::CycleOrdered,
        }
    }

    /// Returns the earliest slot at or after `hint` that may be committed
    pub(crate) fn find_free(&self, hint: usize) -> Option<usize> {
        match self {
            InstructionSlots::Positional(pool) => pool.find_free(hint),
            InstructionSlots::CycleOrdered(schedule) => schedule.find_free(hint),
        }
    }

    /// Commit `index`.  Positional slots are overwritten without
    /// complaint; cycles must be fresh and strictly increasing.
    pub(crate) fn commit(&mut self, index: usize) -> Result<(), TileError> {
        match self {
            InstructionSlots::Positional(pool) => match pool.claim(index, index) {
                Some(_) => Ok(()),
                None => Err(TileError::OutOfRange {
                    kind: ResourceKind::Instruction,
                    index,
                    size: 1,
                    capacity: pool.len(),
                }),
            },
            InstructionSlots::CycleOrdered(schedule) => schedule.commit(index),
        }
    }

    pub(crate) fn used(&self) -> usize {
        match self {
            InstructionSlots::Positional(pool) => pool.busy_count(),
            InstructionSlots::CycleOrdered(schedule) => schedule.committed.len(),
        }
    }

    /// The watermark for cycle-ordered placement, or the highest busy
    /// slot for positional placement
    pub(crate) fn last_used(&self) -> Option<usize> {
        match self {
            InstructionSlots::Positional(pool) => pool.highest_busy(),
            InstructionSlots::CycleOrdered(schedule) => schedule.watermark,
        }
    }

    pub(crate) fn claimant(&self, index: usize) -> Option<usize> {
        match self {
            InstructionSlots::Positional(pool) => pool.get(index).and_then(|s| s.claimant()),
            InstructionSlots::CycleOrdered(schedule) => {
                schedule.committed.get(&index).copied()
            }
        }
    }
}
