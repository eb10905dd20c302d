/// The busy state of a single instruction, data word or register slot.
/// Slots only ever move from `Free` to `Busy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,
    /// Committed by the logical index or cycle that claimed it
    Busy { claimant: usize },
}

impl Default for SlotState {
    fn default() -> Self {
        SlotState::Free
    }
}

impl SlotState {
    pub fn is_busy(&self) -> bool {
        match self {
            SlotState::Free => false,
            SlotState::Busy { .. } => true,
        }
    }

    pub fn claimant(&self) -> Option<usize> {
        match self {
            SlotState::Free => None,
            SlotState::Busy { claimant } => Some(*claimant),
        }
    }
}

/// A fixed length run of slots, searched first-fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotPool {
    slots: Vec<SlotState>,
}

impl SlotPool {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            slots: vec![SlotState::Free; len],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).copied()
    }

    pub(crate) fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_busy()).count()
    }

    /// Returns the index of the highest busy slot
    pub(crate) fn highest_busy(&self) -> Option<usize> {
        self.slots.iter().rposition(SlotState::is_busy)
    }

    /// Returns the first free slot at or after `start`
    pub(crate) fn find_free(&self, start: usize) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, s)| !s.is_busy())
            .map(|(idx, _)| idx)
    }

    /// Returns the lowest offset of `size` consecutive free slots.
    /// An empty run always fits at offset 0.
    pub(crate) fn find_free_run(&self, size: usize) -> Option<usize> {
        if size == 0 {
            return Some(0);
        }
        if size > self.slots.len() {
            return None;
        }
        (0..=self.slots.len() - size)
            .find(|&start| self.slots[start..start + size].iter().all(|s| !s.is_busy()))
    }

    /// Mark `index` busy on behalf of `claimant`, returning the state
    /// it held before, or `None` if there is no such slot.
    pub(crate) fn claim(&mut self, index: usize, claimant: usize) -> Option<SlotState> {
        let slot = self.slots.get_mut(index)?;
        Some(std::mem::replace(slot, SlotState::Busy { claimant }))
    }

    /// Whether `[offset, offset + size)` lies entirely inside the pool.
    /// An empty run touches nothing and always fits.
    pub(crate) fn contains_run(&self, offset: usize, size: usize) -> bool {
        size == 0
            || offset
                .checked_add(size)
                .map(|end| end <= self.slots.len())
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slot_state() {
        assert_eq!(SlotState::default(), SlotState::Free);
        assert!(!SlotState::Free.is_busy());
        assert_eq!(SlotState::Free.claimant(), None);
        let busy = SlotState::Busy { claimant: 7 };
        assert!(busy.is_busy());
        assert_eq!(busy.claimant(), Some(7));
    }

    #[test]
    fn first_fit() {
        let mut pool = SlotPool::new(4);
        assert_eq!(pool.find_free(0), Some(0));
        assert_eq!(pool.find_free(2), Some(2));
        assert_eq!(pool.find_free(4), None);

        assert_eq!(pool.claim(0, 0), Some(SlotState::Free));
        assert_eq!(pool.claim(2, 2), Some(SlotState::Free));
        assert_eq!(pool.find_free(0), Some(1));
        assert_eq!(pool.find_free(2), Some(3));
        assert_eq!(pool.busy_count(), 2);
        assert_eq!(pool.highest_busy(), Some(2));

        assert_eq!(pool.claim(2, 5), Some(SlotState::Busy { claimant: 2 }));
        assert_eq!(pool.get(2), Some(SlotState::Busy { claimant: 5 }));
        assert_eq!(pool.get(4), None);
    }

    #[test]
    fn claim_outside_the_pool_changes_nothing() {
        let mut pool = SlotPool::new(2);
        assert_eq!(pool.claim(5, 5), None);
        assert_eq!(pool.claim(2, 2), None);
        assert_eq!(pool.busy_count(), 0);
        assert_eq!(pool.find_free_run(2), Some(0));
    }

    #[test]
    fn runs_may_end_at_the_pool_boundary() {
        let mut pool = SlotPool::new(5);
        assert_eq!(pool.find_free_run(5), Some(0));
        assert_eq!(pool.find_free_run(6), None);

        pool.claim(1, 1);
        assert_eq!(pool.find_free_run(3), Some(2));
        assert_eq!(pool.find_free_run(4), None);
        assert_eq!(pool.find_free_run(1), Some(0));
        assert_eq!(pool.find_free_run(0), Some(0));
    }

    #[test]
    fn run_bounds() {
        let pool = SlotPool::new(3);
        assert!(pool.contains_run(0, 3));
        assert!(pool.contains_run(2, 1));
        assert!(pool.contains_run(2, 0));
        assert!(pool.contains_run(9, 0));
        assert!(!pool.contains_run(1, 3));
        assert!(!pool.contains_run(usize::max_value(), 2));

        let empty = SlotPool::new(0);
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.find_free(0), None);
        assert_eq!(empty.find_free_run(0), Some(0));
        assert_eq!(empty.find_free_run(1), None);
        assert!(empty.contains_run(0, 0));
    }
}
