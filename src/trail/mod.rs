// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trail-based backtracking for the enumeration engine.
//!
//! The trail owns a fixed number of `u64` slots. Every write through
//! [`Trail::set`] records the previous value. A checkpoint is just the
//! current [`Trail::len`], and [`Trail::rewind_to`] restores all slots to the
//! state they had when it was taken.
//!
//! The ordered enumerator keeps the current residual and the partial factor
//! tuple in trail slots; the engine rewinds the trail before every retry, so
//! predicates never undo their own writes.

/// A single entry in the trail, recording one state change.
#[derive(Debug, Clone, Copy)]
struct TrailEntry {
    /// Slot whose value was overwritten
    slot: usize,
    /// The value before the change
    old_value: u64,
}

/// The trail system for O(1) backtracking.
///
/// # Example
///
/// ```
/// use tiling_factors::trail::Trail;
///
/// let mut trail = Trail::with_slots(2);
/// trail.set(0, 12);
/// let checkpoint = trail.len();
///
/// trail.set(0, 6);
/// trail.set(1, 2);
/// assert_eq!(trail.get(0), 6);
///
/// trail.rewind_to(checkpoint);
/// assert_eq!(trail.get(0), 12);
/// assert_eq!(trail.get(1), 0);
/// ```
#[derive(Debug)]
pub struct Trail {
    /// Current slot values
    values: Vec<u64>,
    /// All trail entries recorded so far
    entries: Vec<TrailEntry>,
}

impl Trail {
    /// Maximum trail size.
    ///
    /// Each enumeration level writes at most two slots, so this comfortably
    /// covers `MAX_ORDER` levels.
    pub const MAX_SIZE: usize = 16384;

    /// Create a trail with `slots` zero-initialised values.
    pub fn with_slots(slots: usize) -> Self {
        Self {
            values: vec![0; slots],
            entries: Vec::with_capacity(64),
        }
    }

    /// Read the current value of a slot.
    #[inline]
    pub fn get(&self, slot: usize) -> u64 {
        self.values[slot]
    }

    /// All slot values, in slot order.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Write a slot, recording the old value for backtracking.
    ///
    /// # Panics
    ///
    /// Panics if the trail exceeds MAX_SIZE (indicates a bug in the search algorithm).
    pub fn set(&mut self, slot: usize, new_value: u64) {
        if self.entries.len() >= Self::MAX_SIZE {
            panic!("Trail overflow: exceeded {} entries", Self::MAX_SIZE);
        }
        self.entries.push(TrailEntry {
            slot,
            old_value: self.values[slot],
        });
        self.values[slot] = new_value;
    }

    /// Undo every change recorded after `checkpoint`, newest first.
    pub fn rewind_to(&mut self, checkpoint: usize) {
        while self.entries.len() > checkpoint {
            if let Some(entry) = self.entries.pop() {
                self.values[entry.slot] = entry.old_value;
            }
        }
    }

    /// Get the current number of entries in the trail.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_new() {
        let trail = Trail::with_slots(3);
        assert_eq!(trail.len(), 0);
        assert!(trail.is_empty());
        assert_eq!(trail.values(), &[0, 0, 0]);
    }

    #[test]
    fn test_rewind_to_checkpoint() {
        let mut trail = Trail::with_slots(4);

        trail.set(0, 10);
        trail.set(1, 20);
        let checkpoint = trail.len();
        assert_eq!(checkpoint, 2);

        trail.set(2, 30);
        trail.set(0, 40);
        assert_eq!(trail.len(), 4);

        trail.rewind_to(checkpoint);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.values(), &[10, 20, 0, 0]);
    }

    #[test]
    fn test_nested_checkpoints() {
        let mut trail = Trail::with_slots(1);

        trail.set(0, 1);
        let cp1 = trail.len();

        trail.set(0, 2);
        let cp2 = trail.len();

        trail.set(0, 3);
        assert_eq!(trail.get(0), 3);

        trail.rewind_to(cp2);
        assert_eq!(trail.get(0), 2);

        trail.rewind_to(cp1);
        assert_eq!(trail.get(0), 1);
    }

    #[test]
    fn test_rewind_to_restores_repeated_writes() {
        let mut trail = Trail::with_slots(1);
        trail.set(0, 5);
        let checkpoint = trail.len();

        // Same slot written several times: oldest value wins on rewind
        trail.set(0, 6);
        trail.set(0, 7);
        trail.set(0, 8);
        trail.rewind_to(checkpoint);
        assert_eq!(trail.get(0), 5);
    }

    #[test]
    fn test_rewind_to_later_point_is_a_no_op() {
        let mut trail = Trail::with_slots(1);
        trail.set(0, 4);
        trail.rewind_to(5);
        assert_eq!(trail.get(0), 4);
        assert_eq!(trail.len(), 1);
    }

    #[test]
    #[should_panic(expected = "Trail overflow")]
    fn test_trail_overflow() {
        let mut trail = Trail::with_slots(1);
        for i in 0..Trail::MAX_SIZE + 1 {
            trail.set(0, i as u64);
        }
    }
}
