//=========================================================================
// Transition History
//=========================================================================
//
// Bounded record of the most recent state changes, oldest first.
//
// Entries are dropped from the front once capacity is reached. A
// capacity of 0 records nothing.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

//=== Internal Dependencies ===============================================

use crate::core::index::StateIndex;

//=== TransitionRecord ====================================================

/// One state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRecord {
    /// State left, `None` for the machine's initial entry.
    pub from: Option<StateIndex>,
    /// State entered.
    pub to: StateIndex,
    /// Timer value of the state left, in seconds.
    pub elapsed: f32,
}

//=== TransitionHistory ===================================================

/// Ring buffer of recent transitions.
#[derive(Debug, Clone, Default)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    capacity: usize,
}

impl TransitionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn record(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    /// Indices visited, in order: the first record's origin (if any)
    /// followed by every destination.
    pub fn path(&self) -> Vec<StateIndex> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(from) = self.records.front().and_then(|r| r.from) {
            path.push(from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: Option<usize>, to: usize) -> TransitionRecord {
        TransitionRecord {
            from: from.map(StateIndex::new),
            to: StateIndex::new(to),
            elapsed: 0.0,
        }
    }

    #[test]
    fn oldest_records_are_evicted_first() {
        let mut history = TransitionHistory::new(2);
        history.record(record(None, 0));
        history.record(record(Some(0), 1));
        history.record(record(Some(1), 2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.records().next(), Some(&record(Some(0), 1)));
        assert_eq!(history.last(), Some(&record(Some(1), 2)));
    }

    #[test]
    fn path_starts_with_first_origin() {
        let mut history = TransitionHistory::new(8);
        history.record(record(Some(3), 1));
        history.record(record(Some(1), 3));

        let path: Vec<usize> = history.path().into_iter().map(StateIndex::get).collect();
        assert_eq!(path, vec![3, 1, 3]);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut history = TransitionHistory::new(0);
        history.record(record(None, 0));
        assert!(history.is_empty());
        assert!(history.path().is_empty());
    }
}
