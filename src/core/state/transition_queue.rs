//=========================================================================
// Transition Queue
//=========================================================================
//
// Queue for transitions requested by states from inside a callback.
//
// A state cannot reach its machine while the machine is calling into it,
// so requests land here and the machine applies them, in FIFO order,
// once the callback has returned.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::index::StateIndex;

//=== Transition Request ==================================================

/// A transition a state asked for during a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRequest {
    /// Change to the given state, subject to its `can_change_state`.
    ToIndex(StateIndex),

    /// Change to the machine's default state, bypassing permission checks.
    ToDefault,
}

//=== Transition Queue ====================================================

/// FIFO of pending transition requests.
#[derive(Debug, Default)]
pub struct TransitionQueue {
    queue: Vec<TransitionRequest>,
}

impl TransitionQueue {
    /// Creates a new empty transition queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a request to be applied after the current callback.
    pub fn push(&mut self, request: TransitionRequest) {
        self.queue.push(request);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops every queued request.
    pub fn clear(&mut self) {
        self.queue.clear()
    }

    /// Takes all requests from the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<TransitionRequest> {
        std::mem::take(&mut self.queue)
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_preserves_fifo_order_and_empties() {
        let mut queue = TransitionQueue::new();
        queue.push(TransitionRequest::ToIndex(StateIndex::new(2)));
        queue.push(TransitionRequest::ToDefault);

        assert!(!queue.is_empty());
        assert_eq!(
            queue.take(),
            vec![
                TransitionRequest::ToIndex(StateIndex::new(2)),
                TransitionRequest::ToDefault
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_drops_pending_requests() {
        let mut queue = TransitionQueue::new();
        queue.push(TransitionRequest::ToDefault);
        assert!(!queue.is_empty());

        queue.clear();
        assert!(queue.is_empty());
    }
}
