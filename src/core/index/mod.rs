//=========================================================================
// State Indexing
//=========================================================================
//
// Translates typed enum values into dense integer indices.
//
// Architecture:
//   IndexAllocator (one per machine, shared by every layer)
//     └─ IndexConverter<E> (one per enum layer)
//          ├─ by_content: HashMap<E, StateIndex>
//          └─ by_index:   HashMap<StateIndex, E>
//
// LayerTable stores the converters type-erased so the engine can hold
// any mix of enum types behind one flat index space.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

//=== Module Declarations =================================================

mod converter;
mod layer_table;

//=== Public API ==========================================================

pub use converter::IndexConverter;
pub use layer_table::LayerTable;

//=== State Key Trait =====================================================

/// Marker trait for enum types usable as a state machine layer.
///
/// Typically implemented by game-specific enums:
///
/// ```rust
/// # use layered_state_machine::prelude::*;
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum ActorState { Move, Color, Zoom }
/// impl StateKey for ActorState {}
/// ```
pub trait StateKey: Clone + Copy + Eq + Hash + Debug + 'static {}

//=== StateIndex ==========================================================

/// Dense identity of a registered state, unique per machine across layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateIndex(usize);

impl StateIndex {
    /// Wraps a raw index.
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw index value.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Display for StateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StateIndex {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

//=== IndexAllocator ======================================================

/// Hands out strictly increasing indices, never reusing one.
#[derive(Debug, Default)]
pub struct IndexAllocator {
    next: usize,
}

impl IndexAllocator {
    /// Creates an allocator whose first index is 0.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns the next unused index and advances the counter.
    pub fn next_index(&mut self) -> StateIndex {
        let index = StateIndex(self.next);
        self.next += 1;
        index
    }

    /// Returns the index the next call to `next_index` will produce.
    pub fn peek(&self) -> StateIndex {
        StateIndex(self.next)
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_counts_up_from_zero() {
        let mut allocator = IndexAllocator::new();
        assert_eq!(allocator.peek(), StateIndex::new(0));
        assert_eq!(allocator.next_index(), StateIndex::new(0));
        assert_eq!(allocator.next_index(), StateIndex::new(1));
        assert_eq!(allocator.next_index(), StateIndex::new(2));
        assert_eq!(allocator.peek(), StateIndex::new(3));
    }

    #[test]
    fn state_index_displays_raw_value() {
        assert_eq!(StateIndex::new(12).to_string(), "12");
        assert_eq!(StateIndex::from(3).get(), 3);
    }
}
