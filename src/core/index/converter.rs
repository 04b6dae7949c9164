//=========================================================================
// Index Converter
//=========================================================================
//
// Bidirectional mapping between one enum type and allocator indices.
//
// Both directions are always inserted and removed together, so every
// content maps to exactly one index and every index back to exactly one
// content.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{IndexAllocator, StateIndex, StateKey};
use crate::core::error::{Result, StateMachineError};

//=== IndexConverter ======================================================

/// Maps values of one enum layer to machine-wide state indices.
#[derive(Debug)]
pub struct IndexConverter<E: StateKey> {
    by_content: HashMap<E, StateIndex>,
    by_index: HashMap<StateIndex, E>,
}

impl<E: StateKey> IndexConverter<E> {
    /// Creates an empty converter.
    pub fn new() -> Self {
        Self {
            by_content: HashMap::new(),
            by_index: HashMap::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Returns the index of `content`, allocating one on first sight.
    pub fn register_and_return_index(
        &mut self,
        allocator: &mut IndexAllocator,
        content: E,
    ) -> StateIndex {
        if let Some(&index) = self.by_content.get(&content) {
            return index;
        }

        let index = allocator.next_index();
        self.by_content.insert(content, index);
        self.by_index.insert(index, content);
        debug!("Mapped {:?} to state index {}", content, index);
        index
    }

    /// Removes `content` and its index. Returns the freed index, if any.
    pub fn remove_content(&mut self, content: &E) -> Option<StateIndex> {
        let index = self.by_content.remove(content)?;
        self.by_index.remove(&index);
        Some(index)
    }

    /// Removes `index` and its content. Returns the freed content, if any.
    pub fn remove_index(&mut self, index: StateIndex) -> Option<E> {
        let content = self.by_index.remove(&index)?;
        self.by_content.remove(&content);
        Some(content)
    }

    //--- Lookup -----------------------------------------------------------

    /// Strict lookup: an unregistered value is a caller error.
    pub fn index_of(&self, content: &E) -> Result<StateIndex> {
        self.try_index_of(content).ok_or_else(|| {
            warn!("State {:?} is not registered", content);
            StateMachineError::UnknownState(format!("{:?}", content))
        })
    }

    /// Non-failing lookup.
    pub fn try_index_of(&self, content: &E) -> Option<StateIndex> {
        self.by_content.get(content).copied()
    }

    pub fn content_of(&self, index: StateIndex) -> Option<E> {
        self.by_index.get(&index).copied()
    }

    pub fn contains(&self, content: &E) -> bool {
        self.by_content.contains_key(content)
    }

    pub fn contains_index(&self, index: StateIndex) -> bool {
        self.by_index.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.by_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_content.is_empty()
    }

    /// Iterates over `(content, index)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (E, StateIndex)> + '_ {
        self.by_content.iter().map(|(&content, &index)| (content, index))
    }
}

impl<E: StateKey> Default for IndexConverter<E> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
