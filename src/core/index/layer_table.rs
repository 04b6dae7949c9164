//=========================================================================
// Layer Table
//=========================================================================
//
// Ordered, type-erased storage for the per-layer index converters of a
// single machine.
//
// Architecture:
//   LayerTable
//     └─ layers: Vec<(TypeId, Box<dyn LayerSlot>)>   (attach order)
//                               ↓
//        get::<E>() → downcast → &IndexConverter<E>
//
// Order matters only for label lookup: the first layer that knows an
// index names it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any, TypeId};

use log::debug;

//=== Internal Dependencies ===============================================

use super::{IndexConverter, StateIndex, StateKey};
use crate::core::error::{Result, StateMachineError};

//=== LayerSlot ===========================================================

/// Type-erased view of an `IndexConverter<E>`.
///
/// Allows index-only queries and removal without knowing `E` at compile
/// time.
trait LayerSlot {
    /// Returns the enum type name for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Debug-formats the value mapped to `index`, if any.
    fn label_of(&self, index: StateIndex) -> Option<String>;

    /// Removes the mapping for `index`. Returns true if one existed.
    fn remove_index(&mut self, index: StateIndex) -> bool;

    /// Downcasts to `&dyn Any` for type-specific operations.
    fn as_any(&self) -> &dyn Any;

    /// Downcasts to `&mut dyn Any` for type-specific operations.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: StateKey> LayerSlot for IndexConverter<E> {
    fn type_name(&self) -> &'static str {
        type_name::<E>()
    }

    fn label_of(&self, index: StateIndex) -> Option<String> {
        self.content_of(index).map(|content| format!("{:?}", content))
    }

    fn remove_index(&mut self, index: StateIndex) -> bool {
        IndexConverter::remove_index(self, index).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=== LayerTable ==========================================================

/// The enum layers attached to one machine, in attach order.
#[derive(Default)]
pub struct LayerTable {
    layers: Vec<(TypeId, Box<dyn LayerSlot>)>,
}

impl LayerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    //--- Attachment -------------------------------------------------------

    /// Attaches a converter for `E`. Returns false if `E` is already attached.
    pub fn attach<E: StateKey>(&mut self) -> bool {
        if self.has::<E>() {
            debug!("Layer {} already attached", type_name::<E>());
            return false;
        }

        debug!("Attaching layer {} at position {}", type_name::<E>(), self.layers.len());
        self.layers
            .push((TypeId::of::<E>(), Box::new(IndexConverter::<E>::new())));
        true
    }

    /// Returns true if `E` is attached.
    pub fn has<E: StateKey>(&self) -> bool {
        self.position::<E>().is_some()
    }

    //--- Typed Access -----------------------------------------------------

    /// Returns the converter for `E`, if attached.
    pub fn get<E: StateKey>(&self) -> Option<&IndexConverter<E>> {
        let position = self.position::<E>()?;
        self.layers[position]
            .1
            .as_any()
            .downcast_ref::<IndexConverter<E>>()
    }

    /// Returns the converter for `E` mutably, if attached.
    pub fn get_mut<E: StateKey>(&mut self) -> Option<&mut IndexConverter<E>> {
        let position = self.position::<E>()?;
        self.layers[position]
            .1
            .as_any_mut()
            .downcast_mut::<IndexConverter<E>>()
    }

    /// Returns the converter for `E`, attaching it first if needed.
    pub fn get_or_attach<E: StateKey>(&mut self) -> &mut IndexConverter<E> {
        let position = match self.position::<E>() {
            Some(position) => position,
            None => {
                self.attach::<E>();
                self.layers.len() - 1
            }
        };
        self.layers[position]
            .1
            .as_any_mut()
            .downcast_mut::<IndexConverter<E>>()
            .expect("Type mismatch in layer table")
    }

    /// Like `get`, but a missing layer is an error.
    pub fn require<E: StateKey>(&self) -> Result<&IndexConverter<E>> {
        self.get::<E>()
            .ok_or(StateMachineError::UnknownLayer(type_name::<E>()))
    }

    //--- Index Queries ----------------------------------------------------

    /// Debug label of the value behind `index`, from the first layer that maps it.
    pub fn label_of(&self, index: StateIndex) -> Option<String> {
        self.layers
            .iter()
            .find_map(|(_, layer)| layer.label_of(index))
    }

    /// Removes `index` from whichever layer maps it.
    pub fn remove_index(&mut self, index: StateIndex) -> bool {
        self.layers
            .iter_mut()
            .any(|(_, layer)| layer.remove_index(index))
    }

    /// Number of attached layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Type names of the attached layers, in attach order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|(_, layer)| layer.type_name()).collect()
    }

    //--- Internal Helpers -------------------------------------------------

    fn position<E: StateKey>(&self) -> Option<usize> {
        let type_id = TypeId::of::<E>();
        self.layers.iter().position(|(id, _)| *id == type_id)
    }
}

impl std::fmt::Debug for LayerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
