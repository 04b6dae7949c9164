//=========================================================================
// Machine Configuration
//=========================================================================
//
// Construction-time settings and the fluent builder that applies them.
//
// Architecture:
// ```text
//     MachineBuilder ──build::<L>()──> StateMachine<L, O>
//         │          ──build_core()──> StateMachineCore<O>
//         ├─ with_capacity()
//         ├─ with_history_capacity()
//         ├─ with_max_chained_transitions()
//         └─ with_hooks()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::{LayerSet, MachineHooks, StateMachine, StateMachineCore};

//=== MachineConfig =======================================================

/// Tuning values for a state machine.
///
/// # Default Values
///
/// - **capacity**: 32 states preallocated in the registry
/// - **history_capacity**: 16 transitions kept (0 disables history)
/// - **max_chained_transitions**: 16 queued requests per dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Registry capacity reserved up front.
    pub capacity: usize,

    /// Number of recent transitions kept for diagnostics.
    pub history_capacity: usize,

    /// Upper bound on queued requests applied in one dispatch, counting
    /// requests made by the transitions they trigger.
    pub max_chained_transitions: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            history_capacity: 16,
            max_chained_transitions: 16,
        }
    }
}

//=== MachineBuilder ======================================================

/// Builder for configuring and constructing a state machine.
///
/// # Examples
///
/// Simple usage with defaults:
/// ```rust
/// use layered_state_machine::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Door { Open, Closed }
/// impl StateKey for Door {}
///
/// let machine: SingleLayerMachine<Door> = MachineBuilder::new().build();
/// assert!(!machine.is_active());
/// ```
///
/// Advanced configuration:
/// ```rust
/// # use layered_state_machine::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Door { Open, Closed }
/// # impl StateKey for Door {}
/// let machine: SingleLayerMachine<Door> = MachineBuilder::new()
///     .with_capacity(8)
///     .with_history_capacity(0)          // No diagnostics
///     .with_max_chained_transitions(4)
///     .build();
/// ```
pub struct MachineBuilder<O = ()> {
    config: MachineConfig,
    hooks: Option<Box<dyn MachineHooks<O>>>,
}

impl<O: 'static> MachineBuilder<O> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
            hooks: None,
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: MachineConfig) -> Self {
        Self {
            config,
            hooks: None,
        }
    }

    /// Sets how many states the registry reserves room for.
    ///
    /// Default: 32
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets how many recent transitions are kept. 0 disables history.
    ///
    /// Default: 16
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Sets how many queued requests one dispatch may apply.
    ///
    /// Default: 16
    ///
    /// # Panics
    ///
    /// Panics if `limit == 0`.
    pub fn with_max_chained_transitions(mut self, limit: usize) -> Self {
        assert!(limit > 0, "Transition chain limit must be positive");
        self.config.max_chained_transitions = limit;
        self
    }

    /// Installs machine-level callbacks.
    pub fn with_hooks<H>(mut self, hooks: H) -> Self
    where
        H: MachineHooks<O> + 'static,
    {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Returns the configuration built so far.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Builds the untyped engine.
    pub fn build_core(self) -> StateMachineCore<O> {
        debug!(
            "Building state machine (capacity: {}, history: {}, chain limit: {})",
            self.config.capacity, self.config.history_capacity, self.config.max_chained_transitions
        );
        StateMachineCore::with_parts(self.config, self.hooks)
    }

    /// Builds a typed machine whose layers are the enum types in `L`.
    pub fn build<L: LayerSet>(self) -> StateMachine<L, O> {
        StateMachine::from_core(self.build_core())
    }
}

impl<O: 'static> Default for MachineBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
