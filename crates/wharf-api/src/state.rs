//! # Application State
//!
//! The store handle and wired services shared by all route handlers.

use std::sync::Arc;

use wharf_rules::default_rule_set;
use wharf_service::{EventSink, Services, TracingEventSink};
use wharf_store::{MemoryStore, WarehouseStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The transactional store (reads go straight here).
    pub store: Arc<dyn WarehouseStore>,
    /// The wired service bundle (all mutations go through it).
    pub services: Services,
}

impl AppState {
    /// Build state over an explicit store and event sink, with the
    /// default rule set.
    pub fn new(store: Arc<dyn WarehouseStore>, events: Arc<dyn EventSink>) -> Self {
        let services = Services::new(store.clone(), default_rule_set(), events);
        Self { store, services }
    }

    /// In-memory state for development and tests: `MemoryStore`, default
    /// rules, events logged through tracing.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(TracingEventSink))
    }
}
