//! Recipient store and its inbound data sources.
//!
//! # Responsibility
//! - Own the page's entity/list snapshot and all `checked` mutations.
//! - Sequence the objects -> lists -> membership index load.
//!
//! # Invariants
//! - The store is an explicit instance owned by the page session.
//! - Change handlers run synchronously inside the mutating call.

mod entity_store;
mod handlers;
pub mod source;

pub use entity_store::{EntityStore, LoadError, LoadStage, LoadSummary, StoreError, StoreResult};
pub use handlers::{EventQueue, SelectionEvent, StoreHandlers};
