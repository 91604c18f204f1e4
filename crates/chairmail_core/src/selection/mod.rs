//! Selection projection: from store flags to what the page shows.
//!
//! # Responsibility
//! - Mirror explicit selections into comma-joined form values.
//! - Refresh recipient-dependent views after every store change.
//! - Drive the entity/list picker dialogs.
//!
//! # Invariants
//! - The effective recipient set is always read from the store.

pub mod area;
pub mod picker;
pub mod projector;
pub mod values_input;
