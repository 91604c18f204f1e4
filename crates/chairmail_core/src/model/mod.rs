//! Recipient domain model for the compose screen.
//!
//! # Responsibility
//! - Define the primary recipient entity (user or submission) and mailing
//!   lists grouping those entities.
//! - Decode the objects/lists endpoint payloads into typed records.
//!
//! # Invariants
//! - Entity ids compare by their string form regardless of wire encoding.
//! - One page only ever carries one entity kind.

pub mod entity;
pub mod mailing_list;
pub mod payload;
