//! In-memory recipient search.
//!
//! # Responsibility
//! - Filter entity/list snapshots by multi-token substring queries.
//! - Report match spans and merge them into highlight regions.
//!
//! # Invariants
//! - Search never touches the network; it only reads store snapshots.
//! - Results keep collection order; there is no relevance scoring.

pub mod engine;
pub mod highlight;
