//! Value model shared by aggregation, registry and emission.
//!
//! # Responsibility
//! - Define the identity type used as module key and payload value.
//! - Define immutable binding facts and the closed set of discovery events.
//!
//! # Invariants
//! - Every value compares by content, never by identity.
//! - Ordering is total and derived from qualified names, so set iteration
//!   is deterministic across runs.

pub mod binding;
pub mod event;
pub mod type_name;
