//! Per-module aggregation of discovered facts.
//!
//! # Responsibility
//! - Group bindings and submodules under the module that owns them.
//! - Collapse repeated reports of the same fact.
//!
//! # Invariants
//! - Entries are only ever inserted during discovery, never removed.
//! - Reads happen once per module, during emission.

pub mod tables;
