//! Two-phase generation engine.
//!
//! # Responsibility
//! - Ingest discovery events in any order, with any repetition.
//! - Emit one module output per registered module in a single final pass.
//!
//! # Invariants
//! - Discovery produces no module output; only registration side effects.
//! - Finalization happens once and is terminal.
//! - A failure for one module never stops another module's processing.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod module_engine;
mod report;
mod shared;

pub use module_engine::ModuleEngine;
pub use report::{EmissionReport, EmissionStatus, ModuleOutcome};
pub use shared::SharedModuleEngine;

pub type EngineResult<T> = Result<T, EngineError>;

/// Protocol misuse of a shared engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A discovery or finalize call arrived after finalization began.
    AlreadyFinalized,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyFinalized => write!(f, "engine already finalized"),
        }
    }
}

impl Error for EngineError {}
