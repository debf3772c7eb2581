//! Finalization outcome.

use crate::model::type_name::TypeName;
use crate::output::ManifestSummary;
use std::path::PathBuf;

/// What happened to one registered module during emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionStatus {
    Written { bytes: usize },
    RenderFailed(String),
    WriteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    pub module: TypeName,
    pub location: PathBuf,
    pub status: EmissionStatus,
}

/// Summary of a finalized run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionReport {
    /// One outcome per registered module, in registration order.
    pub modules: Vec<ModuleOutcome>,
    /// Modules whose output could not be prepared during discovery.
    pub unprepared: Vec<TypeName>,
    pub manifest: ManifestSummary,
    pub ignored_events: usize,
}

impl EmissionReport {
    pub fn written_count(&self) -> usize {
        self.modules
            .iter()
            .filter(|outcome| matches!(outcome.status, EmissionStatus::Written { .. }))
            .count()
    }

    /// Render failures, write failures and unprepared modules.
    pub fn failure_count(&self) -> usize {
        self.modules.len() - self.written_count() + self.unprepared.len()
    }

    /// Every module was written and the manifest holds every line.
    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0 && self.manifest.complete
    }

    pub fn outcome(&self, module: &TypeName) -> Option<&ModuleOutcome> {
        self.modules.iter().find(|outcome| &outcome.module == module)
    }
}
