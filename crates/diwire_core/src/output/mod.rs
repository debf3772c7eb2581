//! Output preparation, registration and manifest bookkeeping.
//!
//! # Responsibility
//! - Abstract the storage that receives generated modules and the manifest.
//! - Guarantee one prepared output and one manifest line per module.
//!
//! # Invariants
//! - At most one registry entry exists per distinct module type.
//! - Manifest lines follow first-registration order and are never re-sorted.
//! - Sink failures are reported and never abort sibling modules.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod manifest;
pub mod registry;
pub mod sink;

pub use manifest::{ManifestSummary, ManifestWriter, DEFAULT_MANIFEST_NAME, MANIFEST_DIR};
pub use registry::{OutputRegistry, Registration, RegistryEntry};
pub use sink::{FsOutputSink, MemoryOutputSink, OutputHandle, OutputKind, OutputSink};

pub type SinkResult<T> = Result<T, SinkError>;

/// Storage-level failure for one output.
#[derive(Debug)]
pub enum SinkError {
    /// The output location could not be derived from the type name.
    InvalidLocation(String),
    /// The output placeholder could not be prepared.
    Prepare {
        location: PathBuf,
        source: std::io::Error,
    },
    /// A writer could not be opened for a prepared output.
    Open {
        location: PathBuf,
        source: std::io::Error,
    },
}

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLocation(value) => write!(f, "cannot derive output location for `{value}`"),
            Self::Prepare { location, source } => {
                write!(f, "failed to prepare `{}`: {source}", location.display())
            }
            Self::Open { location, source } => {
                write!(f, "failed to open `{}`: {source}", location.display())
            }
        }
    }
}

impl Error for SinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLocation(_) => None,
            Self::Prepare { source, .. } | Self::Open { source, .. } => Some(source),
        }
    }
}
