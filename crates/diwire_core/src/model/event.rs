//! Discovery events and their JSON-lines wire form.
//!
//! # Responsibility
//! - Model the closed set of facts an upstream scanner can report.
//! - Decode an event stream without letting one bad line abort the batch.
//!
//! # Invariants
//! - Events carry no ordering guarantee and may repeat.
//! - A malformed line is reported and skipped, never fatal.

use crate::model::binding::BindingDeclaration;
use crate::model::type_name::TypeName;
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One fact reported during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoveryEvent {
    /// `owner` installs `child` as a submodule.
    Submodule { owner: TypeName, child: TypeName },
    /// `owner` binds `implementer`, optionally to an interface and scope.
    Binding {
        owner: TypeName,
        implementer: TypeName,
        #[serde(default)]
        implemented: Option<TypeName>,
        #[serde(default)]
        scope: Option<TypeName>,
        #[serde(default)]
        eager_singleton: bool,
    },
    /// A context that yields neither a submodule nor a binding.
    Ignored,
}

impl DiscoveryEvent {
    pub fn submodule(owner: impl Into<TypeName>, child: impl Into<TypeName>) -> Self {
        Self::Submodule {
            owner: owner.into(),
            child: child.into(),
        }
    }

    pub fn binding(owner: impl Into<TypeName>, binding: BindingDeclaration) -> Self {
        Self::Binding {
            owner: owner.into(),
            implementer: binding.implementer,
            implemented: binding.implemented,
            scope: binding.scope,
            eager_singleton: binding.eager_singleton,
        }
    }

    /// Module this event belongs to, if any.
    pub fn owner(&self) -> Option<&TypeName> {
        match self {
            Self::Submodule { owner, .. } | Self::Binding { owner, .. } => Some(owner),
            Self::Ignored => None,
        }
    }
}

/// Decoded event stream plus the number of lines that could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBatch {
    pub events: Vec<DiscoveryEvent>,
    pub malformed_lines: usize,
}

/// Decodes JSON-lines discovery events.
///
/// Blank lines and lines starting with `#` are skipped. Lines that fail to
/// decode are logged with their 1-based line number and counted.
///
/// # Errors
/// - Returns an error only when the underlying reader fails.
pub fn parse_event_lines(reader: impl BufRead) -> std::io::Result<EventBatch> {
    let mut batch = EventBatch::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match serde_json::from_str::<DiscoveryEvent>(trimmed) {
            Ok(event) => batch.events.push(event),
            Err(err) => {
                warn!(
                    "event=event_decode module=model status=skip line={} error={}",
                    index + 1,
                    err
                );
                batch.malformed_lines += 1;
            }
        }
    }
    Ok(batch)
}
