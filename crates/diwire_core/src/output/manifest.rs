//! Lazily opened, append-only module manifest.
//!
//! # Invariants
//! - The stream is opened at most once per run, on the first append.
//! - A failed open is not retried; later lines are dropped and counted.
//! - Every line is written and flushed on its own, so a failing line is the
//!   one reported and counted as dropped.
//! - `close` releases the stream exactly once, whatever failed before it.

use crate::model::type_name::TypeName;
use crate::output::sink::{OutputKind, OutputSink};
use log::{error, info, warn};
use std::io::Write;

/// Resource directory that holds the manifest.
pub const MANIFEST_DIR: &str = "META-INF";
/// Default manifest identity, resolved to `META-INF/gwtp/ginModules`.
pub const DEFAULT_MANIFEST_NAME: &str = "gwtp/ginModules";

enum ManifestState {
    Unopened,
    Open(Box<dyn Write + Send>),
    Unavailable,
    Closed,
}

/// Outcome of a manifest stream once it is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestSummary {
    pub opened: bool,
    pub lines_written: usize,
    pub lines_dropped: usize,
    /// Flush and close succeeded and no line was dropped.
    pub complete: bool,
}

/// One-line-per-module manifest stream shared across a run.
pub struct ManifestWriter {
    name: TypeName,
    state: ManifestState,
    lines_written: usize,
    lines_dropped: usize,
    opened: bool,
    close_failed: bool,
}

impl ManifestWriter {
    pub fn new(name: TypeName) -> Self {
        Self {
            name,
            state: ManifestState::Unopened,
            lines_written: 0,
            lines_dropped: 0,
            opened: false,
            close_failed: false,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ManifestState::Open(_))
    }

    /// Appends the qualified name of `module` as one line.
    ///
    /// Opens the stream through `sink` on first use. Returns whether the line
    /// was written; failures are logged and never propagated.
    pub fn append<S: OutputSink + ?Sized>(&mut self, module: &TypeName, sink: &mut S) -> bool {
        if matches!(self.state, ManifestState::Unopened) {
            self.state = self.open(sink);
            self.opened = self.is_open();
        }

        let ManifestState::Open(writer) = &mut self.state else {
            self.lines_dropped += 1;
            warn!(
                "event=manifest_append module=output status=skip manifest={} entry={} reason=stream_unavailable",
                self.name, module
            );
            return false;
        };

        let line = format!("{}\n", module.qualified_name());
        match writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
        {
            Ok(()) => {
                self.lines_written += 1;
                true
            }
            Err(err) => {
                self.lines_dropped += 1;
                warn!(
                    "event=manifest_append module=output status=error manifest={} entry={} error={}",
                    self.name, module, err
                );
                false
            }
        }
    }

    /// Flushes and releases the stream. Calling it again is a no-op.
    pub fn close(&mut self) -> ManifestSummary {
        let previous = std::mem::replace(&mut self.state, ManifestState::Closed);
        if let ManifestState::Open(mut writer) = previous {
            match writer.flush() {
                Ok(()) => info!(
                    "event=manifest_close module=output status=ok manifest={} lines={}",
                    self.name, self.lines_written
                ),
                Err(err) => {
                    self.close_failed = true;
                    error!(
                        "event=manifest_close module=output status=error manifest={} error={}",
                        self.name, err
                    );
                }
            }
        }

        ManifestSummary {
            opened: self.opened,
            lines_written: self.lines_written,
            lines_dropped: self.lines_dropped,
            complete: !self.close_failed && self.lines_dropped == 0,
        }
    }

    fn open<S: OutputSink + ?Sized>(&self, sink: &mut S) -> ManifestState {
        let opened = sink
            .prepare_output(&self.name, OutputKind::Manifest)
            .and_then(|handle| sink.open_writer(&handle));
        match opened {
            Ok(writer) => ManifestState::Open(writer),
            Err(err) => {
                error!(
                    "event=manifest_open module=output status=error manifest={} error={}",
                    self.name, err
                );
                ManifestState::Unavailable
            }
        }
    }
}

impl std::fmt::Debug for ManifestWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            ManifestState::Unopened => "unopened",
            ManifestState::Open(_) => "open",
            ManifestState::Unavailable => "unavailable",
            ManifestState::Closed => "closed",
        };
        f.debug_struct("ManifestWriter")
            .field("name", &self.name)
            .field("state", &state)
            .field("lines_written", &self.lines_written)
            .field("lines_dropped", &self.lines_dropped)
            .finish()
    }
}
