//! Output sinks for generated modules and the manifest.

use crate::model::type_name::TypeName;
use crate::output::manifest::MANIFEST_DIR;
use crate::output::{SinkError, SinkResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What a prepared output will hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Generated module source.
    Module,
    /// Module manifest resource.
    Manifest,
}

/// Opaque reference to a prepared output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputHandle {
    kind: OutputKind,
    location: PathBuf,
}

impl OutputHandle {
    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    /// Location relative to the sink root.
    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// Storage that hands out output placeholders and writers.
pub trait OutputSink {
    fn prepare_output(&mut self, name: &TypeName, kind: OutputKind) -> SinkResult<OutputHandle>;
    fn open_writer(&mut self, handle: &OutputHandle) -> SinkResult<Box<dyn Write + Send>>;
}

/// Derives the sink-relative location of an output.
///
/// - `Module`: package segments as directories, then `<SimpleName>.<extension>`.
/// - `Manifest`: `META-INF/<qualified name>`.
///
/// Locations never leave the sink root: separators, `.`/`..` segments and
/// empty segments in a module name are rejected.
pub fn output_location(name: &TypeName, kind: OutputKind, extension: &str) -> SinkResult<PathBuf> {
    let qualified = name.qualified_name();
    let invalid = || SinkError::InvalidLocation(qualified.to_string());
    if qualified.trim().is_empty() || name.simple_name().is_empty() {
        return Err(invalid());
    }

    let location = match kind {
        OutputKind::Module => {
            let mut path = PathBuf::new();
            if !name.package().is_empty() {
                for segment in name.package().split('.') {
                    if !is_plain_segment(segment) {
                        return Err(invalid());
                    }
                    path.push(segment);
                }
            }
            if !is_plain_segment(name.simple_name()) {
                return Err(invalid());
            }
            path.push(format!("{}.{}", name.simple_name(), extension));
            path
        }
        OutputKind::Manifest => {
            let relative = Path::new(qualified);
            let escapes = relative.is_absolute()
                || qualified.starts_with(['/', '\\'])
                || qualified.split(['/', '\\']).any(|segment| segment == "..");
            if escapes {
                return Err(invalid());
            }
            Path::new(MANIFEST_DIR).join(relative)
        }
    };
    Ok(location)
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != ".."
        && !segment.contains(['/', '\\', ':'])
        && !Path::new(segment).is_absolute()
}

/// Filesystem sink rooted at one output directory.
#[derive(Debug, Clone)]
pub struct FsOutputSink {
    root: PathBuf,
    extension: String,
}

impl FsOutputSink {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }
}

impl OutputSink for FsOutputSink {
    /// Creates the parent directories of the output.
    fn prepare_output(&mut self, name: &TypeName, kind: OutputKind) -> SinkResult<OutputHandle> {
        let location = output_location(name, kind, &self.extension)?;
        let absolute = self.root.join(&location);
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Prepare {
                location: location.clone(),
                source,
            })?;
        }
        Ok(OutputHandle { kind, location })
    }

    fn open_writer(&mut self, handle: &OutputHandle) -> SinkResult<Box<dyn Write + Send>> {
        let file = File::create(self.root.join(&handle.location)).map_err(|source| {
            SinkError::Open {
                location: handle.location.clone(),
                source,
            }
        })?;
        Ok(Box::new(file))
    }
}

type SharedFiles = Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>;

/// In-memory sink; clones share the same storage.
#[derive(Debug, Clone)]
pub struct MemoryOutputSink {
    files: SharedFiles,
    extension: String,
}

impl MemoryOutputSink {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            files: SharedFiles::default(),
            extension: extension.into(),
        }
    }

    /// Prepared locations, sorted.
    pub fn locations(&self) -> Vec<PathBuf> {
        lock_files(&self.files).keys().cloned().collect()
    }

    /// UTF-8 contents written to `location`, if it was prepared.
    pub fn contents(&self, location: impl AsRef<Path>) -> Option<String> {
        lock_files(&self.files)
            .get(location.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Default for MemoryOutputSink {
    fn default() -> Self {
        Self::new("java")
    }
}

impl OutputSink for MemoryOutputSink {
    fn prepare_output(&mut self, name: &TypeName, kind: OutputKind) -> SinkResult<OutputHandle> {
        let location = output_location(name, kind, &self.extension)?;
        lock_files(&self.files).entry(location.clone()).or_default();
        Ok(OutputHandle { kind, location })
    }

    /// Truncates the output, like creating a file.
    fn open_writer(&mut self, handle: &OutputHandle) -> SinkResult<Box<dyn Write + Send>> {
        lock_files(&self.files).insert(handle.location.clone(), Vec::new());
        Ok(Box::new(MemoryWriter {
            files: Arc::clone(&self.files),
            location: handle.location.clone(),
        }))
    }
}

struct MemoryWriter {
    files: SharedFiles,
    location: PathBuf,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        lock_files(&self.files)
            .entry(self.location.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn lock_files(files: &SharedFiles) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
    files.lock().unwrap_or_else(PoisonError::into_inner)
}
