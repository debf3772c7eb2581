//! Output registry: the single idempotency gate per module.

use crate::model::type_name::TypeName;
use crate::output::manifest::ManifestWriter;
use crate::output::sink::{OutputHandle, OutputKind, OutputSink};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

/// Prepared output of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub module: TypeName,
    pub output: OutputHandle,
}

/// Result of [`OutputRegistry::ensure_registered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration<'a> {
    /// First sighting; the output was prepared just now.
    New(&'a OutputHandle),
    /// Already registered; the existing handle is returned unchanged.
    Existing(&'a OutputHandle),
    /// Preparation failed earlier for this module; it is not retried.
    Unprepared,
}

impl<'a> Registration<'a> {
    pub fn handle(&self) -> Option<&'a OutputHandle> {
        match self {
            Self::New(handle) | Self::Existing(handle) => Some(handle),
            Self::Unprepared => None,
        }
    }
}

/// Registry of prepared module outputs in creation order.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<TypeName, usize>,
    unprepared: BTreeSet<TypeName>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` on first sight and returns its output handle.
    ///
    /// On first sight the output is prepared through `sink` and the module is
    /// appended to `manifest`. A preparation failure is logged, remembered,
    /// and leaves the module out of both the registry and the manifest.
    /// Manifest failures never affect registration.
    pub fn ensure_registered<S: OutputSink + ?Sized>(
        &mut self,
        module: &TypeName,
        sink: &mut S,
        manifest: &mut ManifestWriter,
    ) -> Registration<'_> {
        if let Some(&position) = self.index.get(module) {
            return Registration::Existing(&self.entries[position].output);
        }
        if self.unprepared.contains(module) {
            return Registration::Unprepared;
        }

        let output = match sink.prepare_output(module, OutputKind::Module) {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    "event=output_prepare module=output status=error type={} error={}",
                    module, err
                );
                self.unprepared.insert(module.clone());
                return Registration::Unprepared;
            }
        };
        debug!(
            "event=output_prepare module=output status=ok type={} location={}",
            module,
            output.location().display()
        );

        manifest.append(module, sink);

        let position = self.entries.len();
        self.index.insert(module.clone(), position);
        self.entries.push(RegistryEntry {
            module: module.clone(),
            output,
        });
        Registration::New(&self.entries[position].output)
    }

    pub fn get(&self, module: &TypeName) -> Option<&OutputHandle> {
        self.index
            .get(module)
            .map(|&position| &self.entries[position].output)
    }

    /// Entries in first-registration order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Modules whose output could not be prepared, sorted.
    pub fn unprepared(&self) -> impl Iterator<Item = &TypeName> {
        self.unprepared.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputRegistry, Registration};
    use crate::model::type_name::TypeName;
    use crate::output::manifest::{ManifestWriter, DEFAULT_MANIFEST_NAME};
    use crate::output::sink::{MemoryOutputSink, OutputHandle, OutputKind, OutputSink};
    use crate::output::{SinkError, SinkResult};
    use std::io::Write;

    struct RejectingSink {
        inner: MemoryOutputSink,
        rejected: TypeName,
        prepare_calls: usize,
    }

    impl OutputSink for RejectingSink {
        fn prepare_output(&mut self, name: &TypeName, kind: OutputKind) -> SinkResult<OutputHandle> {
            self.prepare_calls += 1;
            if name == &self.rejected {
                return Err(SinkError::Prepare {
                    location: name.qualified_name().into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.prepare_output(name, kind)
        }

        fn open_writer(&mut self, handle: &OutputHandle) -> SinkResult<Box<dyn Write + Send>> {
            self.inner.open_writer(handle)
        }
    }

    fn manifest() -> ManifestWriter {
        ManifestWriter::new(TypeName::new("", DEFAULT_MANIFEST_NAME))
    }

    #[test]
    fn repeated_registration_yields_one_handle_and_one_line() {
        let mut sink = MemoryOutputSink::default();
        let mut manifest = manifest();
        let mut registry = OutputRegistry::new();
        let module = TypeName::from("com.acme.gin.RestModule");

        let first = registry
            .ensure_registered(&module, &mut sink, &mut manifest)
            .handle()
            .cloned();
        for _ in 0..4 {
            let again = registry.ensure_registered(&module, &mut sink, &mut manifest);
            assert!(matches!(again, Registration::Existing(_)));
            assert_eq!(again.handle(), first.as_ref());
        }
        manifest.close();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            sink.contents("META-INF/gwtp/ginModules").as_deref(),
            Some("com.acme.gin.RestModule\n")
        );
    }

    #[test]
    fn entries_keep_first_registration_order() {
        let mut sink = MemoryOutputSink::default();
        let mut manifest = manifest();
        let mut registry = OutputRegistry::new();

        for name in ["com.acme.Zeta", "com.acme.Alpha", "com.acme.Zeta", "com.acme.Mid"] {
            registry.ensure_registered(&TypeName::from(name), &mut sink, &mut manifest);
        }

        let order: Vec<_> = registry
            .entries()
            .iter()
            .map(|entry| entry.module.qualified_name())
            .collect();
        assert_eq!(order, vec!["com.acme.Zeta", "com.acme.Alpha", "com.acme.Mid"]);
    }

    #[test]
    fn failed_preparation_is_isolated_and_not_retried() {
        let rejected = TypeName::from("com.acme.Broken");
        let mut sink = RejectingSink {
            inner: MemoryOutputSink::default(),
            rejected: rejected.clone(),
            prepare_calls: 0,
        };
        let mut manifest = manifest();
        let mut registry = OutputRegistry::new();

        assert_eq!(
            registry.ensure_registered(&rejected, &mut sink, &mut manifest),
            Registration::Unprepared
        );
        let healthy = TypeName::from("com.acme.Healthy");
        assert!(matches!(
            registry.ensure_registered(&healthy, &mut sink, &mut manifest),
            Registration::New(_)
        ));
        let calls_before_retry = sink.prepare_calls;
        assert_eq!(
            registry.ensure_registered(&rejected, &mut sink, &mut manifest),
            Registration::Unprepared
        );
        assert_eq!(sink.prepare_calls, calls_before_retry);
        manifest.close();

        assert!(registry.get(&rejected).is_none());
        assert!(registry.get(&healthy).is_some());
        assert_eq!(registry.unprepared().collect::<Vec<_>>(), vec![&rejected]);
        assert_eq!(
            sink.inner.contents("META-INF/gwtp/ginModules").as_deref(),
            Some("com.acme.Healthy\n")
        );
    }
}
