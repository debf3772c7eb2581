//! Single-owner engine.

use crate::aggregate::tables::AggregationTables;
use crate::config::EngineConfig;
use crate::engine::report::{EmissionReport, EmissionStatus, ModuleOutcome};
use crate::model::binding::BindingDeclaration;
use crate::model::event::DiscoveryEvent;
use crate::model::type_name::TypeName;
use crate::output::{
    FsOutputSink, ManifestWriter, OutputHandle, OutputRegistry, OutputSink,
    DEFAULT_MANIFEST_NAME,
};
use crate::render::{ModuleView, RenderResult, Renderer, TemplateRenderer};
use log::{debug, info, warn};
use std::io::Write;
use std::time::Instant;

/// Aggregates discovery events and emits modules on [`finalize`].
///
/// Finalizing consumes the engine, so no discovery call can follow it.
///
/// [`finalize`]: ModuleEngine::finalize
pub struct ModuleEngine<S: OutputSink, R: Renderer> {
    tables: AggregationTables,
    registry: OutputRegistry,
    manifest: ManifestWriter,
    sink: S,
    renderer: R,
    ignored_events: usize,
}

impl<S: OutputSink, R: Renderer> ModuleEngine<S, R> {
    /// Engine writing the manifest under its default name.
    pub fn new(sink: S, renderer: R) -> Self {
        Self::with_manifest_name(sink, renderer, TypeName::new("", DEFAULT_MANIFEST_NAME))
    }

    pub fn with_manifest_name(sink: S, renderer: R, manifest_name: TypeName) -> Self {
        Self {
            tables: AggregationTables::new(),
            registry: OutputRegistry::new(),
            manifest: ManifestWriter::new(manifest_name),
            sink,
            renderer,
            ignored_events: 0,
        }
    }

    /// Routes one discovery event by its kind.
    pub fn process(&mut self, event: DiscoveryEvent) {
        match event {
            DiscoveryEvent::Submodule { owner, child } => self.record_submodule(&owner, child),
            DiscoveryEvent::Binding {
                owner,
                implementer,
                implemented,
                scope,
                eager_singleton,
            } => {
                let binding =
                    BindingDeclaration::new(implementer, implemented, scope, eager_singleton);
                self.record_binding(&owner, binding);
            }
            DiscoveryEvent::Ignored => self.ignored_events += 1,
        }
    }

    pub fn record_submodule(&mut self, owner: &TypeName, child: TypeName) {
        self.ensure_registered(owner);
        if !self.tables.record_submodule(owner, child) {
            debug!("event=record_submodule module=engine status=skip owner={owner} reason=duplicate");
        }
    }

    pub fn record_binding(&mut self, owner: &TypeName, binding: BindingDeclaration) {
        self.ensure_registered(owner);
        if !self.tables.record_binding(owner, binding) {
            debug!("event=record_binding module=engine status=skip owner={owner} reason=duplicate");
        }
    }

    /// Prepares the output of `module` on first sight.
    ///
    /// Returns `None` when the output could not be prepared.
    pub fn ensure_registered(&mut self, module: &TypeName) -> Option<&OutputHandle> {
        self.registry
            .ensure_registered(module, &mut self.sink, &mut self.manifest)
            .handle()
    }

    pub fn tables(&self) -> &AggregationTables {
        &self.tables
    }

    pub fn registry(&self) -> &OutputRegistry {
        &self.registry
    }

    /// Renders and writes every registered module, then closes the manifest.
    pub fn finalize(self) -> EmissionReport {
        let started_at = Instant::now();
        let Self {
            tables,
            registry,
            mut manifest,
            mut sink,
            renderer,
            ignored_events,
        } = self;

        let mut modules = Vec::with_capacity(registry.len());
        for entry in registry.entries() {
            debug!("event=module_emit module=engine status=start type={}", entry.module);
            let view = ModuleView::new(
                &entry.module,
                tables.bindings_of(&entry.module),
                tables.submodules_of(&entry.module),
            );
            let status = emit_module(&mut sink, &renderer, &view, &entry.output);
            modules.push(ModuleOutcome {
                module: entry.module.clone(),
                location: entry.output.location().to_path_buf(),
                status,
            });
        }

        let manifest = manifest.close();
        let report = EmissionReport {
            modules,
            unprepared: registry.unprepared().cloned().collect(),
            manifest,
            ignored_events,
        };
        info!(
            "event=engine_finalize module=engine status={} modules={} written={} failed={} duration_ms={}",
            if report.is_complete() { "ok" } else { "degraded" },
            report.modules.len(),
            report.written_count(),
            report.failure_count(),
            started_at.elapsed().as_millis()
        );
        report
    }
}

impl ModuleEngine<FsOutputSink, TemplateRenderer> {
    /// Filesystem engine using the configured output root, extension,
    /// manifest name and template.
    pub fn from_config(config: &EngineConfig) -> RenderResult<Self> {
        let renderer = match &config.template {
            Some(path) => TemplateRenderer::from_file(path)?,
            None => TemplateRenderer::builtin()?,
        };
        let sink = FsOutputSink::new(&config.output_dir, config.source_extension.trim());
        let manifest_name = TypeName::new("", config.manifest_name.trim());
        Ok(Self::with_manifest_name(sink, renderer, manifest_name))
    }
}

fn emit_module<S: OutputSink + ?Sized, R: Renderer + ?Sized>(
    sink: &mut S,
    renderer: &R,
    view: &ModuleView<'_>,
    output: &OutputHandle,
) -> EmissionStatus {
    let text = match renderer.render(view) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                "event=module_emit module=engine status=error stage=render type={} error={}",
                view.qualified_name, err
            );
            return EmissionStatus::RenderFailed(err.to_string());
        }
    };

    let written = sink.open_writer(output).map_err(|err| err.to_string()).and_then(|mut writer| {
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|err| err.to_string())
    });
    match written {
        Ok(()) => {
            debug!(
                "event=module_emit module=engine status=ok type={} bytes={}",
                view.qualified_name,
                text.len()
            );
            EmissionStatus::Written { bytes: text.len() }
        }
        Err(err) => {
            warn!(
                "event=module_emit module=engine status=error stage=write type={} error={}",
                view.qualified_name, err
            );
            EmissionStatus::WriteFailed(err)
        }
    }
}
