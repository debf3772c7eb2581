//! Engine shared across ingestion threads.

use crate::engine::module_engine::ModuleEngine;
use crate::engine::report::EmissionReport;
use crate::engine::{EngineError, EngineResult};
use crate::model::binding::BindingDeclaration;
use crate::model::event::DiscoveryEvent;
use crate::model::type_name::TypeName;
use crate::output::OutputSink;
use crate::render::Renderer;
use log::warn;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Serializes every discovery call through one lock.
///
/// After [`finalize`](SharedModuleEngine::finalize) the inner engine is gone
/// and every further call returns [`EngineError::AlreadyFinalized`].
pub struct SharedModuleEngine<S: OutputSink, R: Renderer> {
    inner: Mutex<Option<ModuleEngine<S, R>>>,
}

impl<S: OutputSink, R: Renderer> SharedModuleEngine<S, R> {
    pub fn new(engine: ModuleEngine<S, R>) -> Self {
        Self {
            inner: Mutex::new(Some(engine)),
        }
    }

    pub fn process(&self, event: DiscoveryEvent) -> EngineResult<()> {
        self.with_engine("process", |engine| engine.process(event))
    }

    pub fn record_submodule(&self, owner: &TypeName, child: TypeName) -> EngineResult<()> {
        self.with_engine("record_submodule", |engine| {
            engine.record_submodule(owner, child)
        })
    }

    pub fn record_binding(&self, owner: &TypeName, binding: BindingDeclaration) -> EngineResult<()> {
        self.with_engine("record_binding", |engine| {
            engine.record_binding(owner, binding)
        })
    }

    /// Leaves the discovery phase and emits every module.
    ///
    /// Waits for in-flight discovery calls, so the manifest is closed only
    /// after every registration completed.
    pub fn finalize(&self) -> EngineResult<EmissionReport> {
        let engine = self.lock().take().ok_or_else(|| {
            warn!("event=engine_finalize module=engine status=error reason=already_finalized");
            EngineError::AlreadyFinalized
        })?;
        Ok(engine.finalize())
    }

    pub fn is_finalized(&self) -> bool {
        self.lock().is_none()
    }

    fn with_engine<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut ModuleEngine<S, R>) -> T,
    ) -> EngineResult<T> {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(engine) => Ok(f(engine)),
            None => {
                warn!(
                    "event={operation} module=engine status=error reason=already_finalized"
                );
                Err(EngineError::AlreadyFinalized)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ModuleEngine<S, R>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::SharedModuleEngine;
    use crate::engine::{EngineError, ModuleEngine};
    use crate::model::event::DiscoveryEvent;
    use crate::model::type_name::TypeName;
    use crate::output::MemoryOutputSink;
    use crate::render::TemplateRenderer;

    fn shared_engine(sink: &MemoryOutputSink) -> SharedModuleEngine<MemoryOutputSink, TemplateRenderer> {
        SharedModuleEngine::new(ModuleEngine::new(
            sink.clone(),
            TemplateRenderer::builtin().unwrap(),
        ))
    }

    #[test]
    fn rejects_discovery_after_finalize() {
        let sink = MemoryOutputSink::default();
        let engine = shared_engine(&sink);
        engine
            .process(DiscoveryEvent::submodule("com.acme.M", "com.acme.S"))
            .unwrap();
        engine.finalize().unwrap();
        assert!(engine.is_finalized());

        let err = engine
            .process(DiscoveryEvent::submodule("com.acme.M", "com.acme.T"))
            .unwrap_err();
        assert_eq!(err, EngineError::AlreadyFinalized);
        let err = engine
            .record_submodule(&TypeName::from("com.acme.N"), TypeName::from("com.acme.S"))
            .unwrap_err();
        assert_eq!(err, EngineError::AlreadyFinalized);
        assert_eq!(engine.finalize().unwrap_err(), EngineError::AlreadyFinalized);

        assert!(sink.contents("com/acme/N.java").is_none());
    }

    #[test]
    fn concurrent_ingestion_registers_each_module_once() {
        let sink = MemoryOutputSink::default();
        let engine = shared_engine(&sink);

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let engine = &engine;
                scope.spawn(move || {
                    for round in 0..25 {
                        let owner = format!("com.acme.gin.Module{}", round % 5);
                        let child = format!("com.acme.gin.Child{}", (round + worker) % 3);
                        engine
                            .process(DiscoveryEvent::submodule(owner, child))
                            .unwrap();
                    }
                });
            }
        });

        let report = engine.finalize().unwrap();
        assert_eq!(report.modules.len(), 5);
        assert_eq!(report.written_count(), 5);

        let manifest = sink.contents("META-INF/gwtp/ginModules").unwrap();
        let mut lines: Vec<_> = manifest.lines().collect();
        assert_eq!(lines.len(), 5);
        lines.sort_unstable();
        lines.dedup();
        assert_eq!(lines.len(), 5);
    }
}
