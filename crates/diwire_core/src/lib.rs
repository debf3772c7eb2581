//! Build-time aggregation and emission of dependency-injection modules.
//!
//! Discovery events are grouped per module while a compilation is scanned;
//! once discovery is complete every module is rendered exactly once and a
//! manifest lists all generated modules for runtime lookup.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod output;
pub mod render;

pub use aggregate::tables::AggregationTables;
pub use config::{ConfigError, EngineConfig};
pub use engine::{
    EmissionReport, EmissionStatus, EngineError, EngineResult, ModuleEngine, ModuleOutcome,
    SharedModuleEngine,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::binding::BindingDeclaration;
pub use model::event::{parse_event_lines, DiscoveryEvent, EventBatch};
pub use model::type_name::TypeName;
pub use output::{
    FsOutputSink, ManifestSummary, MemoryOutputSink, OutputHandle, OutputKind, OutputRegistry,
    OutputSink, SinkError,
};
pub use render::{ModuleView, RenderError, Renderer, TemplateRenderer};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
