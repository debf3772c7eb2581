//! Module source rendering.
//!
//! # Responsibility
//! - Turn one module's aggregated bindings and submodules into source text.
//!
//! # Invariants
//! - Identical input sets always render identical text.
//! - Rendering has no side effects; writing is the engine's job.

use crate::model::binding::BindingDeclaration;
use crate::model::type_name::TypeName;
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod template;

pub use template::{TemplateRenderer, BUILTIN_TEMPLATE_NAME};

pub type RenderResult<T> = Result<T, RenderError>;

/// Renderer input for one module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleView<'a> {
    pub package: &'a str,
    pub name: &'a str,
    pub qualified_name: &'a str,
    pub bindings: &'a BTreeSet<BindingDeclaration>,
    pub submodules: &'a BTreeSet<TypeName>,
}

impl<'a> ModuleView<'a> {
    pub fn new(
        module: &'a TypeName,
        bindings: &'a BTreeSet<BindingDeclaration>,
        submodules: &'a BTreeSet<TypeName>,
    ) -> Self {
        Self {
            package: module.package(),
            name: module.simple_name(),
            qualified_name: module.qualified_name(),
            bindings,
            submodules,
        }
    }
}

/// Produces module source text from a [`ModuleView`].
pub trait Renderer {
    fn render(&self, module: &ModuleView<'_>) -> RenderResult<String>;
}

#[derive(Debug)]
pub enum RenderError {
    /// A custom template file could not be read.
    TemplateSource {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The template does not parse.
    InvalidTemplate(tera::Error),
    /// Rendering one module failed.
    Render {
        module: String,
        source: tera::Error,
    },
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TemplateSource { path, source } => {
                write!(f, "failed to read template `{}`: {source}", path.display())
            }
            Self::InvalidTemplate(err) => write!(f, "invalid module template: {err}"),
            Self::Render { module, source } => {
                write!(f, "failed to render module `{module}`: {source}")
            }
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TemplateSource { source, .. } => Some(source),
            Self::InvalidTemplate(err) => Some(err),
            Self::Render { source, .. } => Some(source),
        }
    }
}
