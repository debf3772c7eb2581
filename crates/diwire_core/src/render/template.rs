//! Tera-backed module renderer.

use crate::render::{ModuleView, RenderError, RenderResult, Renderer};
use std::path::Path;
use tera::{Context, Tera};

/// Name under which the module template is registered.
pub const BUILTIN_TEMPLATE_NAME: &str = "gin_module.java";

const TPL_GIN_MODULE: &str = include_str!("templates/gin_module.java.tera");

/// Renders modules through one registered Tera template.
#[derive(Debug)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Renderer using the embedded GIN module template.
    pub fn builtin() -> RenderResult<Self> {
        Self::from_source(TPL_GIN_MODULE)
    }

    /// Renderer using caller-provided template text.
    pub fn from_source(source: &str) -> RenderResult<Self> {
        let mut tera = Tera::default();
        // Generated sources are not markup.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(BUILTIN_TEMPLATE_NAME, source)
            .map_err(RenderError::InvalidTemplate)?;
        Ok(Self { tera })
    }

    /// Renderer using a template file.
    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|source| RenderError::TemplateSource {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_source(&source)
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, module: &ModuleView<'_>) -> RenderResult<String> {
        let context = Context::from_serialize(module).map_err(|source| RenderError::Render {
            module: module.qualified_name.to_string(),
            source,
        })?;
        self.tera
            .render(BUILTIN_TEMPLATE_NAME, &context)
            .map_err(|source| RenderError::Render {
                module: module.qualified_name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::TemplateRenderer;
    use crate::model::binding::BindingDeclaration;
    use crate::model::type_name::TypeName;
    use crate::render::{ModuleView, RenderError, Renderer};
    use std::collections::BTreeSet;

    #[test]
    fn renders_submodules_and_every_binding_shape() {
        let module = TypeName::from("com.acme.client.gin.ClientModule");
        let submodules: BTreeSet<_> = [TypeName::from("com.acme.client.rest.RestModule")]
            .into_iter()
            .collect();
        let bindings: BTreeSet<_> = [
            BindingDeclaration::new(
                TypeName::from("com.acme.client.RatingServiceImpl"),
                Some(TypeName::from("com.acme.client.RatingService")),
                Some(TypeName::from("javax.inject.Singleton")),
                false,
            ),
            BindingDeclaration::new(TypeName::from("com.acme.client.Bootstrapper"), None, None, true),
            BindingDeclaration::concrete(TypeName::from("com.acme.client.Clock")),
        ]
        .into_iter()
        .collect();

        let renderer = TemplateRenderer::builtin().unwrap();
        let text = renderer
            .render(&ModuleView::new(&module, &bindings, &submodules))
            .unwrap();

        let expected = "package com.acme.client.gin;

import com.google.gwt.inject.client.AbstractGinModule;

public class ClientModule extends AbstractGinModule {
    @Override
    protected void configure() {
        install(new com.acme.client.rest.RestModule());
        bind(com.acme.client.Bootstrapper.class).asEagerSingleton();
        bind(com.acme.client.Clock.class);
        bind(com.acme.client.RatingService.class).to(com.acme.client.RatingServiceImpl.class).in(javax.inject.Singleton.class);
    }
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let module = TypeName::from("com.acme.Module");
        let bindings: BTreeSet<_> = ["com.acme.B", "com.acme.A", "com.acme.C"]
            .into_iter()
            .map(|name| BindingDeclaration::concrete(TypeName::from(name)))
            .collect();
        let submodules = BTreeSet::new();
        let renderer = TemplateRenderer::builtin().unwrap();

        let first = renderer
            .render(&ModuleView::new(&module, &bindings, &submodules))
            .unwrap();
        let second = renderer
            .render(&ModuleView::new(&module, &bindings, &submodules))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn custom_template_sees_module_fields() {
        let renderer =
            TemplateRenderer::from_source("{{ qualified_name }}:{{ bindings | length }}").unwrap();
        let module = TypeName::from("com.acme.Module");
        let bindings: BTreeSet<_> = [BindingDeclaration::concrete(TypeName::from("com.acme.A"))]
            .into_iter()
            .collect();
        let submodules = BTreeSet::new();

        let text = renderer
            .render(&ModuleView::new(&module, &bindings, &submodules))
            .unwrap();
        assert_eq!(text, "com.acme.Module:1");
    }

    #[test]
    fn rejects_unparsable_template() {
        let err = TemplateRenderer::from_source("{% for %}").unwrap_err();
        assert!(matches!(err, RenderError::InvalidTemplate(_)));
    }

    #[test]
    fn missing_template_file_is_reported() {
        let err = TemplateRenderer::from_file("/nonexistent/diwire/module.tera").unwrap_err();
        assert!(matches!(err, RenderError::TemplateSource { .. }));
    }
}
