//! Handlebars registry for the Go source templates.
//!
//! Strict mode makes a slot without a binding an error, so a template and its
//! caller cannot drift apart silently. Escaping is off: the output is Go
//! source, not HTML.

use crate::error::GenerateError;
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::OnceLock;

const TEMPLATES: &[(&str, &str)] = &[
    ("model", include_str!("templates/model.go.tpl")),
    ("model_struct", include_str!("templates/model_struct.go.tpl")),
    ("controller", include_str!("templates/controller.go.tpl")),
    ("router", include_str!("templates/router.go.tpl")),
    ("namespace", include_str!("templates/namespace.go.tpl")),
    ("route_partial", include_str!("templates/route_partial.go.tpl")),
    ("rule_controller", include_str!("templates/rule_controller.go.tpl")),
    ("app_main", include_str!("templates/app_main.go.tpl")),
    ("app_conf", include_str!("templates/app.conf.tpl")),
    ("app_readme", include_str!("templates/app_readme.md.tpl")),
    ("rule", include_str!("templates/rule.yml.tpl")),
];

fn template_error(template: &str, err: impl std::fmt::Display) -> GenerateError {
    GenerateError::Template {
        template: template.to_string(),
        message: err.to_string(),
    }
}

pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Registry with every built-in template compiled.
    pub fn new() -> Result<Self, GenerateError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        for (name, text) in TEMPLATES {
            registry
                .register_template_string(name, *text)
                .map_err(|e| template_error(name, e))?;
        }
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, GenerateError> {
        self.registry
            .render(name, data)
            .map_err(|e| template_error(name, e))
    }

    /// Render ad-hoc template text with the registry's settings.
    pub fn render_text<T: Serialize>(&self, name: &str, text: &str, data: &T) -> Result<String, GenerateError> {
        self.registry
            .render_template(text, data)
            .map_err(|e| template_error(name, e))
    }
}

fn registry() -> Result<&'static Templates, GenerateError> {
    static REGISTRY: OnceLock<Result<Templates, String>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| Templates::new().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| template_error("registry", e))
}

/// Render one of the built-in templates.
pub fn render<T: Serialize>(name: &str, data: &T) -> Result<String, GenerateError> {
    registry()?.render(name, data)
}
