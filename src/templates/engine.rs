// Template rendering engine using Tera

use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Mutex;
use tera::{Context, Tera};

#[derive(Default)]
struct Compiled {
    tera: Tera,
    /// Source each registered template was compiled from
    sources: HashMap<String, String>,
}

/// Tera engine that caches compiled templates by name
///
/// A template is recompiled when its source text changes, so edited
/// overrides take effect without a restart.
pub struct TemplateEngine {
    compiled: Mutex<Compiled>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            compiled: Mutex::new(Compiled::default()),
        }
    }

    /// Render `content` registered under `name`, compiling it when new or changed
    pub fn render(&self, name: &str, content: &str, context: &Context) -> AppResult<String> {
        let mut compiled = self
            .compiled
            .lock()
            .map_err(|e| AppError::Template(format!("Template engine lock poisoned: {}", e)))?;

        if compiled.sources.get(name).map(String::as_str) != Some(content) {
            compiled
                .tera
                .add_raw_template(name, content)
                .map_err(|e| AppError::Template(format!("Failed to compile '{}': {}", name, describe(&e))))?;
            compiled.sources.insert(name.to_string(), content.to_string());
        }

        compiled
            .tera
            .render(name, context)
            .map_err(|e| AppError::Template(format!("Failed to render '{}': {}", name, describe(&e))))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Tera nests the useful message in the error source chain
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_simple_template_with_variables() {
        let engine = TemplateEngine::new();
        let mut ctx = Context::new();
        ctx.insert("name", "Acme");
        let result = engine.render("greeting", "Hello {{ name }}", &ctx).unwrap();
        assert_eq!(result, "Hello Acme");
    }

    #[test]
    fn test_recompiles_when_source_changes() {
        let engine = TemplateEngine::new();
        let ctx = Context::new();
        assert_eq!(engine.render("fixed", "first", &ctx).unwrap(), "first");
        assert_eq!(engine.render("fixed", "first", &ctx).unwrap(), "first");
        assert_eq!(engine.render("fixed", "second", &ctx).unwrap(), "second");
    }

    #[test]
    fn test_failed_compile_keeps_previous_template() {
        let engine = TemplateEngine::new();
        let ctx = Context::new();
        engine.render("fixed", "first", &ctx).unwrap();
        assert!(engine.render("fixed", "{% if %}", &ctx).is_err());
        assert_eq!(engine.render("fixed", "first", &ctx).unwrap(), "first");
    }

    #[test]
    fn test_missing_variable_is_template_error() {
        let engine = TemplateEngine::new();
        let err = engine
            .render("broken", "{{ nope }}", &Context::new())
            .unwrap_err();
        assert!(matches!(err, AppError::Template(_)));
    }
}
