// Template resolution with override lookup
//
// Resolution order:
// 1. Override directory ({prompts_dir}/{name}.tera) - operator-supplied wording
// 2. Builtin - compiled-in default templates

use crate::error::{AppError, AppResult};
use crate::templates::builtin;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Template source indicating where a template was resolved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// File in the configured prompts directory
    Override,
    /// Built-in template (compiled into the application)
    Builtin,
}

/// Resolved template info
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub name: String,
    pub content: String,
    pub source: TemplateSource,
    /// Path to the template file (if file-based)
    pub path: Option<PathBuf>,
}

/// Template resolver with override lookup and a builtin cache
#[derive(Debug, Default)]
pub struct TemplateResolver {
    override_dir: Option<PathBuf>,
    cache: Mutex<HashMap<String, ResolvedTemplate>>,
}

impl TemplateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory holding `{name}.tera` override files
    pub fn with_override_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    /// Resolve a template by name; override files win over builtins
    ///
    /// Override files are read on every call so edits apply immediately.
    /// Only builtin resolutions are cached.
    pub fn resolve(&self, name: &str) -> AppResult<ResolvedTemplate> {
        if let Some(template) = self.try_override_template(name)? {
            debug!("Template '{}' resolved from override: {:?}", name, template.path);
            return Ok(template);
        }

        if let Some(cached) = self.cache_get(name) {
            return Ok(cached);
        }

        let content = builtin::get_builtin_template(name).ok_or_else(|| {
            AppError::Template(format!("Template '{}' not found in any location", name))
        })?;
        debug!("Template '{}' resolved from builtin templates", name);
        let template = ResolvedTemplate {
            name: name.to_string(),
            content: content.to_string(),
            source: TemplateSource::Builtin,
            path: None,
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.to_string(), template.clone());
        }
        Ok(template)
    }

    fn cache_get(&self, name: &str) -> Option<ResolvedTemplate> {
        self.cache.lock().ok().and_then(|cache| cache.get(name).cloned())
    }

    fn override_path(&self, name: &str) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.tera", name)))
    }

    fn try_override_template(&self, name: &str) -> AppResult<Option<ResolvedTemplate>> {
        let Some(path) = self.override_path(name) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            AppError::Template(format!("Failed to read template {:?}: {}", path, e))
        })?;
        Ok(Some(ResolvedTemplate {
            name: name.to_string(),
            content,
            source: TemplateSource::Override,
            path: Some(path),
        }))
    }
}
