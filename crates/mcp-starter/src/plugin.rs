//! Template plugin interface
//!
//! A plugin describes one scaffoldable project archetype: its identity, the
//! template directory it renders from, default variables, how to validate a
//! context and what to do before and after generation.

use std::path::{Path, PathBuf};

use serde::Serialize;
use starter_core::Paths;

use crate::context::{self, Context, ContextError};

/// Fields every template needs before it can render
pub const REQUIRED_FIELDS: &[&str] = &["project_name", "author_name", "author_email"];

/// Directory holding the templates shipped with this crate
pub const BUNDLED_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Identity metadata for a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

/// An enumerated choice field
#[derive(Debug, Clone, Copy)]
pub struct Choice {
    /// Context key
    pub field: &'static str,
    /// Allowed values
    pub options: &'static [&'static str],
    /// Whether the key must be present at all
    pub required: bool,
}

impl Choice {
    /// Check the field in `context` against the allowed options
    pub fn check(&self, context: &Context) -> Result<(), ContextError> {
        let value = match context.get(self.field) {
            Some(value) => context::display_value(value),
            None if self.required => {
                return Err(ContextError::MissingField(self.field.to_string()));
            }
            None => return Ok(()),
        };

        if self.options.contains(&value.as_str()) {
            Ok(())
        } else {
            Err(ContextError::InvalidChoice {
                field: self.field.to_string(),
                value,
                allowed: self.options.iter().map(|s| s.to_string()).collect(),
            })
        }
    }
}

/// A scaffoldable project archetype
pub trait TemplatePlugin: Send + Sync {
    /// Name, description and version
    fn info(&self) -> &PluginInfo;

    fn name(&self) -> &str {
        self.info().name
    }

    fn description(&self) -> &str {
        self.info().description
    }

    fn version(&self) -> &str {
        self.info().version
    }

    /// Directory containing `cookiecutter.json` for this template
    fn template_path(&self) -> PathBuf {
        let builtin = Paths::builtin_templates(Path::new(BUNDLED_TEMPLATES));
        Paths::new().template_dir(self.name(), &builtin)
    }

    /// Default template variables
    fn default_context(&self) -> Context;

    /// Feature names this template can produce
    fn supported_features(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Fields that must be present and non-empty
    fn required_fields(&self) -> &[&'static str] {
        REQUIRED_FIELDS
    }

    /// Enumerated choice fields
    fn choices(&self) -> &[Choice] {
        &[]
    }

    /// Validate a context for this template
    fn validate_context(&self, context: &Context) -> Result<(), ContextError> {
        for field in self.required_fields() {
            if !context::is_truthy(context, field) {
                return Err(ContextError::MissingField(field.to_string()));
            }
        }

        if let Some(slug) = context::get_str(context, "project_slug") {
            context::check_slug(slug)?;
        }

        for choice in self.choices() {
            choice.check(context)?;
        }

        Ok(())
    }

    /// Adjust the context before rendering
    fn pre_generate_hook(&self, context: Context) -> Context {
        context
    }

    /// Run after the project has been rendered
    fn post_generate_hook(&self, _project_path: &Path, _context: &Context) -> anyhow::Result<()> {
        Ok(())
    }

    /// Commands to suggest once the project exists
    fn next_steps(&self, _context: &Context) -> Vec<String> {
        vec!["pip install -e .".to_string()]
    }
}

/// Set `project_slug` from `project_name` when it was not given
pub(crate) fn derive_slug(context: &mut Context) {
    if context.contains_key("project_slug") {
        return;
    }
    if let Some(name) = context::get_str(context, "project_name") {
        let slug = context::slugify(name);
        context.insert("project_slug".to_string(), slug.into());
    }
}

/// Append `items` to `deps`, skipping any already present
pub(crate) fn extend_unique(deps: &mut Vec<&'static str>, items: &[&'static str]) {
    for item in items {
        if !deps.contains(item) {
            deps.push(item);
        }
    }
}
