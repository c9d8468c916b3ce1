//! Template registry
//!
//! Maps unique template names to plugin instances. A process-wide registry is
//! available through [`registry`]; tests and embedders can build their own.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use thiserror::Error;
use tracing::debug;

use crate::plugin::TemplatePlugin;
use crate::plugins;

/// Errors specific to registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Template '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Template '{0}' is not registered")]
    NotFound(String),
}

/// Lookup table from template name to plugin
pub struct TemplateRegistry {
    plugins: HashMap<String, Arc<dyn TemplatePlugin>>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Create a registry holding the built-in templates
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for plugin in plugins::builtin() {
            let name = plugin.name().to_string();
            registry.plugins.insert(name, plugin);
        }
        registry
    }

    /// Create a registry with no templates
    pub fn empty() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Register a plugin under its own name
    pub fn register(&mut self, plugin: Arc<dyn TemplatePlugin>) -> Result<(), RegistryError> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }

        debug!("Registering template plugin: {} v{}", name, plugin.version());
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Remove a plugin by name
    pub fn unregister(&mut self, name: &str) -> Result<Arc<dyn TemplatePlugin>, RegistryError> {
        let plugin = self
            .plugins
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        debug!("Unregistered template plugin: {}", name);
        Ok(plugin)
    }

    /// Find a plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn TemplatePlugin>> {
        self.plugins.get(name).cloned()
    }

    /// All plugins, sorted by name
    pub fn list(&self) -> Vec<Arc<dyn TemplatePlugin>> {
        let mut plugins: Vec<_> = self.plugins.values().cloned().collect();
        plugins.sort_by(|a, b| a.name().cmp(b.name()));
        plugins
    }

    /// All plugin names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// The process-wide registry
pub fn registry() -> &'static RwLock<TemplateRegistry> {
    static REGISTRY: OnceLock<RwLock<TemplateRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(TemplateRegistry::new()))
}
