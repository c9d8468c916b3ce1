//! mcp-starter - Project scaffolding for MCP servers
//!
//! Pick a template plugin ("mcp" or "rag"), supply a few values, and get a
//! ready-to-run server project. Each plugin owns its defaults, validation
//! rules and pre/post generation hooks; a rendering engine turns the template
//! directory plus the final context into the project tree.

pub mod context;
pub mod engine;
pub mod generator;
pub mod plugin;
pub mod plugins;
pub mod prompt;
pub mod registry;

pub use context::{Context, ContextError};
pub use engine::{CookiecutterEngine, Engine, EngineError, HandlebarsEngine, RenderRequest};
pub use generator::{GenerateError, GeneratedProject, GeneratorOptions, ProjectGenerator};
pub use plugin::{Choice, PluginInfo, TemplatePlugin};
pub use plugins::{McpTemplatePlugin, RagTemplatePlugin};
pub use registry::{registry, RegistryError, TemplateRegistry};
