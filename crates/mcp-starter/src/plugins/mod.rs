//! Built-in template plugins

mod mcp;
mod rag;

pub use mcp::McpTemplatePlugin;
pub use rag::RagTemplatePlugin;

use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::plugin::TemplatePlugin;

/// Packages every generated server depends on
pub(crate) const BASE_DEPENDENCIES: &[&str] = &["fastmcp", "pydantic", "pyyaml", "click"];

/// All plugins shipped with mcp-starter
pub fn builtin() -> Vec<Arc<dyn TemplatePlugin>> {
    vec![
        Arc::new(McpTemplatePlugin::new()),
        Arc::new(RagTemplatePlugin::new()),
    ]
}

/// Build a context from static string pairs
pub(crate) fn context_from(pairs: &[(&str, &str)]) -> Context {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect()
}
