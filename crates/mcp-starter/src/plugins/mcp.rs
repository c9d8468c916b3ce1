//! Standard MCP server template

use serde_json::Value;

use super::{context_from, BASE_DEPENDENCIES};
use crate::context::{self, Context};
use crate::plugin::{derive_slug, extend_unique, Choice, PluginInfo, TemplatePlugin};

const INFO: PluginInfo = PluginInfo {
    name: "mcp",
    description: "Standard MCP server with tools, resources, and prompts",
    version: "1.0.0",
};

pub(crate) const SERVER_TYPES: &[&str] = &["tools", "resources", "prompts", "full"];
pub(crate) const LICENSES: &[&str] = &["MIT", "Apache-2.0", "GPL-3.0", "BSD-3-Clause", "None"];
pub(crate) const PYTHON_VERSIONS: &[&str] = &["3.10", "3.11", "3.12"];

const CHOICES: &[Choice] = &[
    Choice {
        field: "server_type",
        options: SERVER_TYPES,
        required: false,
    },
    Choice {
        field: "license",
        options: LICENSES,
        required: false,
    },
    Choice {
        field: "python_version",
        options: PYTHON_VERSIONS,
        required: false,
    },
];

/// MCP server template with tools, resources and prompts
#[derive(Debug, Default)]
pub struct McpTemplatePlugin;

impl McpTemplatePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl TemplatePlugin for McpTemplatePlugin {
    fn info(&self) -> &PluginInfo {
        &INFO
    }

    fn default_context(&self) -> Context {
        context_from(&[
            ("project_name", "my-mcp-server"),
            ("project_slug", "my_mcp_server"),
            ("project_description", "A Model Context Protocol server"),
            ("author_name", "Your Name"),
            ("author_email", "your.email@example.com"),
            ("github_username", "yourusername"),
            ("version", "0.1.0"),
            ("python_version", "3.11"),
            ("use_docker", "y"),
            ("use_github_actions", "y"),
            ("use_pre_commit", "y"),
            ("license", "MIT"),
            ("include_examples", "y"),
            ("server_type", "full"),
        ])
    }

    fn supported_features(&self) -> Vec<&'static str> {
        vec![
            "docker",
            "github_actions",
            "pre_commit",
            "testing",
            "documentation",
            "multiple_licenses",
            "tools",
            "resources",
            "prompts",
            "examples",
        ]
    }

    fn choices(&self) -> &[Choice] {
        CHOICES
    }

    fn pre_generate_hook(&self, mut context: Context) -> Context {
        derive_slug(&mut context);

        let mut dependencies = BASE_DEPENDENCIES.to_vec();
        match context::get_str(&context, "server_type").unwrap_or("full") {
            "tools" => extend_unique(&mut dependencies, &["httpx"]),
            "resources" => extend_unique(&mut dependencies, &["aiofiles"]),
            "full" => extend_unique(&mut dependencies, &["httpx", "aiofiles"]),
            _ => {}
        }

        context.insert(
            "_computed_dependencies".to_string(),
            Value::from(dependencies),
        );
        context
    }

    fn next_steps(&self, context: &Context) -> Vec<String> {
        let slug = context::get_str(context, "project_slug").unwrap_or("server");
        vec![
            "pip install -e .".to_string(),
            format!("python -m {}.server", slug),
        ]
    }
}
