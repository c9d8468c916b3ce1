//! Project generation
//!
//! Resolves a template name to a plugin, layers caller-supplied values over
//! the plugin defaults, and hands the result to a rendering engine. Every
//! failure after construction surfaces as one descriptive [`GenerateError`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use starter_core::{config, Config, ConfigError};
use thiserror::Error;
use tracing::{debug, info};

use crate::context::{self, Context, ContextError};
use crate::engine::{engine_for, Engine, EngineError, RenderRequest};
use crate::plugin::TemplatePlugin;
use crate::prompt::{Prompter, StdinPrompter};
use crate::registry::{registry, TemplateRegistry};

/// Errors raised while generating a project
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Template '{name}' not found. Available templates: {}", .available.join(", "))]
    TemplateNotFound { name: String, available: Vec<String> },

    #[error("Failed to generate MCP server project: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to generate MCP server project: failed to read input: {0}")]
    Prompt(#[source] io::Error),

    #[error("Failed to generate MCP server project: invalid context for template '{template}': {source}")]
    InvalidContext {
        template: String,
        #[source]
        source: ContextError,
    },

    #[error("Failed to generate MCP server project: {0}")]
    Engine(#[from] EngineError),

    #[error("Failed to generate MCP server project: post-generation hook failed: {0}")]
    Hook(String),
}

/// Options controlling a generation run
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Directory the project is created in
    pub output_dir: PathBuf,
    /// Never prompt; use defaults and supplied values
    pub no_input: bool,
    /// cookiecutter-style user config with a `default_context` section
    pub config_file: Option<PathBuf>,
    /// Ignore the user's config.toml
    pub default_config: bool,
    pub verbose: bool,
    /// Template name
    pub template: String,
    /// Values that override every other layer
    pub extra_context: Context,
    /// Render over an existing project directory
    pub overwrite: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            output_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            no_input: false,
            config_file: None,
            default_config: false,
            verbose: false,
            template: "mcp".to_string(),
            extra_context: Context::new(),
            overwrite: false,
        }
    }
}

/// Result of a successful generation run
#[derive(Debug, Clone)]
pub struct GeneratedProject {
    /// Root of the new project
    pub path: PathBuf,
    /// Context the project was rendered with
    pub context: Context,
}

/// Generates projects from a registered template plugin
pub struct ProjectGenerator {
    options: GeneratorOptions,
    plugin: Arc<dyn TemplatePlugin>,
    template_dir: PathBuf,
    engine: Option<Arc<dyn Engine>>,
    prompter: Option<Box<dyn Prompter>>,
}

impl ProjectGenerator {
    /// Create a generator using the process-wide registry
    pub fn new(options: GeneratorOptions) -> Result<Self, GenerateError> {
        let guard = registry().read().unwrap_or_else(|e| e.into_inner());
        Self::with_registry(options, &guard)
    }

    /// Create a generator resolving the template in `registry`
    pub fn with_registry(
        options: GeneratorOptions,
        registry: &TemplateRegistry,
    ) -> Result<Self, GenerateError> {
        let plugin = registry
            .get(&options.template)
            .ok_or_else(|| GenerateError::TemplateNotFound {
                name: options.template.clone(),
                available: registry.names(),
            })?;

        let template_dir = plugin.template_path();
        debug!(
            "Using template '{}' v{} from {}",
            plugin.name(),
            plugin.version(),
            template_dir.display()
        );

        Ok(Self {
            options,
            plugin,
            template_dir,
            engine: None,
            prompter: None,
        })
    }

    /// Render with `engine` instead of the configured one
    pub fn with_engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Ask for values through `prompter` in interactive mode
    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Render from `dir` instead of the plugin's template path
    pub fn with_template_dir(mut self, dir: PathBuf) -> Self {
        self.template_dir = dir;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn template_name(&self) -> &str {
        self.plugin.name()
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn plugin(&self) -> &Arc<dyn TemplatePlugin> {
        &self.plugin
    }

    /// Names of every registered template
    pub fn list_available_templates(&self) -> Vec<String> {
        registry()
            .read()
            .map(|r| r.names())
            .unwrap_or_else(|e| e.into_inner().names())
    }

    /// The plugin's default context
    pub fn default_context(&self) -> Context {
        self.plugin.default_context()
    }

    fn user_config(&self) -> Result<Config, GenerateError> {
        if self.options.default_config {
            Ok(Config::default())
        } else {
            Ok(Config::load()?)
        }
    }

    /// Layer defaults, configuration and caller values, then validate and run
    /// the pre-generation hook
    pub fn build_context(&self) -> Result<Context, GenerateError> {
        let config = self.user_config()?;
        self.build_context_with(&config)
    }

    fn build_context_with(&self, config: &Config) -> Result<Context, GenerateError> {
        let defaults = self.plugin.default_context();

        let mut layers = vec![config.default_context.clone()];
        if let Some(path) = &self.options.config_file {
            debug!("Loading context from {}", path.display());
            layers.push(config::load_context_file(path)?);
        }
        layers.push(self.options.extra_context.clone());

        let mut ctx = defaults;
        for layer in &layers {
            ctx = context::merge(&ctx, layer);
        }

        // Unless a slug was given explicitly it follows the project name
        let slug_given = layers.iter().any(|l| l.contains_key("project_slug"));
        if !slug_given {
            follow_name(&mut ctx);
        }

        if !self.options.no_input {
            ctx = self.prompt(ctx, !slug_given).map_err(GenerateError::Prompt)?;
        }

        self.plugin
            .validate_context(&ctx)
            .map_err(|source| GenerateError::InvalidContext {
                template: self.plugin.name().to_string(),
                source,
            })?;

        Ok(self.plugin.pre_generate_hook(ctx))
    }

    fn prompt(&self, ctx: Context, slug_follows_name: bool) -> io::Result<Context> {
        match &self.prompter {
            Some(prompter) => self.prompt_with(prompter.as_ref(), ctx, slug_follows_name),
            // Stdin is only locked for the duration of the prompts
            None => self.prompt_with(&StdinPrompter::terminal(), ctx, slug_follows_name),
        }
    }

    fn prompt_with(
        &self,
        prompter: &dyn Prompter,
        mut ctx: Context,
        slug_follows_name: bool,
    ) -> io::Result<Context> {
        let keys: Vec<String> = ctx.keys().filter(|k| !k.starts_with('_')).cloned().collect();

        for key in keys {
            if key == "project_slug" && slug_follows_name {
                follow_name(&mut ctx);
            }
            let current = ctx.get(&key).map(context::display_value).unwrap_or_default();
            let choice = self.plugin.choices().iter().find(|c| c.field == key);

            let answer = match choice {
                Some(choice) => prompter.choose(&key, choice.options, &current)?,
                None => prompter.ask(&key, &current)?,
            };
            ctx.insert(key, answer.into());
        }

        Ok(ctx)
    }

    /// Generate the project
    pub fn generate(&self) -> Result<GeneratedProject, GenerateError> {
        let config = self.user_config()?;
        let context = self.build_context_with(&config)?;

        let engine = self
            .engine
            .clone()
            .unwrap_or_else(|| engine_for(config.engine));
        engine.check_available()?;

        info!(
            "Generating '{}' project with {} engine",
            self.plugin.name(),
            engine.name()
        );

        let path = engine.render(&RenderRequest {
            template_dir: &self.template_dir,
            output_dir: &self.options.output_dir,
            context: &context,
            overwrite: self.options.overwrite,
        })?;

        self.plugin
            .post_generate_hook(&path, &context)
            .map_err(|e| GenerateError::Hook(format!("{:#}", e)))?;

        info!("Project generated at {}", path.display());
        Ok(GeneratedProject { path, context })
    }
}

/// Point `project_slug` at the slug of the current `project_name`
fn follow_name(ctx: &mut Context) {
    if let Some(name) = context::get_str(ctx, "project_name") {
        let slug = context::slugify(name);
        ctx.insert("project_slug".to_string(), slug.into());
    }
}
