//! mcp-starter - Project scaffolding for MCP servers
//!
//! Generate a new MCP server project from a template plugin.
//!
//! Usage:
//! - mcp-starter: generate the default template into the current directory
//! - mcp-starter --template rag --var vector_db=qdrant: generate a RAG server
//! - mcp-starter --list-templates: show available templates

use anyhow::Result;
use clap::Parser;
use mcp_starter::context::{self, parse_pairs};
use mcp_starter::{registry, GeneratedProject, GeneratorOptions, ProjectGenerator};
use serde::Serialize;
use starter_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mcp-starter")]
#[command(about = "Generate a new MCP server project from a template")]
#[command(version)]
#[command(after_help = r#"BUILT-IN TEMPLATES:
    mcp             Standard MCP server with tools, resources, and prompts
    rag             RAG-enabled MCP server with vector databases and retrieval tools

CONFIGURATION:
    ~/.config/mcp-starter/config.toml may set default_template, output_dir,
    engine ("builtin" or "cookiecutter") and a [default_context] table.

EXAMPLES:
    mcp-starter                                     # Interactive MCP server
    mcp-starter --no-input --var project_name="Weather Bot"
    mcp-starter -t rag --var vector_db=faiss --var embedding_model=openai
    mcp-starter --config-file ~/.cookiecutterrc     # Reuse cookiecutter defaults
    mcp-starter --list-templates
"#)]
struct Cli {
    /// Directory to create the project in
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Do not prompt for parameters; use defaults and --var values
    #[arg(long)]
    no_input: bool,

    /// User config file with a default_context section (YAML or TOML)
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Ignore ~/.config/mcp-starter/config.toml
    #[arg(long)]
    default_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Template to use
    #[arg(short, long)]
    template: Option<String>,

    /// Set template variable (KEY=VALUE)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    vars: Vec<String>,

    /// Overwrite an existing project directory
    #[arg(long)]
    force: bool,

    /// List available templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Output the template list as JSON
    #[arg(long, requires = "list_templates")]
    json: bool,
}

/// Template listing entry
#[derive(Serialize)]
struct TemplateSummary {
    name: String,
    version: String,
    description: String,
    features: Vec<&'static str>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = if cli.list_templates {
        cmd_list(cli.json)
    } else {
        cmd_generate(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// List all registered templates
fn cmd_list(json: bool) -> Result<()> {
    let plugins = registry()
        .read()
        .map_err(|_| anyhow::anyhow!("template registry is poisoned"))?
        .list();

    if json {
        let summaries: Vec<_> = plugins
            .iter()
            .map(|p| TemplateSummary {
                name: p.name().to_string(),
                version: p.version().to_string(),
                description: p.description().to_string(),
                features: p.supported_features(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("\x1b[1mAvailable Templates\x1b[0m");
    println!();

    for plugin in &plugins {
        println!("  \x1b[32m{}\x1b[0m (v{})", plugin.name(), plugin.version());
        println!("    \x1b[2m{}\x1b[0m", plugin.description());
        let features = plugin.supported_features();
        if !features.is_empty() {
            println!("    features: {}", features.join(", "));
        }
    }

    Ok(())
}

/// Generate a project from the selected template
fn cmd_generate(cli: &Cli) -> Result<()> {
    let config = if cli.default_config {
        Config::default()
    } else {
        Config::load()?
    };

    let output_dir = cli
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let options = GeneratorOptions {
        output_dir,
        no_input: cli.no_input,
        config_file: cli.config_file.clone(),
        default_config: cli.default_config,
        verbose: cli.verbose,
        template: cli
            .template
            .clone()
            .unwrap_or_else(|| config.default_template.clone()),
        extra_context: parse_pairs(&cli.vars)?,
        overwrite: cli.force,
    };

    let generator = ProjectGenerator::new(options)?;
    if cli.verbose {
        println!("info: Using template: {}", generator.template_name());
        println!("info: Template directory: {}", generator.template_dir().display());
    }

    let project = generator.generate()?;
    print_success(&generator, &project, cli.verbose);

    Ok(())
}

fn print_success(generator: &ProjectGenerator, project: &GeneratedProject, verbose: bool) {
    println!(
        "✅ MCP server project generated successfully at: {}",
        project.path.display()
    );

    if verbose {
        if let Some(deps) = project.context.get("_computed_dependencies") {
            println!("info: Dependencies: {}", context::display_value(deps));
        }
    }

    let dir_name = project
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| project.path.display().to_string());

    println!();
    println!("Next steps:");
    println!("  cd {}", dir_name);
    for step in generator.plugin().next_steps(&project.context) {
        println!("  {}", step);
    }
}
