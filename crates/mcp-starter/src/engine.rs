//! Template rendering engines
//!
//! A template is a directory with a `cookiecutter.json` holding default
//! variables and a single top-level directory whose name is itself a template
//! (for example `{{cookiecutter.project_slug}}`). Rendering copies that tree
//! into the output directory, substituting variables in both file/directory
//! names and text file contents.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use chrono::Local;
use handlebars::Handlebars;
use serde_json::{json, Value};
use starter_core::EngineKind;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::context::{self, is_binary_file, Context};

/// Name of the template defaults file
pub const TEMPLATE_CONFIG: &str = "cookiecutter.json";

/// `cookiecutter.json` key naming the template language of the tree
pub const TEMPLATE_SYNTAX_KEY: &str = "_template_syntax";

/// Errors raised while rendering a template
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Unavailable(String),

    #[error("Invalid template at {path}: {message}")]
    InvalidTemplate { path: PathBuf, message: String },

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl EngineError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Everything an engine needs to render one project
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Directory containing `cookiecutter.json`
    pub template_dir: &'a Path,
    /// Directory the project is created in
    pub output_dir: &'a Path,
    /// Final template variables
    pub context: &'a Context,
    /// Render over an existing project directory
    pub overwrite: bool,
}

/// Turns a template directory and a context into a project directory
pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    /// Fail early when the engine cannot run at all
    fn check_available(&self) -> Result<(), EngineError>;

    /// Render the project and return its path
    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, EngineError>;
}

/// Build the engine selected in configuration
pub fn engine_for(kind: EngineKind) -> Arc<dyn Engine> {
    match kind {
        EngineKind::Builtin => Arc::new(HandlebarsEngine::new()),
        EngineKind::Cookiecutter => Arc::new(CookiecutterEngine::new()),
    }
}

/// Read a template's `cookiecutter.json` as a context.
///
/// Array values are choice lists whose first element is the default, except
/// for computed `_` keys which are kept as-is.
pub fn load_template_defaults(template_dir: &Path) -> Result<Context, EngineError> {
    let path = template_dir.join(TEMPLATE_CONFIG);
    let content = fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
    let raw: Context = serde_json::from_str(&content).map_err(|e| EngineError::InvalidTemplate {
        path: path.clone(),
        message: e.to_string(),
    })?;

    Ok(raw
        .into_iter()
        .map(|(key, value)| match value {
            Value::Array(mut options) if !key.starts_with('_') && !options.is_empty() => {
                let first = options.swap_remove(0);
                (key, first)
            }
            other => (key, other),
        })
        .collect())
}

/// In-process renderer built on handlebars
pub struct HandlebarsEngine {
    handlebars: Handlebars<'static>,
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlebarsEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Generated files are source code, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("slugify", Box::new(slugify_helper));
        handlebars.register_helper("upper", Box::new(upper_helper));
        handlebars.register_helper("lower", Box::new(lower_helper));

        Self { handlebars }
    }

    fn render_str(&self, template: &str, data: &Value, path: &Path) -> Result<String, EngineError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| EngineError::Render {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// The single templated top-level directory
    fn project_root(template_dir: &Path) -> Result<PathBuf, EngineError> {
        let mut roots = Vec::new();
        for entry in fs::read_dir(template_dir).map_err(|e| EngineError::io(template_dir, e))? {
            let entry = entry.map_err(|e| EngineError::io(template_dir, e))?;
            let path = entry.path();
            if path.is_dir() && entry.file_name().to_string_lossy().contains("{{") {
                roots.push(path);
            }
        }

        match roots.len() {
            1 => Ok(roots.remove(0)),
            0 => Err(EngineError::InvalidTemplate {
                path: template_dir.to_path_buf(),
                message: "no templated project directory found".to_string(),
            }),
            n => Err(EngineError::InvalidTemplate {
                path: template_dir.to_path_buf(),
                message: format!("expected one templated project directory, found {}", n),
            }),
        }
    }
}

impl Engine for HandlebarsEngine {
    fn name(&self) -> &str {
        "builtin"
    }

    fn check_available(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, EngineError> {
        let template_dir = request.template_dir;
        if !template_dir.join(TEMPLATE_CONFIG).is_file() {
            return Err(EngineError::Unavailable(format!(
                "Template files not found: {} (set {} to the templates directory)",
                template_dir.display(),
                starter_core::paths::TEMPLATE_DIR_ENV
            )));
        }

        let mut ctx = context::merge(&load_template_defaults(template_dir)?, request.context);
        if !ctx.contains_key("_year") {
            ctx.insert("_year".to_string(), Local::now().format("%Y").to_string().into());
        }
        let data = json!({ "cookiecutter": ctx });

        let root = Self::project_root(template_dir)?;
        let root_name = root.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let project_name = self.render_str(&root_name, &data, &root)?;
        if project_name.trim().is_empty() {
            return Err(EngineError::InvalidTemplate {
                path: root.clone(),
                message: "project directory name rendered empty".to_string(),
            });
        }

        let dest = project_dir(request.output_dir, project_name.trim(), &root)?;
        if dest.exists() && !request.overwrite {
            return Err(EngineError::DestinationExists(dest));
        }

        info!("Rendering {} into {}", template_dir.display(), dest.display());
        let created = !dest.exists();
        fs::create_dir_all(&dest).map_err(|e| EngineError::io(&dest, e))?;

        if let Err(e) = self.render_tree(&root, &dest, &data) {
            // Leave nothing behind that would block a retry
            if created {
                warn!("Removing partially generated project at {}", dest.display());
                if let Err(cleanup) = fs::remove_dir_all(&dest) {
                    warn!("Failed to remove {}: {}", dest.display(), cleanup);
                }
            }
            return Err(e);
        }

        Ok(dest)
    }
}

impl HandlebarsEngine {
    /// Render every entry below `root` into `dest`
    fn render_tree(&self, root: &Path, dest: &Path, data: &Value) -> Result<(), EngineError> {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                EngineError::io(&path, e.into())
            })?;
            let src_path = entry.path();

            let rel_path = match src_path.strip_prefix(root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel,
                _ => continue,
            };

            // Substitute variables in path components
            let mut dest_rel = PathBuf::new();
            for component in rel_path.components() {
                let component_str = component.as_os_str().to_string_lossy();
                let rendered = self.render_str(&component_str, data, src_path)?;
                if !is_single_component(&rendered) {
                    return Err(EngineError::InvalidTemplate {
                        path: src_path.to_path_buf(),
                        message: format!("'{}' is not a single path component", rendered),
                    });
                }
                dest_rel.push(rendered);
            }
            let dest_path = dest.join(&dest_rel);

            // Directories are created on demand so that trees whose files
            // were all skipped do not appear
            if entry.file_type().is_dir() {
                continue;
            }

            let content = fs::read(src_path).map_err(|e| EngineError::io(src_path, e))?;
            let output = if is_binary_file(&content) {
                content
            } else {
                let text = String::from_utf8_lossy(&content);
                let rendered = self.render_str(&text, data, src_path)?;
                // A conditional file whose condition was false
                if !text.trim().is_empty() && rendered.trim().is_empty() {
                    debug!("Skipped {} (rendered empty)", dest_rel.display());
                    continue;
                }
                rendered.into_bytes()
            };

            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
            }
            fs::write(&dest_path, &output).map_err(|e| EngineError::io(&dest_path, e))?;
            debug!("Rendered {}", dest_rel.display());

            // Preserve executable permission
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let src_mode = entry
                    .metadata()
                    .map(|m| m.permissions().mode())
                    .unwrap_or(0);
                if src_mode & 0o111 != 0 {
                    fs::set_permissions(&dest_path, fs::Permissions::from_mode(src_mode))
                        .map_err(|e| EngineError::io(&dest_path, e))?;
                }
            }
        }

        Ok(())
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Join the rendered project directory name onto `output_dir`, refusing
/// anything that would land elsewhere
fn project_dir(output_dir: &Path, name: &str, template: &Path) -> Result<PathBuf, EngineError> {
    if !is_single_component(name) {
        return Err(EngineError::InvalidTemplate {
            path: template.to_path_buf(),
            message: format!("project directory '{}' is not a single directory name", name),
        });
    }
    Ok(output_dir.join(name))
}

/// `key=value` arguments for cookiecutter; computed `_` keys stay private to
/// the template
fn extra_context_args(context: &Context) -> Vec<String> {
    context
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| format!("{}={}", key, context::display_value(value)))
        .collect()
}

/// Renders by running an installed `cookiecutter` executable
pub struct CookiecutterEngine {
    program: String,
}

impl Default for CookiecutterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CookiecutterEngine {
    pub fn new() -> Self {
        Self::with_program("cookiecutter")
    }

    /// Use a different executable name or path
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn locate(&self) -> Result<PathBuf, EngineError> {
        which::which(&self.program).map_err(|_| {
            EngineError::Unavailable(format!(
                "{} is not installed. Install it with: pip install cookiecutter",
                self.program
            ))
        })
    }
}

impl Engine for CookiecutterEngine {
    fn name(&self) -> &str {
        "cookiecutter"
    }

    fn check_available(&self) -> Result<(), EngineError> {
        self.locate().map(|_| ())
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, EngineError> {
        let defaults = load_template_defaults(request.template_dir)?;
        if let Some(syntax) = context::get_str(&defaults, TEMPLATE_SYNTAX_KEY) {
            if syntax != "jinja" {
                return Err(EngineError::Unavailable(format!(
                    "Template {} is written in {} and cannot be rendered by {}. Set engine = \"builtin\" in config.toml",
                    request.template_dir.display(),
                    syntax,
                    self.program
                )));
            }
        }

        let slug = context::get_str(request.context, "project_slug").ok_or_else(|| {
            EngineError::InvalidTemplate {
                path: request.template_dir.to_path_buf(),
                message: "context has no project_slug".to_string(),
            }
        })?;
        let dest = project_dir(request.output_dir, slug, request.template_dir)?;

        let program = self.locate()?;

        let mut cmd = Command::new(&program);
        cmd.arg(request.template_dir)
            .arg("--no-input")
            .arg("--output-dir")
            .arg(request.output_dir);
        if request.overwrite {
            cmd.arg("--overwrite-if-exists");
        }
        cmd.args(extra_context_args(request.context));

        debug!("Running {:?}", cmd);
        let output = cmd.output().map_err(|e| EngineError::io(&program, e))?;
        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(dest)
    }
}

// Handlebars helpers

fn slugify_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&context::slugify(param))?;
    Ok(())
}

fn upper_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&param.to_uppercase())?;
    Ok(())
}

fn lower_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&param.to_lowercase())?;
    Ok(())
}
