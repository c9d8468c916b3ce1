//! Configuration loading for mcp-starter

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::paths::Paths;

/// Errors raised while reading configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config from {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Which engine renders templates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// In-process handlebars renderer
    #[default]
    Builtin,
    /// External `cookiecutter` executable
    Cookiecutter,
}

/// mcp-starter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Template used when none is given on the command line
    #[serde(default = "default_template")]
    pub default_template: String,

    /// Where projects are generated when no output directory is given
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Rendering engine
    #[serde(default)]
    pub engine: EngineKind,

    /// Values applied over every plugin's defaults
    #[serde(default)]
    pub default_context: Map<String, Value>,
}

fn default_template() -> String {
    "mcp".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_template: default_template(),
            output_dir: None,
            engine: EngineKind::default(),
            default_context: Map::new(),
        }
    }
}

impl Config {
    /// Load configuration from the standard location or use defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Paths::new().config_file())
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = read(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Read the `default_context` section of a cookiecutter-style user config.
///
/// `.toml` files are parsed as TOML, everything else as YAML. A file without a
/// `default_context` section contributes nothing.
///
/// Values keep their YAML types, so versions must be quoted: `python_version:
/// 3.10` is the number 3.1, while `python_version: "3.10"` is the string.
pub fn load_context_file(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    #[derive(Deserialize, Default)]
    struct ContextFile {
        #[serde(default)]
        default_context: Map<String, Value>,
    }

    let content = read(path)?;
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let parsed: Option<ContextFile> = if is_toml {
        toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
    };

    Ok(parsed.unwrap_or_default().default_context)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config.default_template, "mcp");
        assert_eq!(config.engine, EngineKind::Builtin);
        assert!(config.output_dir.is_none());
        assert!(config.default_context.is_empty());
    }

    #[test]
    fn test_load_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
default_template = "rag"
engine = "cookiecutter"

[default_context]
author_name = "Ada Lovelace"
author_email = "ada@example.com"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_template, "rag");
        assert_eq!(config.engine, EngineKind::Cookiecutter);
        assert_eq!(config.default_context["author_name"], "Ada Lovelace");
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "engine = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_yaml_context_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("user-config.yaml");
        fs::write(
            &path,
            "default_context:\n  author_name: Grace Hopper\n  vector_db: qdrant\n",
        )
        .unwrap();

        let context = load_context_file(&path).unwrap();
        assert_eq!(context["author_name"], "Grace Hopper");
        assert_eq!(context["vector_db"], "qdrant");
    }

    #[test]
    fn test_yaml_versions_keep_their_type() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("user-config.yaml");
        fs::write(
            &path,
            "default_context:\n  python_version: \"3.10\"\n  version: 3.10\n",
        )
        .unwrap();

        let context = load_context_file(&path).unwrap();
        assert_eq!(context["python_version"], "3.10");
        assert!(context["version"].is_number());
    }

    #[test]
    fn test_context_file_without_section() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("test-config.yaml");
        fs::write(&path, "test: config\n").unwrap();

        assert!(load_context_file(&path).unwrap().is_empty());
    }

    #[test]
    fn test_toml_context_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("context.toml");
        fs::write(&path, "[default_context]\nproject_name = \"Weather Bot\"\n").unwrap();

        let context = load_context_file(&path).unwrap();
        assert_eq!(context["project_name"], "Weather Bot");
    }

    #[test]
    fn test_missing_context_file_is_an_error() {
        let err = load_context_file(Path::new("/nonexistent/context.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
