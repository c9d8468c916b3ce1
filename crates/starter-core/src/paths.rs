//! Standard paths used by mcp-starter

use std::path::{Path, PathBuf};

/// Environment variable that overrides the built-in templates directory
pub const TEMPLATE_DIR_ENV: &str = "MCP_STARTER_TEMPLATE_DIR";

/// Standard mcp-starter paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory (~/.local/share/mcp-starter)
    pub data: PathBuf,
    /// Config directory (~/.config/mcp-starter)
    pub config: PathBuf,
    /// User template overrides (~/.local/share/mcp-starter/templates)
    pub user_templates: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("mcp-starter");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mcp-starter");

        Self::with_dirs(data, config)
    }

    /// Create with custom directories (for testing)
    pub fn with_dirs(data: PathBuf, config: PathBuf) -> Self {
        let user_templates = data.join("templates");
        Self {
            data,
            config,
            user_templates,
        }
    }

    /// Path of the user configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Locate the built-in templates directory.
    ///
    /// `MCP_STARTER_TEMPLATE_DIR` wins, then a `share/mcp-starter/templates`
    /// directory next to the executable, then `fallback`.
    pub fn builtin_templates(fallback: &Path) -> PathBuf {
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }

        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(parent) = exe_path.parent() {
                let templates_path = parent.join("../share/mcp-starter/templates");
                if templates_path.exists() {
                    return templates_path;
                }
            }
        }

        fallback.to_path_buf()
    }

    /// Resolve the directory for a named template.
    ///
    /// A user template with the same name takes precedence over the built-in one.
    pub fn template_dir(&self, name: &str, builtin_root: &Path) -> PathBuf {
        let user_path = self.user_templates.join(name);
        if user_path.join("cookiecutter.json").is_file() {
            return user_path;
        }
        builtin_root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_user_template_takes_precedence() {
        let temp = tempfile::tempdir().unwrap();
        let paths = Paths::with_dirs(temp.path().join("data"), temp.path().join("config"));
        let builtin = temp.path().join("builtin");

        assert_eq!(paths.template_dir("mcp", &builtin), builtin.join("mcp"));

        let user_mcp = paths.user_templates.join("mcp");
        fs::create_dir_all(&user_mcp).unwrap();
        // A bare directory is not a template yet
        assert_eq!(paths.template_dir("mcp", &builtin), builtin.join("mcp"));

        fs::write(user_mcp.join("cookiecutter.json"), "{}").unwrap();
        assert_eq!(paths.template_dir("mcp", &builtin), user_mcp);
    }

    #[test]
    fn test_config_file_location() {
        let paths = Paths::with_dirs(PathBuf::from("/d"), PathBuf::from("/c"));
        assert_eq!(paths.config_file(), PathBuf::from("/c/config.toml"));
        assert_eq!(paths.user_templates, PathBuf::from("/d/templates"));
    }
}
