//! Starter Core - Shared functionality for the mcp-starter tools
//!
//! Standard locations on disk and the user configuration file.

pub mod config;
pub mod paths;

pub use config::{load_context_file, Config, ConfigError, EngineKind};
pub use paths::Paths;
