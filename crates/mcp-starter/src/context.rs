//! Template context handling
//!
//! A context maps template variable names to values. Values are almost always
//! strings ("y"/"n" flags, choices, names); hooks may add computed arrays.

use serde_json::{Map, Value};
use thiserror::Error;

/// Template variables, in declaration order
pub type Context = Map<String, Value>;

/// Errors raised while building or validating a context
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("invalid value '{value}' for '{field}' (expected one of: {})", .allowed.join(", "))]
    InvalidChoice {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("invalid variable '{0}', expected KEY=VALUE")]
    MalformedPair(String),

    #[error("invalid project_slug '{0}': use letters, digits and underscores, not starting with a digit")]
    InvalidSlug(String),
}

/// Derive a project slug from a display name: lowercase, spaces and dashes to underscores
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace([' ', '-'], "_")
}

/// Check that a slug works both as a single directory name and as a Python
/// package name
pub fn check_slug(slug: &str) -> Result<(), ContextError> {
    let mut chars = slug.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ContextError::InvalidSlug(slug.to_string()))
    }
}

/// Overlay `overrides` onto `base`, keeping the key order of `base`
pub fn merge(base: &Context, overrides: &Context) -> Context {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Parse KEY=VALUE strings into a context
pub fn parse_pairs(pairs: &[String]) -> Result<Context, ContextError> {
    let mut context = Context::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ContextError::MalformedPair(pair.clone()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ContextError::MalformedPair(pair.clone()));
        }
        context.insert(key.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(context)
}

/// Get a string value
pub fn get_str<'a>(context: &'a Context, key: &str) -> Option<&'a str> {
    context.get(key).and_then(Value::as_str)
}

/// Whether a value is present and non-empty
pub fn is_truthy(context: &Context, key: &str) -> bool {
    match context.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

/// Whether a yes/no flag is set to "y"
pub fn is_enabled(context: &Context, key: &str) -> bool {
    get_str(context, key) == Some("y")
}

/// Render a value the way a user would type it
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Check if a file is likely binary (should not be rendered)
pub fn is_binary_file(content: &[u8]) -> bool {
    // Check for null bytes in first 8KB
    let check_len = content.len().min(8192);
    content[..check_len].contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> Context {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Test Project"), "test_project");
        assert_eq!(slugify("my-mcp-server"), "my_mcp_server");
        assert_eq!(slugify("Weather Bot-2"), "weather_bot_2");
    }

    #[test]
    fn test_check_slug() {
        for slug in ["weather_bot", "_private", "server2"] {
            assert!(check_slug(slug).is_ok(), "{} should be accepted", slug);
        }
        for slug in ["", "2fast", "a/b", "..", "/abs", "my app", "weather_bot_<beta>"] {
            assert_eq!(check_slug(slug), Err(ContextError::InvalidSlug(slug.to_string())));
        }
    }

    #[test]
    fn test_merge_keeps_base_order() {
        let base = ctx(json!({"project_name": "a", "author_name": "b", "license": "MIT"}));
        let overrides = ctx(json!({"license": "GPL-3.0", "extra": "x"}));

        let merged = merge(&base, &overrides);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["project_name", "author_name", "license", "extra"]);
        assert_eq!(merged["license"], "GPL-3.0");
    }

    #[test]
    fn test_parse_pairs() {
        let context = parse_pairs(&[
            "project_name = Weather Bot".to_string(),
            "vector_db=qdrant".to_string(),
            "empty=".to_string(),
        ])
        .unwrap();

        assert_eq!(context["project_name"], "Weather Bot");
        assert_eq!(context["vector_db"], "qdrant");
        assert_eq!(context["empty"], "");
    }

    #[test]
    fn test_parse_pairs_rejects_malformed() {
        assert_eq!(
            parse_pairs(&["novalue".to_string()]),
            Err(ContextError::MalformedPair("novalue".to_string()))
        );
        assert!(parse_pairs(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_truthiness() {
        let context = ctx(json!({"a": "x", "b": "", "c": null, "d": [], "e": ["x"]}));
        assert!(is_truthy(&context, "a"));
        assert!(!is_truthy(&context, "b"));
        assert!(!is_truthy(&context, "c"));
        assert!(!is_truthy(&context, "d"));
        assert!(is_truthy(&context, "e"));
        assert!(!is_truthy(&context, "missing"));
    }

    #[test]
    fn test_is_enabled() {
        let context = ctx(json!({"use_docker": "y", "use_pre_commit": "n"}));
        assert!(is_enabled(&context, "use_docker"));
        assert!(!is_enabled(&context, "use_pre_commit"));
        assert!(!is_enabled(&context, "missing"));
    }

    #[test]
    fn test_is_binary() {
        assert!(!is_binary_file(b"Hello, world!"));
        assert!(is_binary_file(b"Hello\x00world"));
    }
}
