//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `XWEB_DEBUG` | `debug` |
//! | `XWEB_LOG_LEVEL` | `log_level` |
//! | `XWEB_SERVER_NAME` | `server_name` |
//! | `XWEB_BASE_PATH` | `base_path` |
//! | `XWEB_STATIC_DIR` | `static_dir` |
//! | `XWEB_MAX_UPLOAD_SIZE` | `max_upload_size` |
//! | `XWEB_CHECK_XSRF` | `check_xsrf` |
//! | `XWEB_ENABLE_GZIP` | `enable_gzip` |
//! | `XWEB_STATIC_EXTENSIONS_TO_GZIP` | `static_extensions_to_gzip` (comma-separated) |
//! | `XWEB_DEFAULT_INDEX` | `default_index` (comma-separated) |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use xweb_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/xweb.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::XwebError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, XwebError> {
    // Merge through serde_json::Value so omitted keys keep their defaults.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| XwebError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, XwebError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, XwebError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, XwebError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| XwebError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, XwebError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `XWEB_*` environment variable overrides to a settings struct.
///
/// Boolean values accept "true"/"1"/"yes" (case-insensitive); anything else is false.
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("XWEB_DEBUG") {
        settings.debug = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("XWEB_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("XWEB_SERVER_NAME") {
        settings.server_name = val;
    }

    if let Ok(val) = std::env::var("XWEB_BASE_PATH") {
        settings.base_path = val;
    }

    if let Ok(val) = std::env::var("XWEB_STATIC_DIR") {
        settings.static_dir = PathBuf::from(val);
    }

    if let Ok(val) = std::env::var("XWEB_MAX_UPLOAD_SIZE") {
        if let Ok(size) = val.parse::<usize>() {
            settings.max_upload_size = size;
        }
    }

    if let Ok(val) = std::env::var("XWEB_CHECK_XSRF") {
        settings.check_xsrf = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("XWEB_ENABLE_GZIP") {
        settings.enable_gzip = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("XWEB_STATIC_EXTENSIONS_TO_GZIP") {
        settings.static_extensions_to_gzip = split_list(&val);
    }

    if let Ok(val) = std::env::var("XWEB_DEFAULT_INDEX") {
        settings.default_index = split_list(&val);
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, XwebError> {
    std::fs::read_to_string(path).map_err(|e| {
        XwebError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, XwebError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        XwebError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        XwebError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            server_name = "edge"
            check_xsrf = false
            max_upload_size = 1024
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.server_name, "edge");
        assert!(!settings.check_xsrf);
        assert_eq!(settings.max_upload_size, 1024);
        // Defaults preserved
        assert_eq!(settings.xsrf_name, "_xsrf");
    }

    #[test]
    fn test_from_toml_str_lists() {
        let toml = r#"
            default_index = ["home.html"]
            static_extensions_to_gzip = [".css", ".js", ".svg"]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.default_index, vec!["home.html"]);
        assert_eq!(settings.static_extensions_to_gzip.len(), 3);
    }

    #[test]
    fn test_from_toml_str_vars() {
        let toml = r#"
            [vars]
            site = "example.org"
            year = 2024
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.vars["site"], "example.org");
        assert_eq!(settings.vars["year"], 2024);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.server_name, "xweb");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(XwebError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("max_upload_size = \"lots\"");
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "static_dir": "public",
            "enable_gzip": false,
            "log_level": "debug"
        }"#;

        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.static_dir, PathBuf::from("public"));
        assert!(!settings.enable_gzip);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.base_path, "/");
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/nonexistent/xweb.toml");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/xweb.toml"));
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("YES"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" .css, .js ,,"), vec![".css", ".js"]);
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        let over = serde_json::json!({"a": {"y": 20}});
        let merged = merge_json(base, over);
        assert_eq!(merged, serde_json::json!({"a": {"x": 1, "y": 20}, "b": 3}));
    }
}
