//! Settings system for the xweb framework.
//!
//! [`Settings`] holds the process-wide configuration consumed by the router,
//! the dispatcher, and the static file handler. It is loaded once at startup
//! (see [`settings_loader`](crate::settings_loader)) and treated as read-only
//! while requests are being served.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default multipart upload limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// The complete set of framework settings.
///
/// # Examples
///
/// ```
/// use xweb_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.check_xsrf);
/// assert_eq!(settings.xsrf_name, "_xsrf");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// Value of the `Server` response header.
    pub server_name: String,
    /// URL prefix the application is mounted under.
    pub base_path: String,

    // ── Request handling ─────────────────────────────────────────────

    /// Maximum accepted size of a multipart request body, in bytes.
    pub max_upload_size: usize,
    /// Whether swallowed form-parse errors are logged.
    pub log_form_errors: bool,
    /// Candidate file names tried for directory-style paths.
    pub default_index: Vec<String>,

    // ── Security ─────────────────────────────────────────────────────

    /// Whether POST requests must carry a matching XSRF cookie and form field.
    pub check_xsrf: bool,
    /// Name shared by the XSRF cookie and the XSRF form field.
    pub xsrf_name: String,

    // ── Static files ─────────────────────────────────────────────────

    /// Directory static files are served from.
    pub static_dir: PathBuf,
    /// Whether static files may be served compressed.
    pub enable_gzip: bool,
    /// File extensions eligible for compression (e.g. ".css").
    pub static_extensions_to_gzip: Vec<String>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "xweb_actions=trace").
    pub log_level: String,

    // ── Shared variables ─────────────────────────────────────────────

    /// Process-wide variables copied into every request context.
    pub vars: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,
            server_name: "xweb".to_string(),
            base_path: "/".to_string(),

            // Request handling
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            log_form_errors: false,
            default_index: vec!["index.html".to_string(), "index.htm".to_string()],

            // Security
            check_xsrf: true,
            xsrf_name: "_xsrf".to_string(),

            // Static files
            static_dir: PathBuf::from("static"),
            enable_gzip: true,
            static_extensions_to_gzip: vec![".css".to_string(), ".js".to_string()],

            // Logging
            log_level: "info".to_string(),

            // Shared variables
            vars: HashMap::new(),
        }
    }
}

impl Settings {
    /// Returns `true` if `file_name` ends with one of the compressible extensions.
    ///
    /// Comparison is case-insensitive. Always `false` when compression is disabled.
    pub fn is_compressible(&self, file_name: &str) -> bool {
        if !self.enable_gzip {
            return false;
        }
        let lower = file_name.to_lowercase();
        self.static_extensions_to_gzip
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.server_name, "xweb");
        assert_eq!(s.base_path, "/");
        assert_eq!(s.max_upload_size, 10 * 1024 * 1024);
        assert!(!s.log_form_errors);
        assert_eq!(s.default_index, vec!["index.html", "index.htm"]);
        assert!(s.check_xsrf);
        assert_eq!(s.xsrf_name, "_xsrf");
        assert_eq!(s.static_dir, PathBuf::from("static"));
        assert!(s.enable_gzip);
        assert_eq!(s.log_level, "info");
        assert!(s.vars.is_empty());
    }

    #[test]
    fn test_is_compressible() {
        let s = Settings::default();
        assert!(s.is_compressible("static/app.js"));
        assert!(s.is_compressible("static/SITE.CSS"));
        assert!(!s.is_compressible("static/logo.png"));
    }

    #[test]
    fn test_is_compressible_disabled() {
        let s = Settings {
            enable_gzip: false,
            ..Settings::default()
        };
        assert!(!s.is_compressible("static/app.js"));
    }
}
