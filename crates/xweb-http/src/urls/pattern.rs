//! Regex route patterns.
//!
//! A [`RoutePattern`] accepts a path only when the pattern's match spans the
//! whole path; a match covering just a prefix or an inner substring is
//! rejected. Capture groups (excluding the whole match) become the positional
//! arguments of the matched route.

use std::fmt;

use regex::Regex;

use xweb_core::XwebError;

/// Characters that mark a route path as a regular expression.
///
/// `.` is left out so literal file routes such as `/favicon.ico` stay exact.
const PATTERN_METACHARACTERS: &[char] = &[
    '*', '?', '+', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\',
];

/// Errors raised while registering a pattern route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern source is not a valid regular expression.
    #[error("invalid route pattern '{pattern}': {message}")]
    Compile {
        /// The offending pattern source.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },

    /// The number of capture groups differs from the handler's argument count.
    #[error(
        "route pattern '{pattern}' has {captures} capture group(s) but its handler takes {expected} argument(s)"
    )]
    ArityMismatch {
        /// The pattern source.
        pattern: String,
        /// Capture groups in the pattern.
        captures: usize,
        /// Arguments the handler accepts.
        expected: usize,
    },
}

impl From<PatternError> for XwebError {
    fn from(err: PatternError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

/// Returns `true` if `path` should be registered as a pattern rather than an
/// exact route.
///
/// # Examples
///
/// ```
/// use xweb_http::urls::is_pattern_source;
///
/// assert!(is_pattern_source(r"/user/(\d+)"));
/// assert!(is_pattern_source("/files/.*"));
/// assert!(!is_pattern_source("/static/app.css"));
/// ```
pub fn is_pattern_source(path: &str) -> bool {
    path.contains(PATTERN_METACHARACTERS)
}

/// A compiled route pattern.
#[derive(Clone)]
pub struct RoutePattern {
    regex: Regex,
    capture_count: usize,
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("source", &self.regex.as_str())
            .field("capture_count", &self.capture_count)
            .finish()
    }
}

impl RoutePattern {
    /// Compiles a pattern source.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Compile`] if the source is not a valid regex.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(source).map_err(|e| PatternError::Compile {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;
        let capture_count = regex.captures_len().saturating_sub(1);
        Ok(Self {
            regex,
            capture_count,
        })
    }

    /// Returns the pattern source.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the number of capture groups, excluding the whole match.
    pub const fn capture_count(&self) -> usize {
        self.capture_count
    }

    /// Matches `path`, returning the captured groups in order.
    ///
    /// The leftmost match must span the entire path. Groups that did not
    /// participate in the match are returned as empty strings.
    pub fn full_match(&self, path: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(path)?;
        let whole = captures.get(0)?;
        if whole.len() != path.len() {
            return None;
        }

        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_counts_groups() {
        let p = RoutePattern::compile(r"/post/(\d+)/(\w+)").unwrap();
        assert_eq!(p.capture_count(), 2);
        assert_eq!(p.source(), r"/post/(\d+)/(\w+)");
    }

    #[test]
    fn test_compile_non_capturing_groups_not_counted() {
        let p = RoutePattern::compile(r"/(?:a|b)/(\d+)").unwrap();
        assert_eq!(p.capture_count(), 1);
    }

    #[test]
    fn test_compile_invalid() {
        let err = RoutePattern::compile(r"/user/(\d+").unwrap_err();
        match err {
            PatternError::Compile { pattern, message } => {
                assert_eq!(pattern, r"/user/(\d+");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_full_match_captures() {
        let p = RoutePattern::compile(r"/user/(\d+)").unwrap();
        assert_eq!(p.full_match("/user/123"), Some(vec!["123".to_string()]));
    }

    #[test]
    fn test_prefix_match_rejected() {
        let p = RoutePattern::compile(r"/user/(\d+)").unwrap();
        assert_eq!(p.full_match("/user/123/extra"), None);
    }

    #[test]
    fn test_inner_match_rejected() {
        let p = RoutePattern::compile(r"user/(\d+)").unwrap();
        assert_eq!(p.full_match("/user/1"), None);
    }

    #[test]
    fn test_optional_group_is_empty() {
        let p = RoutePattern::compile(r"/a(/b)?").unwrap();
        assert_eq!(p.full_match("/a"), Some(vec![String::new()]));
        assert_eq!(p.full_match("/a/b"), Some(vec!["/b".to_string()]));
    }

    #[test]
    fn test_is_pattern_source() {
        assert!(is_pattern_source("/a/*"));
        assert!(is_pattern_source("/a?"));
        assert!(is_pattern_source(r"/(\w+)"));
        assert!(!is_pattern_source("/index.html"));
        assert!(!is_pattern_source("/"));
    }

    #[test]
    fn test_error_into_xweb_error() {
        let err: XwebError = PatternError::ArityMismatch {
            pattern: "/(a)".to_string(),
            captures: 1,
            expected: 0,
        }
        .into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("1 capture group"));
    }
}
