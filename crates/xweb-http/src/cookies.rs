//! Cookie parsing and `Set-Cookie` formatting.

use std::collections::HashMap;

/// A cookie to be set on an HTTP response.
#[derive(Debug, Clone)]
pub struct Cookie {
    /// The cookie name.
    pub name: String,
    /// The cookie value.
    pub value: String,
    /// Maximum age in seconds. `None` means session cookie.
    pub max_age: Option<u64>,
    /// The path for which the cookie is valid.
    pub path: String,
    /// Whether the cookie should only be sent over HTTPS.
    pub secure: bool,
    /// Whether the cookie is inaccessible to JavaScript.
    pub httponly: bool,
}

impl Cookie {
    /// Creates a new session cookie valid for the whole site.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            path: "/".to_string(),
            secure: false,
            httponly: false,
        }
    }

    /// Sets the max age.
    #[must_use]
    pub const fn max_age(mut self, max_age: u64) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Sets the path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the secure flag.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the httponly flag.
    #[must_use]
    pub const fn httponly(mut self, httponly: bool) -> Self {
        self.httponly = httponly;
        self
    }

    /// Formats this cookie as a `Set-Cookie` header value.
    pub fn to_set_cookie_header(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];

        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={max_age}"));
        }

        parts.push(format!("Path={}", self.path));

        if self.secure {
            parts.push("Secure".to_string());
        }

        if self.httponly {
            parts.push("HttpOnly".to_string());
        }

        parts.join("; ")
    }
}

/// Parses a `Cookie` header value into a map of name-value pairs.
///
/// The header format is `name1=value1; name2=value2`. Entries without an
/// `=` sign are skipped.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for part in header.split(';') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((name, value)) = trimmed.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                cookies.insert(name.to_string(), value.trim().to_string());
            }
        }
    }

    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("_xsrf=abc123; theme=dark");
        assert_eq!(cookies.get("_xsrf").unwrap(), "abc123");
        assert_eq!(cookies.get("theme").unwrap(), "dark");
    }

    #[test]
    fn test_parse_cookie_header_malformed_entries() {
        let cookies = parse_cookie_header("novalue; ; =anon; ok=1");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("ok").unwrap(), "1");
    }

    #[test]
    fn test_parse_cookie_header_empty_value() {
        let cookies = parse_cookie_header("_xsrf=");
        assert_eq!(cookies.get("_xsrf").unwrap(), "");
    }

    #[test]
    fn test_set_cookie_header_defaults() {
        let cookie = Cookie::new("_xsrf", "token");
        assert_eq!(cookie.to_set_cookie_header(), "_xsrf=token; Path=/");
    }

    #[test]
    fn test_set_cookie_header_all_attributes() {
        let cookie = Cookie::new("sid", "v")
            .max_age(3600)
            .path("/app")
            .secure(true)
            .httponly(true);
        assert_eq!(
            cookie.to_set_cookie_header(),
            "sid=v; Max-Age=3600; Path=/app; Secure; HttpOnly"
        );
    }
}
