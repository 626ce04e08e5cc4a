//! HTTP response sink.
//!
//! [`HttpResponse`] is the buffered response an action writes into: a status,
//! a header map, and a body. Once [`abort`](HttpResponse::abort) or
//! [`finish`](HttpResponse::finish) has been called the response is committed
//! and further writes are rejected.

use axum::response::IntoResponse;
use chrono::{DateTime, NaiveDateTime, Utc};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};

use xweb_core::{XwebError, XwebResult};

/// Format string for RFC 1123 dates as used in HTTP headers.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Formats a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use xweb_http::http_date;
///
/// let t = chrono::Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
/// assert_eq!(http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parses an HTTP date produced by [`http_date`].
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// A buffered HTTP response.
///
/// # Examples
///
/// ```
/// use xweb_http::HttpResponse;
///
/// let mut response = HttpResponse::new();
/// response.set_header("Content-Type", "text/plain");
/// response.write(b"hello").unwrap();
/// assert_eq!(response.body(), b"hello");
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    finished: bool,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponse {
    /// Creates an empty `200 OK` response.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            finished: false,
        }
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns a reference to the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets a header, replacing any previous value.
    ///
    /// Invalid header names or values are dropped with a warning.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid response header"),
        }
    }

    /// Appends a header value without replacing existing ones.
    pub fn append_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid response header"),
        }
    }

    /// Returns a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the body bytes written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Appends bytes to the body.
    ///
    /// # Errors
    ///
    /// Returns [`XwebError::ResponseFinished`] once the response is committed.
    pub fn write(&mut self, bytes: &[u8]) -> XwebResult<usize> {
        if self.finished {
            return Err(XwebError::ResponseFinished);
        }
        self.body.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Replaces the body with `body`, sets `status`, and commits the response.
    pub fn abort(&mut self, status: StatusCode, body: &str) {
        self.status = status;
        self.body = body.as_bytes().to_vec();
        self.set_header("Content-Length", &self.body.len().to_string());
        self.finished = true;
    }

    /// Commits the response; later writes fail.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Returns `true` once the response has been committed.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(axum::body::Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Infers a MIME type from a file extension.
pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_new_response_defaults() {
        let response = HttpResponse::new();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
        assert!(response.headers().is_empty());
        assert!(!response.is_finished());
    }

    #[test]
    fn test_write_appends() {
        let mut response = HttpResponse::new();
        assert_eq!(response.write(b"ab").unwrap(), 2);
        response.write(b"cd").unwrap();
        assert_eq!(response.text(), "abcd");
    }

    #[test]
    fn test_write_after_finish_fails() {
        let mut response = HttpResponse::new();
        response.finish();
        assert!(matches!(
            response.write(b"late"),
            Err(XwebError::ResponseFinished)
        ));
    }

    #[test]
    fn test_abort_replaces_body_and_commits() {
        let mut response = HttpResponse::new();
        response.write(b"partial").unwrap();
        response.abort(StatusCode::INTERNAL_SERVER_ERROR, "Server Error");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "Server Error");
        assert_eq!(response.header("content-length"), Some("12"));
        assert!(response.is_finished());
        assert!(response.write(b"x").is_err());
    }

    #[test]
    fn test_set_header_replaces() {
        let mut response = HttpResponse::new();
        response.set_header("Content-Type", "text/html");
        response.set_header("content-type", "text/plain");
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_append_header_keeps_both() {
        let mut response = HttpResponse::new();
        response.append_header("Set-Cookie", "a=1; Path=/");
        response.append_header("Set-Cookie", "b=2; Path=/");
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
    }

    #[test]
    fn test_set_header_invalid_is_dropped() {
        let mut response = HttpResponse::new();
        response.set_header("bad header", "x");
        response.set_header("X-Ok", "line\nbreak");
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_http_date_round_trip() {
        let t = Utc.with_ymd_and_hms(2024, 2, 29, 23, 5, 1).unwrap();
        let formatted = http_date(t);
        assert_eq!(formatted, "Thu, 29 Feb 2024 23:05:01 GMT");
        assert_eq!(parse_http_date(&formatted), Some(t));
    }

    #[test]
    fn test_parse_http_date_invalid() {
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_into_axum_response() {
        let mut response = HttpResponse::new();
        response.set_header("X-Test", "1");
        response.abort(StatusCode::NOT_FOUND, "Not Found");
        let axum_response = response.into_response();
        assert_eq!(axum_response.status(), StatusCode::NOT_FOUND);
        assert_eq!(axum_response.headers().get("x-test").unwrap(), "1");
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("CSS"), "text/css; charset=utf-8");
        assert_eq!(mime_from_extension("png"), "image/png");
        assert_eq!(mime_from_extension("unknown"), "application/octet-stream");
    }
}
