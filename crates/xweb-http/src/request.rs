//! HTTP request type.
//!
//! [`HttpRequest`] carries the method, path, headers, query parameters and
//! raw body of an inbound request. The form is parsed on demand by
//! [`HttpRequest::parse_form`], which merges body parameters with the query
//! string the way a browser form submission expects.

use std::collections::HashMap;
use std::sync::OnceLock;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};

use xweb_core::{XwebError, XwebResult};

use crate::cookies;
use crate::querydict::QueryDict;
use crate::upload::{self, UploadedFile};

/// An inbound HTTP request.
///
/// # Examples
///
/// ```
/// use xweb_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/user/42")
///     .query_string("tab=posts")
///     .build();
///
/// assert_eq!(request.path(), "/user/42");
/// assert_eq!(request.query().get("tab"), Some("posts"));
/// ```
#[derive(Debug)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    query: QueryDict,
    form: QueryDict,
    form_parsed: bool,
    files: HashMap<String, Vec<UploadedFile>>,
    cached_cookies: OnceLock<HashMap<String, String>>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from the parts of an `http` request and its body bytes.
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        let path = parts.uri.path().to_string();
        let query_string = parts.uri.query().unwrap_or("").to_string();
        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Self::assemble(
            parts.method,
            path,
            query_string,
            content_type,
            parts.headers,
            body,
        )
    }

    fn assemble(
        method: Method,
        path: String,
        query_string: String,
        content_type: Option<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        let query = QueryDict::parse(&query_string);
        Self {
            method,
            path,
            query_string,
            content_type,
            headers,
            body,
            form: query.clone(),
            query,
            form_parsed: false,
            files: HashMap::new(),
            cached_cookies: OnceLock::new(),
        }
    }

    /// Returns the HTTP method as sent by the client.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the content type of the request body, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns `true` if the body is `multipart/form-data`.
    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw request body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the query string parameters.
    pub const fn query(&self) -> &QueryDict {
        &self.query
    }

    /// Returns the form parameters: body values first, then query values.
    ///
    /// Before [`parse_form`](Self::parse_form) has run this holds only the
    /// query parameters.
    pub const fn form(&self) -> &QueryDict {
        &self.form
    }

    /// Returns the first form value for `name`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name)
    }

    /// Returns the uploaded files parsed from a multipart body.
    pub const fn files(&self) -> &HashMap<String, Vec<UploadedFile>> {
        &self.files
    }

    /// Parses the request body into the form.
    ///
    /// Only `POST`, `PUT` and `PATCH` bodies are read. URL-encoded bodies are
    /// decoded directly; multipart bodies are limited to `max_upload_size`
    /// bytes. Parsing runs once; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`XwebError::PayloadTooLarge`] for an oversized multipart body
    /// and [`XwebError::BadRequest`] for malformed multipart data. On error
    /// the form keeps only the query parameters.
    pub fn parse_form(&mut self, max_upload_size: usize) -> XwebResult<()> {
        if self.form_parsed {
            return Ok(());
        }
        self.form_parsed = true;

        if !matches!(self.method, Method::POST | Method::PUT | Method::PATCH) {
            return Ok(());
        }

        let mut body_form = if self.is_multipart() {
            self.parse_multipart_body(max_upload_size)?
        } else if self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        {
            QueryDict::parse(&String::from_utf8_lossy(&self.body))
        } else {
            return Ok(());
        };

        body_form.merge(self.query.clone());
        self.form = body_form;
        Ok(())
    }

    fn parse_multipart_body(&mut self, max_upload_size: usize) -> XwebResult<QueryDict> {
        if self.body.len() > max_upload_size {
            return Err(XwebError::PayloadTooLarge {
                size: self.body.len(),
                limit: max_upload_size,
            });
        }

        let boundary = self
            .content_type
            .as_deref()
            .and_then(upload::extract_boundary)
            .ok_or_else(|| XwebError::BadRequest("multipart request has no boundary".to_string()))?;

        let data = upload::parse_multipart(&self.body, boundary)?;
        let mut form = QueryDict::new();
        for (name, value) in &data.fields {
            form.append(name, value);
        }
        self.files = data.files;
        Ok(form)
    }

    /// Parses cookies from the `Cookie` header. Cached after the first call.
    pub fn cookies(&self) -> &HashMap<String, String> {
        self.cached_cookies.get_or_init(|| {
            self.headers
                .get_all(http::header::COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| cookies::parse_cookie_header(v).into_iter())
                .collect()
        })
    }

    /// Gets a specific cookie value by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().get(name).map(String::as_str)
    }
}

/// Builder for constructing [`HttpRequest`] instances, mostly in tests.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            content_type: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Sets the content type; also sent as the `Content-Type` header.
    #[must_use]
    pub fn content_type(mut self, ct: &str) -> Self {
        self.content_type = Some(ct.to_string());
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the [`HttpRequest`].
    pub fn build(mut self) -> HttpRequest {
        if let Some(value) = self
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
        {
            self.headers.insert(http::header::CONTENT_TYPE, value);
        }
        HttpRequest::assemble(
            self.method,
            self.path,
            self.query_string,
            self.content_type,
            self.headers,
            Bytes::from(self.body),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multipart(boundary: &str, fields: &[(&str, &str)]) -> Vec<u8> {
        let mut out = String::new();
        for (name, value) in fields {
            out.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        out.push_str(&format!("--{boundary}--\r\n"));
        out.into_bytes()
    }

    #[test]
    fn test_builder_defaults() {
        let request = HttpRequest::builder().build();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.query().is_empty());
        assert!(request.form().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_from_parts() {
        let (parts, ()) = http::Request::builder()
            .method("POST")
            .uri("/login?next=%2Fhome")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(())
            .unwrap()
            .into_parts();
        let request = HttpRequest::from_parts(parts, Bytes::from_static(b"user=ann"));
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/login");
        assert_eq!(request.query_string(), "next=%2Fhome");
        assert_eq!(request.query().get("next"), Some("/home"));
        assert_eq!(
            request.content_type(),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_form_before_parse_holds_query() {
        let request = HttpRequest::builder().query_string("page=2").build();
        assert_eq!(request.form_value("page"), Some("2"));
    }

    #[test]
    fn test_parse_form_urlencoded_body_first() {
        let mut request = HttpRequest::builder()
            .method(Method::POST)
            .query_string("name=query&page=3")
            .content_type("application/x-www-form-urlencoded")
            .body("name=body")
            .build();
        request.parse_form(1024).unwrap();
        assert_eq!(request.form_value("name"), Some("body"));
        assert_eq!(request.form().get_list("name").map(Vec::len), Some(2));
        assert_eq!(request.form_value("page"), Some("3"));
    }

    #[test]
    fn test_parse_form_ignores_get_body() {
        let mut request = HttpRequest::builder()
            .content_type("application/x-www-form-urlencoded")
            .body("a=1")
            .build();
        request.parse_form(1024).unwrap();
        assert!(!request.form().contains_key("a"));
    }

    #[test]
    fn test_parse_form_multipart() {
        let mut request = HttpRequest::builder()
            .method(Method::POST)
            .content_type("multipart/form-data; boundary=XB")
            .body(multipart("XB", &[("title", "Hi"), ("_xsrf", "tok")]))
            .build();
        assert!(request.is_multipart());
        request.parse_form(1024).unwrap();
        assert_eq!(request.form_value("title"), Some("Hi"));
        assert_eq!(request.form_value("_xsrf"), Some("tok"));
    }

    #[test]
    fn test_parse_form_multipart_too_large() {
        let mut request = HttpRequest::builder()
            .method(Method::POST)
            .query_string("q=1")
            .content_type("multipart/form-data; boundary=XB")
            .body(multipart("XB", &[("title", "a fairly long value")]))
            .build();
        let err = request.parse_form(8).unwrap_err();
        assert!(matches!(err, XwebError::PayloadTooLarge { limit: 8, .. }));
        assert_eq!(request.form_value("q"), Some("1"));
        assert!(!request.form().contains_key("title"));
    }

    #[test]
    fn test_parse_form_multipart_missing_boundary() {
        let mut request = HttpRequest::builder()
            .method(Method::POST)
            .content_type("multipart/form-data")
            .body("whatever")
            .build();
        assert!(matches!(
            request.parse_form(1024),
            Err(XwebError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_form_runs_once() {
        let mut request = HttpRequest::builder()
            .method(Method::POST)
            .content_type("multipart/form-data")
            .body("bad")
            .build();
        assert!(request.parse_form(1024).is_err());
        assert!(request.parse_form(1024).is_ok());
    }

    #[test]
    fn test_cookies() {
        let request = HttpRequest::builder()
            .header("Cookie", "_xsrf=abc; theme=dark")
            .build();
        assert_eq!(request.cookie("_xsrf"), Some("abc"));
        assert_eq!(request.cookie("theme"), Some("dark"));
        assert_eq!(request.cookie("missing"), None);
    }

    #[test]
    fn test_header_lookup() {
        let request = HttpRequest::builder()
            .header("Accept-Encoding", "gzip, deflate")
            .build();
        assert_eq!(request.header("accept-encoding"), Some("gzip, deflate"));
    }
}
