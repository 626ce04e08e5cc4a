//! Per-request context handed to every action.
//!
//! A [`RequestContext`] owns the inbound request, the response being built,
//! and a private copy of the application's shared variables. It is created
//! fresh for each request and never shared between requests.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;

use xweb_core::{Settings, XwebResult};
use xweb_http::{Cookie, HttpRequest, HttpResponse};

/// Process-wide application state.
///
/// Built once at startup and read-only while serving.
#[derive(Debug, Clone)]
pub struct AppState {
    settings: Settings,
    vars: HashMap<String, Value>,
}

impl AppState {
    /// Creates the state, seeding the shared variables from `settings.vars`.
    pub fn new(settings: Settings) -> Self {
        let vars = settings.vars.clone();
        Self { settings, vars }
    }

    /// Returns the settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the shared variables.
    pub const fn vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    /// Sets a shared variable. Only meaningful before serving starts.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(key.into(), value.into());
    }
}

/// Everything an action can see about the current request.
#[derive(Debug)]
pub struct RequestContext {
    request: HttpRequest,
    app: Arc<AppState>,
    response: HttpResponse,
    vars: HashMap<String, Value>,
    xsrf_token: Option<String>,
}

impl RequestContext {
    /// Creates a context. The application variables are copied, so changes
    /// made through [`set_var`](Self::set_var) stay local to this request.
    pub fn new(request: HttpRequest, app: Arc<AppState>, response: HttpResponse) -> Self {
        let vars = app.vars().clone();
        Self {
            request,
            app,
            response,
            vars,
            xsrf_token: None,
        }
    }

    /// Returns the request.
    pub const fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Returns the application state.
    pub const fn app(&self) -> &Arc<AppState> {
        &self.app
    }

    /// Shortcut for the application settings.
    pub fn settings(&self) -> &Settings {
        self.app.settings()
    }

    /// Returns the response under construction.
    pub const fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// Returns the response under construction, mutably.
    pub fn response_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    /// Moves the response out, leaving an empty one behind.
    pub fn take_response(&mut self) -> HttpResponse {
        std::mem::take(&mut self.response)
    }

    /// Returns this request's variables.
    pub const fn vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    /// Returns one of this request's variables.
    pub fn var(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Sets a variable for this request only.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Returns the first form value for `name`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.request.form_value(name)
    }

    /// Returns a request cookie.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.request.cookie(name)
    }

    /// Sets a response header.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    /// Adds a `Set-Cookie` header.
    pub fn set_cookie(&mut self, cookie: &Cookie) {
        self.response
            .append_header("Set-Cookie", &cookie.to_set_cookie_header());
    }

    /// Appends to the response body.
    pub fn write(&mut self, bytes: &[u8]) -> XwebResult<usize> {
        self.response.write(bytes)
    }

    /// Appends text to the response body.
    pub fn write_str(&mut self, text: &str) -> XwebResult<usize> {
        self.response.write(text.as_bytes())
    }

    /// Ends the request with `status` and a plain body.
    pub fn abort(&mut self, status: StatusCode, body: &str) {
        self.response.abort(status, body);
    }

    /// Redirects with `302 Found`.
    pub fn redirect(&mut self, location: &str) {
        self.response.set_header("Location", location);
        self.response.abort(StatusCode::FOUND, "");
    }

    /// Returns the anti-forgery token, issuing a cookie when the client has none.
    ///
    /// The same token is returned for the rest of the request.
    pub fn xsrf_token(&mut self) -> String {
        if let Some(token) = &self.xsrf_token {
            return token.clone();
        }

        let name = self.app.settings().xsrf_name.clone();
        let existing = self
            .request
            .cookie(&name)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let token = match existing {
            Some(existing) => existing,
            None => {
                let token = uuid::Uuid::new_v4().simple().to_string();
                self.set_cookie(&Cookie::new(name, token.clone()).httponly(true));
                token
            }
        };
        self.xsrf_token = Some(token.clone());
        token
    }

    /// Returns a hidden form input carrying the anti-forgery token.
    pub fn xsrf_form_html(&mut self) -> String {
        let token = self.xsrf_token();
        format!(
            "<input type=\"hidden\" name=\"{}\" value=\"{token}\" />",
            self.app.settings().xsrf_name
        )
    }
}
