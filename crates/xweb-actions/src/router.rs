//! Request routing.
//!
//! The [`Router`] owns the route table and the application state. For each
//! request it stamps the `Server` and `Date` headers, resolves the path
//! (exact, then patterns in registration order, then default index names),
//! and hands the request to the dispatcher or the static file delegate.
//! `HEAD` is matched as `GET`.

use std::sync::Arc;

use chrono::Utc;
use http::{Method, StatusCode};
use serde_json::Value;

use xweb_core::Settings;
use xweb_http::urls::{is_pattern_source, PatternError, RoutePattern, RouteTable};
use xweb_http::{http_date, HttpRequest, HttpResponse};

use crate::action::ActionDescriptor;
use crate::context::AppState;
use crate::dispatcher;
use crate::static_files::StaticFiles;

/// What a route leads to.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// An action run through the dispatcher.
    Action(ActionDescriptor),
    /// A file under the static root.
    Static,
}

impl RouteTarget {
    fn allows(&self, method: &Method) -> bool {
        match self {
            Self::Action(descriptor) => descriptor.allows(method),
            Self::Static => *method == Method::GET,
        }
    }
}

/// Outcome of [`Router::route`].
#[derive(Debug)]
pub enum Routed {
    /// A route handled the request.
    Handled(HttpResponse),
    /// Nothing matched. The response carries only the router's headers.
    NotFound(HttpResponse),
}

impl Routed {
    /// Returns `true` if a route handled the request.
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// Converts the outcome into a response, turning a miss into `404 Not Found`.
    pub fn into_response(self) -> HttpResponse {
        match self {
            Self::Handled(response) => response,
            Self::NotFound(mut response) => {
                response.abort(StatusCode::NOT_FOUND, "Not Found");
                response
            }
        }
    }
}

/// Maps requests to actions and static files.
#[derive(Debug)]
pub struct Router {
    table: RouteTable<RouteTarget>,
    app: Arc<AppState>,
    static_files: StaticFiles,
}

impl Router {
    /// Creates a router using `settings.default_index` as the default index list.
    pub fn new(settings: Settings) -> Self {
        let mut table = RouteTable::new();
        table.set_default_index(settings.default_index.iter().cloned());
        Self {
            table,
            static_files: StaticFiles::new(&settings),
            app: Arc::new(AppState::new(settings)),
        }
    }

    /// Returns the application state.
    pub const fn app(&self) -> &Arc<AppState> {
        &self.app
    }

    /// Returns the settings.
    pub fn settings(&self) -> &Settings {
        self.app.settings()
    }

    /// Returns the route table.
    pub const fn table(&self) -> &RouteTable<RouteTarget> {
        &self.table
    }

    /// Sets a shared variable copied into every request context.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        Arc::make_mut(&mut self.app).set_var(key, value);
    }

    /// Replaces the default index list.
    pub fn set_default_index<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.set_default_index(names);
    }

    /// Registers an action under a literal path.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::ArityMismatch`] if the handler expects captures.
    pub fn add_exact(
        &mut self,
        path: &str,
        descriptor: ActionDescriptor,
    ) -> Result<(), PatternError> {
        if descriptor.arity() != 0 {
            return Err(PatternError::ArityMismatch {
                pattern: path.to_string(),
                captures: 0,
                expected: descriptor.arity(),
            });
        }
        self.table
            .register_exact(path, RouteTarget::Action(descriptor));
        Ok(())
    }

    /// Registers an action under a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Compile`] for an invalid pattern and
    /// [`PatternError::ArityMismatch`] when the capture count differs from
    /// the handler's parameter count. Nothing is registered on error.
    pub fn add_pattern(
        &mut self,
        source: &str,
        descriptor: ActionDescriptor,
    ) -> Result<(), PatternError> {
        let pattern = RoutePattern::compile(source)?;
        if pattern.capture_count() != descriptor.arity() {
            return Err(PatternError::ArityMismatch {
                pattern: source.to_string(),
                captures: pattern.capture_count(),
                expected: descriptor.arity(),
            });
        }
        self.table
            .register_compiled(pattern, RouteTarget::Action(descriptor));
        Ok(())
    }

    /// Registers an action, treating `path` as a pattern if it contains regex
    /// metacharacters and as a literal otherwise.
    pub fn add_route(
        &mut self,
        path: &str,
        descriptor: ActionDescriptor,
    ) -> Result<(), PatternError> {
        if is_pattern_source(path) {
            self.add_pattern(path, descriptor)
        } else {
            self.add_exact(path, descriptor)
        }
    }

    /// Serves the static file behind `path`.
    pub fn add_static(&mut self, path: &str) {
        self.table.register_exact(path, RouteTarget::Static);
    }

    /// Returns an empty response carrying the `Server` and `Date` headers.
    pub fn new_response(&self) -> HttpResponse {
        let mut response = HttpResponse::new();
        response.set_header("Server", &self.settings().server_name);
        response.set_header("Date", &http_date(Utc::now()));
        response
    }

    /// Routes one request.
    pub fn route(&self, request: HttpRequest) -> Routed {
        let response = self.new_response();

        let method = if request.method() == Method::HEAD {
            Method::GET
        } else {
            request.method().clone()
        };

        let Some(found) = self
            .table
            .resolve_where(request.path(), |target| target.allows(&method))
        else {
            tracing::debug!(method = %method, path = request.path(), "no route matched");
            return Routed::NotFound(response);
        };

        tracing::debug!(
            path = request.path(),
            route = %found.route,
            kind = ?found.kind,
            "route matched"
        );

        let response = match found.target {
            RouteTarget::Action(descriptor) => {
                dispatcher::dispatch(descriptor, request, response, &self.app, found.captures)
            }
            RouteTarget::Static => self.static_files.serve(&request, &found.route, response),
        };
        Routed::Handled(response)
    }
}
