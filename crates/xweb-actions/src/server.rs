//! HTTP server integration.
//!
//! [`XwebApp`] collects settings, shared variables and routes, and turns them
//! into an axum router or a running server. Request bodies are read up to
//! `max_upload_size`; larger bodies get `413 Payload Too Large`. Every
//! request is routed on a blocking worker thread, so actions may block freely.
//!
//! # Examples
//!
//! ```no_run
//! use xweb_actions::action::{Action, ActionDescriptor};
//! use xweb_actions::context::RequestContext;
//! use xweb_actions::server::XwebApp;
//! use xweb_core::Settings;
//!
//! struct Home {
//!     ctx: RequestContext,
//! }
//!
//! impl Action for Home {
//!     fn new(ctx: RequestContext) -> Self {
//!         Self { ctx }
//!     }
//!     fn context(&self) -> &RequestContext {
//!         &self.ctx
//!     }
//!     fn context_mut(&mut self) -> &mut RequestContext {
//!         &mut self.ctx
//!     }
//! }
//!
//! impl Home {
//!     fn index(&mut self) -> &'static str {
//!         "Hello!"
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = XwebApp::new(Settings::default())
//!     .route("/", ActionDescriptor::new("index", Home::index))?;
//! // app.run("0.0.0.0:8000").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::any;
use http::StatusCode;
use http_body_util::LengthLimitError;
use serde_json::Value;

use xweb_core::logging::request_span;
use xweb_core::{Settings, XwebError};
use xweb_http::urls::PatternError;
use xweb_http::{HttpRequest, HttpResponse};

use crate::action::ActionDescriptor;
use crate::dispatcher::SERVER_ERROR_BODY;
use crate::router::Router;

/// The application builder.
pub struct XwebApp {
    router: Router,
}

impl XwebApp {
    /// Creates an application with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            router: Router::new(settings),
        }
    }

    /// Registers an action route; see [`Router::add_route`].
    pub fn route(
        mut self,
        path: &str,
        descriptor: ActionDescriptor,
    ) -> Result<Self, PatternError> {
        self.router.add_route(path, descriptor)?;
        Ok(self)
    }

    /// Registers a static file route.
    #[must_use]
    pub fn static_file(mut self, path: &str) -> Self {
        self.router.add_static(path);
        self
    }

    /// Sets a shared variable copied into every request.
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.router.set_var(key, value);
        self
    }

    /// Replaces the default index list.
    #[must_use]
    pub fn default_index<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.router.set_default_index(names);
        self
    }

    /// Returns the settings.
    pub fn settings(&self) -> &Settings {
        self.router.settings()
    }

    /// Returns the router.
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Converts the application into an axum router catching every path.
    pub fn into_axum_router(self) -> axum::Router {
        let router = Arc::new(self.router);

        let handler = move |req: Request<Body>| {
            let router = Arc::clone(&router);

            async move {
                let (parts, body) = req.into_parts();
                let limit = router.settings().max_upload_size;
                let body_bytes = match axum::body::to_bytes(body, limit).await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        let status = if is_length_limit(&err) {
                            StatusCode::PAYLOAD_TOO_LARGE
                        } else {
                            StatusCode::BAD_REQUEST
                        };
                        tracing::warn!(
                            method = %parts.method,
                            path = parts.uri.path(),
                            error = %err,
                            limit,
                            "failed to read request body"
                        );
                        let mut response = router.new_response();
                        response.abort(status, status.canonical_reason().unwrap_or_default());
                        return response.into_response();
                    }
                };

                let request = HttpRequest::from_parts(parts, body_bytes);
                let request_id = uuid::Uuid::new_v4().to_string();
                let span = request_span(&request_id, request.method().as_str(), request.path());

                let worker = Arc::clone(&router);
                let routed = tokio::task::spawn_blocking(move || {
                    let _guard = span.enter();
                    worker.route(request).into_response()
                })
                .await;

                match routed {
                    Ok(response) => response.into_response(),
                    Err(err) => {
                        tracing::error!(error = %err, "request worker failed");
                        let mut response = router.new_response();
                        response.abort(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY);
                        response.into_response()
                    }
                }
            }
        };

        axum::Router::new()
            .route("/{*path}", any(handler.clone()))
            .route("/", any(handler))
    }

    /// Runs the application as an HTTP server on `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the server stops with an error.
    pub async fn run(self, addr: &str) -> Result<(), XwebError> {
        let debug = self.settings().debug;
        let router = self.into_axum_router();
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            XwebError::ConfigurationError(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| XwebError::InternalServerError(format!("Server error: {e}")))?;

        Ok(())
    }
}

/// Returns `true` if reading the body stopped at the configured size limit.
fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

impl std::fmt::Debug for XwebApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XwebApp")
            .field("exact_routes", &self.router.table().exact_len())
            .field("pattern_routes", &self.router.table().pattern_len())
            .field("debug", &self.settings().debug)
            .finish()
    }
}
