//! # xweb
//!
//! An action-based web framework for Rust.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on `xweb`
//! for everything, or on the individual crates for finer-grained control.

/// Settings, error types, and logging setup.
pub use xweb_core as core;

/// Request, response, cookies, forms, and the route table.
pub use xweb_http as http;

/// Actions, the dispatcher, the router, static files, and the server.
pub use xweb_actions as actions;

pub use axum;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Commonly used items.
pub mod prelude {
    pub use xweb_actions::{
        Action, ActionDescriptor, ActionOutput, AfterHook, AppState, BeforeHook, FormValues,
        Initializable, RequestContext, Router, XwebApp,
    };
    pub use xweb_core::{Settings, XwebError, XwebResult};
    pub use xweb_http::{Cookie, HttpRequest, HttpResponse};
}
