//! # xweb-actions
//!
//! Action layer for the xweb framework: the [`Action`](action::Action) trait
//! and its optional lifecycle hooks, form binding, the per-request
//! [`RequestContext`](context::RequestContext), the dispatcher that runs an
//! action's lifecycle, the [`Router`](router::Router), the static file
//! delegate, and the axum-backed [`XwebApp`](server::XwebApp).

pub mod action;
pub mod binding;
pub mod context;
pub mod dispatcher;
pub mod router;
pub mod server;
pub mod static_files;

pub use action::{
    Action, ActionDescriptor, ActionOutput, AfterHook, BeforeHook, Handler, Initializable,
    IntoActionOutput,
};
pub use binding::{FormValues, FromFormValue};
pub use context::{AppState, RequestContext};
pub use router::{Routed, Router};
pub use server::XwebApp;
