//! # xweb-core
//!
//! Core types, settings, and error types for the xweb framework.
//! Every other xweb crate builds on the types defined here.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`utils`] - Utility types (`MultiValueMap`)
//! - [`settings`] - Framework settings consumed by the router and dispatcher
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{XwebError, XwebResult};
pub use settings::Settings;
