//! Logging for xweb applications.
//!
//! [`setup_logging`] installs the process-wide `tracing` subscriber from
//! [`Settings`]. The router and dispatcher then log through `tracing`:
//! routing decisions at `debug`, swallowed form errors at `warn` (when
//! `log_form_errors` is set), and action panics or error results at `error`.
//!
//! The server wraps every request in a [`request_span`], so each event
//! carries the request id, method and path of the request it belongs to.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Filter used when `log_level` is not a valid directive.
const FALLBACK_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// `settings.log_level` is an [`EnvFilter`] directive such as `"info"` or
/// `"xweb_actions=debug"`. Debug builds of an app (`settings.debug`) get
/// pretty multi-line output with source locations; otherwise each event is
/// one JSON object per line. Only the first call installs anything.
pub fn setup_logging(settings: &Settings) {
    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|err| {
        eprintln!("invalid log_level {:?} ({err}), using {FALLBACK_FILTER}", settings.log_level);
        EnvFilter::new(FALLBACK_FILTER)
    });

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = if settings.debug {
        builder
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
    } else {
        builder.json().with_current_span(true).try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Creates the span that wraps one request from body read to response.
///
/// `id` identifies the request in logs; the server uses a v4 UUID.
///
/// # Examples
///
/// ```
/// use xweb_core::logging::request_span;
///
/// let span = request_span("5f0c", "POST", "/guestbook");
/// let _entered = span.enter();
/// tracing::info!("form accepted");
/// ```
pub fn request_span(id: &str, method: &str, path: &str) -> tracing::Span {
    tracing::info_span!("request", id, method, path)
}
