//! The action lifecycle.
//!
//! [`dispatch`] runs one matched action against one request:
//!
//! 1. parse the form (errors are swallowed, optionally logged)
//! 2. default `Content-Type: text/html; charset=utf-8`
//! 3. XSRF check on POST when enabled; failure ends the request with 500
//! 4. construct the action around a fresh [`RequestContext`]
//! 5. bind form values
//! 6. `init` hook
//! 7. `before` hook
//! 8. invoke the handler with the path captures
//! 9. `after` hook (skipped after a handler panic)
//! 10. render the handler output into the response
//!
//! A panic in any stage from construction to the `after` hook ends the
//! request with a single logged error and `500 Server Error`. The headers
//! set before the action was built are kept.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::{Method, StatusCode};

use xweb_http::{HttpRequest, HttpResponse};

use crate::action::{ActionDescriptor, ActionOutput};
use crate::binding::FormValues;
use crate::context::{AppState, RequestContext};

/// Body sent when the XSRF check fails.
pub const XSRF_ERROR_BODY: &str = "xrsf error.";

/// Body sent when a handler panics or returns an error.
pub const SERVER_ERROR_BODY: &str = "Server Error";

/// Runs the full lifecycle of `descriptor` for `request`.
///
/// `response` already carries any headers set by the router. The returned
/// response is always finished.
pub fn dispatch(
    descriptor: &ActionDescriptor,
    mut request: HttpRequest,
    mut response: HttpResponse,
    app: &Arc<AppState>,
    captures: Vec<String>,
) -> HttpResponse {
    let settings = app.settings();

    if let Err(err) = request.parse_form(settings.max_upload_size) {
        if settings.log_form_errors {
            tracing::warn!(error = %err, "ignoring unparseable form body");
        }
    }

    response.set_header("Content-Type", "text/html; charset=utf-8");

    if settings.check_xsrf
        && request.method() == Method::POST
        && !xsrf_matches(&request, &settings.xsrf_name)
    {
        tracing::debug!(
            action = descriptor.action_name(),
            method = descriptor.method_name(),
            "xsrf check failed"
        );
        response.abort(StatusCode::INTERNAL_SERVER_ERROR, XSRF_ERROR_BODY);
        return response;
    }

    let form = request.form().clone();
    let fallback = response.clone();
    let action_name = descriptor.action_name();
    let method_name = descriptor.method_name();

    let ctx = RequestContext::new(request, Arc::clone(app), response);
    let prepared = guarded("prepare", action_name, method_name, || {
        let mut instance = descriptor.instantiate(ctx);
        instance.bind(&FormValues::new(&form));
        instance.init();
        instance.before(action_name, method_name);
        instance
    });
    let Some(mut instance) = prepared else {
        return server_error(fallback);
    };

    let Some(output) = guarded("invoke", action_name, method_name, || {
        instance.invoke(captures)
    }) else {
        return server_error(instance.context_mut().take_response());
    };

    let after = guarded("after", action_name, method_name, || {
        instance.after(action_name, method_name, &output);
    });
    if after.is_none() {
        return server_error(instance.context_mut().take_response());
    }

    let ctx = instance.context_mut();
    render(ctx, output, action_name, method_name);
    let mut response = ctx.take_response();
    response.finish();
    response
}

/// Runs one lifecycle stage, turning a panic into a single logged error.
fn guarded<T>(
    stage: &str,
    action_name: &str,
    method_name: &str,
    f: impl FnOnce() -> T,
) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(
                action = action_name,
                method = method_name,
                stage,
                panic = %panic_message(payload.as_ref()),
                "action panicked"
            );
            None
        }
    }
}

fn server_error(mut response: HttpResponse) -> HttpResponse {
    response.abort(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY);
    response
}

/// Writes the handler output into the context's response.
fn render(ctx: &mut RequestContext, output: ActionOutput, action_name: &str, method_name: &str) {
    let content = match output {
        ActionOutput::Empty => return,
        ActionOutput::Text(text) => text.into_bytes(),
        ActionOutput::Bytes(bytes) => bytes,
        ActionOutput::Failed(err) => {
            tracing::error!(
                action = action_name,
                method = method_name,
                error = %err,
                "action returned an error"
            );
            ctx.abort(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY);
            return;
        }
    };

    match ctx.write(&content) {
        Ok(_) => {
            let length = ctx.response().body().len().to_string();
            ctx.set_header("Content-Length", &length);
        }
        Err(err) => tracing::error!(error = %err, "error during write"),
    }
}

/// The cookie must be present, non-empty, and equal to the first form value.
fn xsrf_matches(request: &HttpRequest, name: &str) -> bool {
    match request.cookie(name) {
        Some(cookie) if !cookie.is_empty() => request.form_value(name) == Some(cookie),
        _ => false,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
