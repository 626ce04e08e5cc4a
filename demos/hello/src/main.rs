//! # xweb Hello Example
//!
//! A small application showing the pieces of xweb working together:
//!
//! - **Actions**: a guestbook action with form binding and lifecycle hooks
//! - **Routes**: literal paths, regex patterns with captures, and static files
//! - **Settings**: loaded from `hello.toml` when present, else from the environment
//!
//! ## Running
//!
//! ```bash
//! cargo run --package hello-demo
//! ```

use std::time::Instant;

use xweb::actions::action::BoxError;
use xweb::core::logging::setup_logging;
use xweb::core::settings_loader;
use xweb::prelude::*;

/// Landing page and greeting routes.
struct Hello {
    ctx: RequestContext,
    name: String,
    started: Option<Instant>,
}

impl Action for Hello {
    fn new(ctx: RequestContext) -> Self {
        Self {
            ctx,
            name: "world".to_string(),
            started: None,
        }
    }

    fn context(&self) -> &RequestContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut RequestContext {
        &mut self.ctx
    }

    fn bind(&mut self, form: &FormValues<'_>) {
        form.bind("name", &mut self.name);
    }

    fn as_before_hook(&mut self) -> Option<&mut dyn BeforeHook> {
        Some(self)
    }

    fn as_after_hook(&mut self) -> Option<&mut dyn AfterHook> {
        Some(self)
    }
}

impl BeforeHook for Hello {
    fn before(&mut self, _action_name: &str, _method_name: &str) {
        self.started = Some(Instant::now());
    }
}

impl AfterHook for Hello {
    fn after(&mut self, action_name: &str, method_name: &str, output: &ActionOutput) {
        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        tracing::info!(
            action = action_name,
            method = method_name,
            failed = output.is_failed(),
            elapsed_us = elapsed.as_micros(),
            "handled"
        );
    }
}

impl Hello {
    fn index(&mut self) -> String {
        let title = self
            .ctx
            .var("title")
            .and_then(|v| v.as_str())
            .unwrap_or("xweb")
            .to_string();
        let token = self.ctx.xsrf_form_html();
        format!(
            "<h1>{title}</h1>\
             <form method=\"post\" action=\"/greet\">{token}\
             <input name=\"name\" /><button>Greet</button></form>"
        )
    }

    fn greet(&mut self) -> String {
        self.ctx.set_header("Content-Type", "text/plain; charset=utf-8");
        format!("Hello, {}!", self.name)
    }

    fn user(&mut self, id: String) -> Result<String, BoxError> {
        let id: u32 = id.parse()?;
        Ok(format!("user #{id}"))
    }

    fn archive(&mut self, year: String, month: String) -> String {
        format!("archive for {year}-{month}")
    }
}

fn load_settings() -> anyhow::Result<Settings> {
    if std::path::Path::new("hello.toml").exists() {
        Ok(settings_loader::from_toml_file_with_env("hello.toml")?)
    } else {
        Ok(settings_loader::from_env())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;
    setup_logging(&settings);

    let app = XwebApp::new(settings)
        .var("title", "Hello from xweb")
        .route("/", ActionDescriptor::new("index", Hello::index).methods(["GET"]))?
        .route("/greet", ActionDescriptor::new("greet", Hello::greet).methods(["POST"]))?
        .route(r"/user/(\d+)", ActionDescriptor::new("user", Hello::user))?
        .route(
            r"/archive/(\d{4})/(\d{2})",
            ActionDescriptor::new("archive", Hello::archive),
        )?
        .static_file("/app.css");

    tracing::info!(?app, "routes registered");
    app.run("127.0.0.1:8000").await?;
    Ok(())
}
