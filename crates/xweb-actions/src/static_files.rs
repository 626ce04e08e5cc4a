//! Static file delegate.
//!
//! Serves files under `static_dir` for routes registered with
//! [`Router::add_static`](crate::router::Router::add_static). The route path
//! has `base_path` stripped and is joined onto the static root. Files whose
//! extension is on the compression allow-list are sent gzip or deflate
//! encoded when the client accepts it.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use http::StatusCode;

use xweb_core::{Settings, XwebError, XwebResult};
use xweb_http::response::mime_from_extension;
use xweb_http::{http_date, parse_http_date, HttpRequest, HttpResponse};

/// Content codings the delegate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `gzip`
    Gzip,
    /// `deflate` (zlib stream)
    Deflate,
}

impl Encoding {
    /// The `Content-Encoding` token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }
}

/// Picks a coding from an `Accept-Encoding` header, preferring gzip.
///
/// Codings listed with `q=0` are treated as refused.
pub fn negotiate_encoding(accept_encoding: &str) -> Option<Encoding> {
    let offered: Vec<&str> = accept_encoding
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let coding = parts.next()?.trim();
            let refused = parts.any(|p| {
                p.trim()
                    .strip_prefix("q=")
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .is_some_and(|q| q <= 0.0)
            });
            (!coding.is_empty() && !refused).then_some(coding)
        })
        .collect();

    let accepts = |name: &str| {
        offered
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name) || *c == "*")
    };

    if accepts("gzip") {
        Some(Encoding::Gzip)
    } else if accepts("deflate") {
        Some(Encoding::Deflate)
    } else {
        None
    }
}

/// Compresses `data` with the given coding.
pub fn compress(data: &[u8], encoding: Encoding) -> XwebResult<Vec<u8>> {
    match encoding {
        Encoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        Encoding::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
    }
}

/// Serves files from the static root.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    settings: Settings,
}

impl StaticFiles {
    /// Creates a delegate from the application settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Returns the static root.
    pub fn root(&self) -> &Path {
        &self.settings.static_dir
    }

    /// Maps a route path onto a file under the static root.
    ///
    /// # Errors
    ///
    /// Returns [`XwebError::NotFound`] when the path is outside `base_path` or
    /// tries to leave the static root.
    pub fn resolve_path(&self, route_path: &str) -> XwebResult<PathBuf> {
        let relative = route_path
            .strip_prefix(self.settings.base_path.as_str())
            .ok_or_else(|| XwebError::NotFound(route_path.to_string()))?
            .trim_start_matches('/');

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(XwebError::NotFound(route_path.to_string()));
        }
        Ok(self.root().join(relative))
    }

    /// Serves the file behind `route_path` into `response`.
    ///
    /// Failures turn into a finished response with the matching status and
    /// its canonical reason as body.
    pub fn serve(
        &self,
        request: &HttpRequest,
        route_path: &str,
        mut response: HttpResponse,
    ) -> HttpResponse {
        if let Err(err) = self.serve_file(request, route_path, &mut response) {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            tracing::debug!(path = route_path, error = %err, "static file not served");
            response.abort(status, status.canonical_reason().unwrap_or_default());
        }
        response.finish();
        response
    }

    fn serve_file(
        &self,
        request: &HttpRequest,
        route_path: &str,
        response: &mut HttpResponse,
    ) -> XwebResult<()> {
        let file = self.resolve_path(route_path)?;
        let metadata =
            fs::metadata(&file).map_err(|_| XwebError::NotFound(route_path.to_string()))?;
        if metadata.is_dir() {
            return Err(XwebError::BadRequest("unsupported serve dir".to_string()));
        }

        let modified: Option<DateTime<Utc>> = metadata.modified().ok().map(DateTime::<Utc>::from);
        if let Some(modified) = modified {
            response.set_header("Last-Modified", &http_date(modified));
            let not_modified = request
                .header("if-modified-since")
                .and_then(parse_http_date)
                .is_some_and(|since| modified.timestamp() <= since.timestamp());
            if not_modified {
                response.abort(StatusCode::NOT_MODIFIED, "");
                response.headers_mut().remove(http::header::CONTENT_LENGTH);
                return Ok(());
            }
        }

        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        response.set_header("Content-Type", mime_from_extension(extension));

        let content = fs::read(&file)?;
        let file_name = file.to_string_lossy();
        let encoding = if self.settings.is_compressible(&file_name) {
            request.header("accept-encoding").and_then(negotiate_encoding)
        } else {
            None
        };

        let body = match encoding {
            Some(encoding) => {
                response.set_header("Content-Encoding", encoding.as_str());
                response.set_header("Vary", "Accept-Encoding");
                compress(&content, encoding)?
            }
            None => content,
        };

        response.set_header("Content-Length", &body.len().to_string());
        response.write(&body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    fn delegate(root: &Path) -> StaticFiles {
        let settings = Settings {
            static_dir: root.to_path_buf(),
            ..Settings::default()
        };
        StaticFiles::new(&settings)
    }

    #[test]
    fn test_negotiate_prefers_gzip() {
        assert_eq!(negotiate_encoding("deflate, gzip"), Some(Encoding::Gzip));
        assert_eq!(negotiate_encoding("deflate"), Some(Encoding::Deflate));
        assert_eq!(negotiate_encoding("br"), None);
        assert_eq!(negotiate_encoding("gzip;q=0, deflate"), Some(Encoding::Deflate));
        assert_eq!(negotiate_encoding("*"), Some(Encoding::Gzip));
    }

    #[test]
    fn test_compress_gzip_round_trip() {
        let compressed = compress(b"body { color: red }", Encoding::Gzip).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "body { color: red }");
    }

    #[test]
    fn test_resolve_path_strips_base() {
        let files = delegate(Path::new("/srv/static"));
        assert_eq!(
            files.resolve_path("/css/app.css").unwrap(),
            PathBuf::from("/srv/static/css/app.css")
        );
    }

    #[test]
    fn test_resolve_path_rejects_parent() {
        let files = delegate(Path::new("/srv/static"));
        assert!(matches!(
            files.resolve_path("/../secret"),
            Err(XwebError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_path_custom_base() {
        let settings = Settings {
            static_dir: PathBuf::from("/srv"),
            base_path: "/app/".to_string(),
            ..Settings::default()
        };
        let files = StaticFiles::new(&settings);
        assert_eq!(
            files.resolve_path("/app/logo.png").unwrap(),
            PathBuf::from("/srv/logo.png")
        );
        assert!(files.resolve_path("/other/logo.png").is_err());
    }

    #[test]
    fn test_serve_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = delegate(dir.path());
        let request = HttpRequest::builder().path("/nope.txt").build();
        let response = files.serve(&request, "/nope.txt", HttpResponse::new());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "Not Found");
    }

    #[test]
    fn test_serve_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let files = delegate(dir.path());
        let request = HttpRequest::builder().path("/sub").build();
        let response = files.serve(&request, "/sub", HttpResponse::new());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
