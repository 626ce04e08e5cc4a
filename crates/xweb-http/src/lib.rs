//! # xweb-http
//!
//! HTTP layer for the xweb framework. Provides the request and response
//! types, form and multipart parsing, cookie handling, and the
//! [`RouteTable`](urls::RouteTable) that maps request paths to targets.

pub mod cookies;
pub mod querydict;
pub mod request;
pub mod response;
pub mod upload;
pub mod urls;

pub use cookies::Cookie;
pub use querydict::QueryDict;
pub use request::{HttpRequest, HttpRequestBuilder};
pub use response::{http_date, parse_http_date, HttpResponse};
pub use upload::UploadedFile;
pub use urls::{PatternError, RouteMatch, RouteTable};
