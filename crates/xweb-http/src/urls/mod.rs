//! URL routing.
//!
//! - [`pattern`]: compiled, fully anchored route patterns and their errors
//! - [`table`]: the [`RouteTable`] holding exact routes, ordered pattern
//!   routes and the default index list
//!
//! # Examples
//!
//! ```
//! use xweb_http::urls::RouteTable;
//!
//! let mut table = RouteTable::new();
//! table.register_exact("/", "home");
//! table.register_pattern(r"/user/(\d+)", "user").unwrap();
//!
//! let m = table.resolve("/user/7").unwrap();
//! assert_eq!(*m.target, "user");
//! assert_eq!(m.captures, vec!["7"]);
//! assert!(table.resolve("/user/7/edit").is_none());
//! ```

pub mod pattern;
pub mod table;

pub use pattern::{is_pattern_source, PatternError, RoutePattern};
pub use table::{MatchKind, RouteMatch, RouteTable};
