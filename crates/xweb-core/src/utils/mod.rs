//! Utility types for the xweb framework.
//!
//! - [`MultiValueMap`]: A map that can hold multiple values per key.

mod multi_value_map;

pub use multi_value_map::MultiValueMap;
