//! Query string and form dictionary.
//!
//! [`QueryDict`] wraps [`MultiValueMap`](xweb_core::utils::MultiValueMap) with
//! URL-decoding, and is used for both the query string and the parsed form.

use xweb_core::utils::MultiValueMap;

/// A dictionary for query string and form data.
///
/// A key may appear several times; [`get`](QueryDict::get) returns the first
/// occurrence, [`get_list`](QueryDict::get_list) all of them.
///
/// # Examples
///
/// ```
/// use xweb_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some("red"));
/// assert_eq!(qd.get_list("color"), Some(&vec!["red".to_string(), "blue".to_string()]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryDict {
    data: MultiValueMap<String, String>,
}

impl QueryDict {
    /// Creates a new, empty `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL-encoded string (e.g., `"key1=val1&key2=val2"`).
    ///
    /// Handles percent-encoding and `+` as space. Pairs without `=` get an
    /// empty value; empty pairs are skipped.
    pub fn parse(query_string: &str) -> Self {
        let mut data = MultiValueMap::new();

        for pair in query_string.split('&') {
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq_pos| (&pair[..eq_pos], &pair[eq_pos + 1..]));

            data.append(percent_decode(key), percent_decode(value));
        }

        Self { data }
    }

    /// Returns the first value for the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(&key.to_string()).map(String::as_str)
    }

    /// Returns all values for the given key.
    pub fn get_list(&self, key: &str) -> Option<&Vec<String>> {
        self.data.get_list(&key.to_string())
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: &str, value: &str) {
        self.data.append(key.to_string(), value.to_string());
    }

    /// Replaces all values for the given key.
    pub fn set(&mut self, key: &str, value: &str) {
        self.data.set(key.to_string(), value.to_string());
    }

    /// Appends every value of `other` after the values already present.
    pub fn merge(&mut self, other: Self) {
        self.data.extend(other.data);
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the dictionary contains no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the specified key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(&key.to_string())
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }
}

/// Decodes a percent-encoded form component.
fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let qd = QueryDict::new();
        assert!(qd.is_empty());
        assert_eq!(qd.len(), 0);
    }

    #[test]
    fn test_parse_multiple_keys() {
        let qd = QueryDict::parse("a=1&b=2&c=3");
        assert_eq!(qd.get("a"), Some("1"));
        assert_eq!(qd.get("b"), Some("2"));
        assert_eq!(qd.get("c"), Some("3"));
        assert_eq!(qd.len(), 3);
    }

    #[test]
    fn test_parse_multiple_values() {
        let qd = QueryDict::parse("tag=a&tag=b&tag=c");
        assert_eq!(qd.get("tag"), Some("a"));
        assert_eq!(qd.get_list("tag").map(Vec::len), Some(3));
    }

    #[test]
    fn test_parse_decoding() {
        let qd = QueryDict::parse("q=hello+world&name=J%C3%BCrgen&sym=%26%3D");
        assert_eq!(qd.get("q"), Some("hello world"));
        assert_eq!(qd.get("name"), Some("Jürgen"));
        assert_eq!(qd.get("sym"), Some("&="));
    }

    #[test]
    fn test_parse_key_without_value() {
        let qd = QueryDict::parse("flag&&x=");
        assert_eq!(qd.get("flag"), Some(""));
        assert_eq!(qd.get("x"), Some(""));
        assert_eq!(qd.len(), 2);
    }

    #[test]
    fn test_merge_keeps_first_source_first() {
        let mut body = QueryDict::parse("name=body");
        body.merge(QueryDict::parse("name=query&page=3"));
        assert_eq!(body.get("name"), Some("body"));
        assert_eq!(body.get("page"), Some("3"));
    }

    #[test]
    fn test_set_replaces() {
        let mut qd = QueryDict::parse("a=1&a=2");
        qd.set("a", "3");
        assert_eq!(qd.get_list("a"), Some(&vec!["3".to_string()]));
    }
}
