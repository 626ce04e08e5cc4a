//! A map that can hold multiple values per key.
//!
//! Query strings and form bodies may repeat a key; [`MultiValueMap`] keeps
//! every value in arrival order and hands out the first one by default.

use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::Hash;

/// A map from keys to ordered lists of values.
///
/// [`get`](MultiValueMap::get) returns the **first** value recorded for a key,
/// so values merged in from a request body shadow the ones from the query
/// string that follow them. [`get_list`](MultiValueMap::get_list) returns all.
///
/// # Examples
///
/// ```
/// use xweb_core::utils::MultiValueMap;
///
/// let mut m = MultiValueMap::new();
/// m.append("color".to_string(), "red");
/// m.append("color".to_string(), "blue");
///
/// assert_eq!(m.get(&"color".to_string()), Some(&"red"));
/// assert_eq!(m.get_list(&"color".to_string()), Some(&vec!["red", "blue"]));
/// ```
#[derive(Debug, Clone)]
pub struct MultiValueMap<K: Eq + Hash, V> {
    inner: HashMap<K, Vec<V>>,
}

impl<K: Eq + Hash, V> Default for MultiValueMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> MultiValueMap<K, V> {
    /// Creates an empty `MultiValueMap`.
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Returns the first value associated with the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key).and_then(|v| v.first())
    }

    /// Returns all values associated with the key, in insertion order.
    pub fn get_list(&self, key: &K) -> Option<&Vec<V>> {
        self.inner.get(key)
    }

    /// Sets the value for a key, replacing any existing values.
    pub fn set(&mut self, key: K, value: V) {
        self.inner.insert(key, vec![value]);
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: K, value: V) {
        self.inner.entry(key).or_default().push(value);
    }

    /// Appends every value of `other` after the values already present.
    pub fn extend(&mut self, other: Self) {
        for (key, values) in other.inner {
            self.inner.entry(key).or_default().extend(values);
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> hash_map::Keys<'_, K, Vec<V>> {
        self.inner.keys()
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the map contains no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if the map contains the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns an iterator over (key, value-list) pairs.
    pub fn iter(&self) -> hash_map::Iter<'_, K, Vec<V>> {
        self.inner.iter()
    }
}

impl<'a, K: Eq + Hash, V> IntoIterator for &'a MultiValueMap<K, V> {
    type Item = (&'a K, &'a Vec<V>);
    type IntoIter = hash_map::Iter<'a, K, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
