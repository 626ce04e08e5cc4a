//! The route table.
//!
//! Exact routes live in a map keyed by the literal path; pattern routes live
//! in a list scanned in registration order. Resolution tries, in order:
//!
//! 1. the exact map,
//! 2. the pattern list (first full-path match wins),
//! 3. the default index names joined onto the path, against the exact map.
//!
//! The table is filled at startup and only read while serving, so lookups
//! take `&self` and need no locking.

use std::collections::HashMap;

use super::pattern::{PatternError, RoutePattern};

/// How a [`RouteMatch`] was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Literal path hit in the exact map.
    Exact,
    /// Full-path match of a pattern route.
    Pattern,
    /// Exact map hit after joining a default index name onto the path.
    DefaultIndex,
}

/// The result of resolving a path.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The registered target.
    pub target: &'a T,
    /// Pattern captures in order; empty for exact matches.
    pub captures: Vec<String>,
    /// The exact key that matched, or the request path for pattern matches.
    pub route: String,
    /// Which resolution step produced the match.
    pub kind: MatchKind,
}

#[derive(Debug)]
struct PatternRoute<T> {
    pattern: RoutePattern,
    target: T,
}

/// Registry of exact and pattern routes.
#[derive(Debug)]
pub struct RouteTable<T> {
    exact: HashMap<String, T>,
    patterns: Vec<PatternRoute<T>>,
    default_index: Vec<String>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            patterns: Vec::new(),
            default_index: Vec::new(),
        }
    }
}

impl<T> RouteTable<T> {
    /// Creates an empty table with no default index names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the exact route for `path`.
    pub fn register_exact(&mut self, path: impl Into<String>, target: T) {
        self.exact.insert(path.into(), target);
    }

    /// Compiles `source` and appends it to the pattern list.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Compile`] if the source does not compile; the
    /// table is left untouched.
    pub fn register_pattern(&mut self, source: &str, target: T) -> Result<(), PatternError> {
        let pattern = RoutePattern::compile(source)?;
        self.register_compiled(pattern, target);
        Ok(())
    }

    /// Appends an already compiled pattern to the pattern list.
    pub fn register_compiled(&mut self, pattern: RoutePattern, target: T) {
        self.patterns.push(PatternRoute { pattern, target });
    }

    /// Replaces the default index list.
    pub fn set_default_index<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_index = names.into_iter().map(Into::into).collect();
    }

    /// Returns the default index names in lookup order.
    pub fn default_index(&self) -> &[String] {
        &self.default_index
    }

    /// Number of exact routes.
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    /// Number of pattern routes.
    pub fn pattern_len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }

    /// Looks up an exact route.
    pub fn lookup_exact(&self, path: &str) -> Option<&T> {
        self.exact.get(path)
    }

    /// Scans the pattern list for the first route matching all of `path`.
    pub fn lookup_pattern(&self, path: &str) -> Option<RouteMatch<'_, T>> {
        self.lookup_pattern_where(path, |_| true)
    }

    /// Resolves `path` through exact, pattern and default index lookups.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_, T>> {
        self.resolve_where(path, |_| true)
    }

    /// Like [`resolve`](Self::resolve), but skips targets rejected by
    /// `accept` and keeps looking.
    pub fn resolve_where<F>(&self, path: &str, accept: F) -> Option<RouteMatch<'_, T>>
    where
        F: Fn(&T) -> bool,
    {
        if let Some(target) = self.exact.get(path).filter(|t| accept(*t)) {
            return Some(RouteMatch {
                target,
                captures: Vec::new(),
                route: path.to_string(),
                kind: MatchKind::Exact,
            });
        }

        if let Some(found) = self.lookup_pattern_where(path, &accept) {
            return Some(found);
        }

        self.default_index.iter().find_map(|name| {
            let index_path = join_path(path, name);
            let target = self.exact.get(&index_path).filter(|t| accept(*t))?;
            Some(RouteMatch {
                target,
                captures: Vec::new(),
                route: index_path,
                kind: MatchKind::DefaultIndex,
            })
        })
    }

    fn lookup_pattern_where<F>(&self, path: &str, accept: F) -> Option<RouteMatch<'_, T>>
    where
        F: Fn(&T) -> bool,
    {
        self.patterns.iter().find_map(|route| {
            if !accept(&route.target) {
                return None;
            }
            let captures = route.pattern.full_match(path)?;
            Some(RouteMatch {
                target: &route.target,
                captures,
                route: path.to_string(),
                kind: MatchKind::Pattern,
            })
        })
    }
}

/// Joins a default index name onto a request path with a single `/`.
fn join_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    format!("{base}/{name}")
}
