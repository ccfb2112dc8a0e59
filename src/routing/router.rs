//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Look up the matching route for a request path
//! - Return matched route plus remainder, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - First match wins; declaration order is the only priority
//! - Explicit `None` rather than silent default

use thiserror::Error;

use crate::routing::matcher::{normalize, PathPrefixMatcher};

/// Errors raised while compiling a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route prefix must not be empty")]
    EmptyPrefix,

    #[error("route prefix `{0}` must not start with '/'")]
    LeadingSlash(String),

    #[error("route prefix `{0}` must end with '/'")]
    MissingTrailingSlash(String),

    #[error("route prefix `{0}` is declared more than once")]
    DuplicatePrefix(String),
}

/// Check the syntax of a single prefix.
pub fn validate_prefix(prefix: &str) -> Result<(), RouteError> {
    if prefix.is_empty() {
        return Err(RouteError::EmptyPrefix);
    }
    if prefix.starts_with('/') {
        return Err(RouteError::LeadingSlash(prefix.to_string()));
    }
    if !prefix.ends_with('/') {
        return Err(RouteError::MissingTrailingSlash(prefix.to_string()));
    }
    Ok(())
}

/// A pairing of a URL prefix with the target requests are delegated to.
#[derive(Debug, Clone)]
pub struct RouteEntry<T> {
    matcher: PathPrefixMatcher,
    target: T,
}

impl<T> RouteEntry<T> {
    pub fn new(prefix: impl Into<String>, target: T) -> Self {
        Self {
            matcher: PathPrefixMatcher::new(prefix),
            target,
        }
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    pub entry: &'a RouteEntry<T>,
    /// Request path with the matched prefix stripped.
    pub remainder: &'a str,
}

impl<T> RouteMatch<'_, T> {
    pub fn target(&self) -> &T {
        self.entry.target()
    }

    pub fn prefix(&self) -> &str {
        self.entry.prefix()
    }
}

/// Ordered, immutable table of route entries.
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    entries: Vec<RouteEntry<T>>,
}

impl<T> RouteTable<T> {
    /// Compile a route table, rejecting malformed or duplicate prefixes.
    pub fn new(entries: Vec<RouteEntry<T>>) -> Result<Self, RouteError> {
        let mut seen: Vec<&str> = Vec::with_capacity(entries.len());
        for entry in &entries {
            validate_prefix(entry.prefix())?;
            if seen.contains(&entry.prefix()) {
                return Err(RouteError::DuplicatePrefix(entry.prefix().to_string()));
            }
            seen.push(entry.prefix());
        }

        tracing::debug!(routes = entries.len(), "Route table compiled");
        Ok(Self { entries })
    }

    /// Find the first entry whose prefix matches `path`.
    pub fn resolve<'a>(&'a self, path: &'a str) -> Option<RouteMatch<'a, T>> {
        self.entries.iter().find_map(|entry| {
            entry
                .matcher
                .strip(path)
                .map(|remainder| RouteMatch { entry, remainder })
        })
    }

    /// When `path` misses every route but `path/` would hit one, return the
    /// slash-appended path (with the caller's leading slash preserved).
    pub fn suggest_slash(&self, path: &str) -> Option<String> {
        if normalize(path).is_empty() || path.ends_with('/') {
            return None;
        }
        if self.resolve(path).is_some() {
            return None;
        }
        let candidate = format!("{path}/");
        if self.resolve(&candidate).is_some() {
            Some(candidate)
        } else {
            None
        }
    }

    pub fn entries(&self) -> &[RouteEntry<T>] {
        &self.entries
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(RouteEntry::prefix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        RouteTable::new(vec![
            RouteEntry::new("admin/", "admin"),
            RouteEntry::new("api/analytics/", "analytics"),
            RouteEntry::new("api/ai/", "ai_features"),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_strips_prefix() {
        let table = table();

        let m = table.resolve("/api/ai/predict").unwrap();
        assert_eq!(*m.target(), "ai_features");
        assert_eq!(m.remainder, "predict");

        let m = table.resolve("/api/analytics/report").unwrap();
        assert_eq!(*m.target(), "analytics");
        assert_eq!(m.remainder, "report");

        let m = table.resolve("/admin/").unwrap();
        assert_eq!(*m.target(), "admin");
        assert_eq!(m.remainder, "");
    }

    #[test]
    fn test_unmatched_path_is_none() {
        let table = table();
        assert!(table.resolve("/").is_none());
        assert!(table.resolve("/api/").is_none());
        assert!(table.resolve("/api/contacts/").is_none());
        assert!(table.resolve("/administrator/").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new(vec![
            RouteEntry::new("api/", 1),
            RouteEntry::new("api/ai/", 2),
        ])
        .unwrap();

        let m = table.resolve("/api/ai/predict").unwrap();
        assert_eq!(*m.target(), 1);
        assert_eq!(m.remainder, "ai/predict");
    }

    #[test]
    fn test_rejects_duplicate_prefix() {
        let err = RouteTable::new(vec![
            RouteEntry::new("admin/", 1),
            RouteEntry::new("admin/", 2),
        ])
        .unwrap_err();
        assert_eq!(err, RouteError::DuplicatePrefix("admin/".into()));
    }

    #[test]
    fn test_rejects_malformed_prefix() {
        assert_eq!(validate_prefix(""), Err(RouteError::EmptyPrefix));
        assert_eq!(
            validate_prefix("/admin/"),
            Err(RouteError::LeadingSlash("/admin/".into()))
        );
        assert_eq!(
            validate_prefix("api/ai"),
            Err(RouteError::MissingTrailingSlash("api/ai".into()))
        );
        assert!(RouteTable::new(vec![RouteEntry::new("api/ai", ())]).is_err());
    }

    #[test]
    fn test_suggest_slash() {
        let table = table();
        assert_eq!(table.suggest_slash("/admin"), Some("/admin/".to_string()));
        assert_eq!(table.suggest_slash("/api/ai"), Some("/api/ai/".to_string()));
        assert_eq!(table.suggest_slash("/admin/"), None);
        assert_eq!(table.suggest_slash("/api"), None);
        assert_eq!(table.suggest_slash("/"), None);
        assert_eq!(table.suggest_slash("/admin/users"), None);
    }
}
