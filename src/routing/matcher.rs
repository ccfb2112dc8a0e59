//! Route matching logic.
//!
//! # Responsibilities
//! - Match request path against a declared prefix (case-sensitive)
//! - Return the remainder left after stripping the prefix
//!
//! # Design Decisions
//! - Prefixes are declared without a leading slash (`api/ai/`)
//! - A single leading `/` of the request path is ignored before matching
//! - Plain string prefix comparison; no regex, O(len) per check

/// Matches the request path against a route prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The declared prefix, e.g. `api/ai/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` falls under this prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// Strip the prefix from `path`, returning what is left.
    ///
    /// `/api/ai/predict` stripped by `api/ai/` yields `predict`.
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        normalize(path).strip_prefix(self.prefix.as_str())
    }
}

/// Drop the single leading slash carried by request paths.
pub(crate) fn normalize(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("api/ai/");

        assert!(matcher.matches("/api/ai/predict"));
        assert!(matcher.matches("api/ai/predict"));
        assert!(matcher.matches("/api/ai/"));

        assert!(!matcher.matches("/api/aix/predict"));
        assert!(!matcher.matches("/api/ai"));
        assert!(!matcher.matches("/API/AI/predict")); // Case sensitive
        assert!(!matcher.matches("/images"));
    }

    #[test]
    fn test_strip_returns_remainder() {
        let matcher = PathPrefixMatcher::new("api/analytics/");

        assert_eq!(matcher.strip("/api/analytics/report"), Some("report"));
        assert_eq!(matcher.strip("/api/analytics/contacts/daily"), Some("contacts/daily"));
        assert_eq!(matcher.strip("/api/analytics/"), Some(""));
        assert_eq!(matcher.strip("/api/ai/report"), None);
    }

    #[test]
    fn test_only_one_leading_slash_is_ignored() {
        let matcher = PathPrefixMatcher::new("admin/");
        assert_eq!(matcher.strip("/admin/login/"), Some("login/"));
        assert_eq!(matcher.strip("//admin/login/"), None);
    }
}
