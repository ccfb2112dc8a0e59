//! Project URL configuration.
//!
//! The only place the public prefixes are declared. Each prefix names the
//! handler group that serves everything beneath it; the groups themselves
//! live outside this service.

/// Group serving the administrative interface.
pub const ADMIN: &str = "admin";
/// Group serving analytics endpoints.
pub const ANALYTICS: &str = "analytics";
/// Group serving AI features.
pub const AI_FEATURES: &str = "ai_features";

/// `(prefix, group)` pairs in match order.
pub fn urlpatterns() -> Vec<(&'static str, &'static str)> {
    vec![
        ("admin/", ADMIN),
        ("api/analytics/", ANALYTICS),
        ("api/ai/", AI_FEATURES),
    ]
}
