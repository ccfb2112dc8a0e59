//! Offline views of the route table for the `routes` and `resolve` commands.

use crate::config::GatewayConfig;
use crate::routing::router::{RouteEntry, RouteError, RouteTable};

/// Route table keyed by group name, built without contacting any upstream.
pub fn route_table(config: &GatewayConfig) -> Result<RouteTable<String>, RouteError> {
    RouteTable::new(
        config
            .effective_routes()
            .into_iter()
            .map(|route| RouteEntry::new(route.prefix, route.group))
            .collect(),
    )
}

/// One line per route in match order: prefix, group and upstream.
pub fn route_listing(config: &GatewayConfig) -> Result<Vec<String>, RouteError> {
    let table = route_table(config)?;
    Ok(table
        .entries()
        .iter()
        .map(|entry| {
            let target = config
                .groups
                .get(entry.target())
                .map(|g| format!("http://{}", g.upstream))
                .unwrap_or_else(|| "-".to_string());
            format!("{:<20} {:<16} {}", entry.prefix(), entry.target(), target)
        })
        .collect())
}

/// `<group> /<remainder>` for the route `path` reaches, if any.
pub fn resolution(table: &RouteTable<String>, path: &str) -> Option<String> {
    table
        .resolve(path)
        .map(|found| format!("{} /{}", found.target(), found.remainder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    #[test]
    fn test_listing_follows_match_order() {
        let lines = route_listing(&GatewayConfig::default()).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("admin/"));
        assert!(lines[0].ends_with("http://127.0.0.1:8001"));
        assert!(lines[1].starts_with("api/analytics/"));
        assert!(lines[2].starts_with("api/ai/"));
        assert!(lines[2].contains("ai_features"));
    }

    #[test]
    fn test_listing_marks_group_without_upstream() {
        let mut config = GatewayConfig::default();
        config.routes = vec![RouteConfig {
            prefix: "api/blog/".into(),
            group: "blog".into(),
        }];
        let lines = route_listing(&config).unwrap();
        assert!(lines[0].trim_end().ends_with('-'));
    }

    #[test]
    fn test_resolution() {
        let table = route_table(&GatewayConfig::default()).unwrap();
        assert_eq!(
            resolution(&table, "/api/ai/predict").as_deref(),
            Some("ai_features /predict")
        );
        assert_eq!(
            resolution(&table, "api/analytics/report").as_deref(),
            Some("analytics /report")
        );
        assert_eq!(resolution(&table, "/admin/").as_deref(), Some("admin /"));
        assert_eq!(resolution(&table, "/api/projects/"), None);
    }

    #[test]
    fn test_invalid_prefix_is_reported() {
        let mut config = GatewayConfig::default();
        config.routes = vec![RouteConfig {
            prefix: "admin".into(),
            group: "admin".into(),
        }];
        assert!(matches!(
            route_table(&config),
            Err(RouteError::MissingTrailingSlash(_))
        ));
    }
}
