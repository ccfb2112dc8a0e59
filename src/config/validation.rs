//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing groups)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect malformed and duplicate route prefixes
//! - Reject CORS origins that cannot become header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::{uri::Authority, HeaderValue};
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::router::{validate_prefix, RouteError};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("routes: {0}")]
    Route(#[from] RouteError),

    #[error("route `{prefix}` references unknown group `{group}`")]
    UnknownGroup { prefix: String, group: String },

    #[error("group `{group}` upstream `{upstream}` is not a host:port authority")]
    Upstream { group: String, upstream: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("cors.allowed_origins entry `{0}` is not a valid origin; leave the list empty to allow any")]
    CorsOrigin(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for route in config.effective_routes() {
        if let Err(e) = validate_prefix(&route.prefix) {
            errors.push(e.into());
        } else if !seen.insert(route.prefix.clone()) {
            errors.push(RouteError::DuplicatePrefix(route.prefix.clone()).into());
        }

        if !config.groups.contains_key(&route.group) {
            errors.push(ValidationError::UnknownGroup {
                prefix: route.prefix.clone(),
                group: route.group.clone(),
            });
        }
    }

    for (name, group) in &config.groups {
        let valid = group
            .upstream
            .parse::<Authority>()
            .map(|a| a.port_u16().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::Upstream {
                group: name.clone(),
                upstream: group.upstream.clone(),
            });
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    for origin in &config.cors.allowed_origins {
        if origin == "*" || HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::CorsOrigin(origin.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.routes = vec![
            RouteConfig {
                prefix: "/admin/".into(),
                group: "admin".into(),
            },
            RouteConfig {
                prefix: "api/ai/".into(),
                group: "missing".into(),
            },
            RouteConfig {
                prefix: "api/ai/".into(),
                group: "ai_features".into(),
            },
        ];
        config.timeouts.request_secs = 0;
        config.retries.max_attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::Route(RouteError::LeadingSlash(
            "/admin/".into()
        ))));
        assert!(errors.contains(&ValidationError::UnknownGroup {
            prefix: "api/ai/".into(),
            group: "missing".into(),
        }));
        assert!(errors.contains(&ValidationError::Route(RouteError::DuplicatePrefix(
            "api/ai/".into()
        ))));
        assert!(errors.contains(&ValidationError::ZeroTimeout("request_secs")));
        assert!(errors.contains(&ValidationError::ZeroAttempts));
    }

    #[test]
    fn test_upstream_requires_port() {
        let mut config = GatewayConfig::default();
        config.groups.get_mut("analytics").unwrap().upstream = "analytics.internal".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::Upstream {
                group: "analytics".into(),
                upstream: "analytics.internal".into(),
            }]
        );
    }

    #[test]
    fn test_cors_origins() {
        let mut config = GatewayConfig::default();
        config.cors.allowed_origins = vec!["https://portfolio.example".into()];
        assert!(validate_config(&config).is_ok());

        config.cors.allowed_origins = vec!["*".into(), "bad\norigin".into()];
        assert_eq!(
            validate_config(&config),
            Err(vec![
                ValidationError::CorsOrigin("*".into()),
                ValidationError::CorsOrigin("bad\norigin".into()),
            ])
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("nowhere".into())])
        );
    }
}
