//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::urls;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Dispatch behaviour shared by all routes.
    pub routing: RoutingConfig,

    /// Route definitions mapping prefixes to handler groups.
    /// Empty means the built-in URL patterns.
    pub routes: Vec<RouteConfig>,

    /// Handler group definitions, keyed by group name.
    pub groups: GroupsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for upstream delegation.
    pub retries: RetryConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Cross-origin access for browser clients.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routing: RoutingConfig::default(),
            routes: Vec::new(),
            groups: default_groups(),
            timeouts: TimeoutConfig::default(),
            retries: RetryConfig::default(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Routes in match order, falling back to the built-in URL patterns.
    pub fn effective_routes(&self) -> Vec<RouteConfig> {
        if !self.routes.is_empty() {
            return self.routes.clone();
        }
        urls::urlpatterns()
            .into_iter()
            .map(|(prefix, group)| RouteConfig {
                prefix: prefix.to_string(),
                group: group.to_string(),
            })
            .collect()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Dispatch behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Redirect `GET /admin` to `/admin/` when only the slashed form routes.
    pub append_slash: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self { append_slash: true }
    }
}

/// Route configuration mapping a prefix to a handler group.
///
/// Upstream addresses belong to `[groups.<name>]`, not to the route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Path prefix without leading slash, ending in '/' (e.g. "api/ai/").
    pub prefix: String,

    /// Handler group name requests are delegated to.
    pub group: String,
}

/// Handler group configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    /// Upstream address serving the group (e.g., "127.0.0.1:8001").
    pub upstream: String,
}

/// Handler groups by name.
pub type GroupsConfig = BTreeMap<String, GroupConfig>;

/// Groups for the built-in URL patterns, served on consecutive local ports.
pub fn default_groups() -> GroupsConfig {
    [
        (urls::ADMIN, "127.0.0.1:8001"),
        (urls::ANALYTICS, "127.0.0.1:8002"),
        (urls::AI_FEATURES, "127.0.0.1:8003"),
    ]
    .into_iter()
    .map(|(name, upstream)| {
        (
            name.to_string(),
            GroupConfig {
                upstream: upstream.to_string(),
            },
        )
    })
    .collect()
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Upstream response timeout in seconds.
    pub upstream_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 25,
            request_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// CORS settings applied to every route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Answer preflights and add `Access-Control-*` headers.
    pub enabled: bool,

    /// Allowed origins. Empty allows any origin.
    pub allowed_origins: Vec<String>,

    /// How long browsers may cache a preflight, in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            max_age_secs: 600,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
