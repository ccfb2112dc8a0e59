//! Retry policy.
//!
//! # Design Decisions
//! - Never retry POST/PATCH (non-idempotent)
//! - Connection errors are retryable; any HTTP response is final
//! - Attempt count includes the first try

use axum::http::Method;

use crate::config::RetryConfig;

/// Whether a failed attempt may be repeated.
pub fn is_retryable(method: &Method, connect_error: bool) -> bool {
    connect_error && method.is_idempotent()
}

/// Maximum attempts allowed for a request with the given method.
pub fn max_attempts(config: &RetryConfig, method: &Method) -> u32 {
    if config.enabled && method.is_idempotent() {
        config.max_attempts.max(1)
    } else {
        1
    }
}
