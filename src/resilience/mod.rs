//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream group:
//!     → tokio timeout (upstream_secs deadline)
//!     → On connect failure: retries.rs (check if retryable)
//!     → backoff.rs (delay before next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Retries only for idempotent requests (GET, HEAD, etc.)
//! - Only connection errors are retried; an upstream that answered is final

pub mod backoff;
pub mod retries;
