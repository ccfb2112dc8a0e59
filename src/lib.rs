//! Portfolio gateway library.
//!
//! Owns the project URL table and delegates each request to the handler
//! group whose prefix matches, with that prefix stripped.

pub mod config;
pub mod groups;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use groups::HandlerGroup;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
