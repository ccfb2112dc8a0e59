//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, URI rewrite)
//!     → routing (prefix lookup)
//!     → groups (local router or upstream)
//!     → response.rs (gateway errors rendered as JSON)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MatchedPrefix, X_REQUEST_ID};
pub use response::GatewayError;
pub use server::HttpServer;
