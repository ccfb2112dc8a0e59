//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup, declaration order)
//!     → matcher.rs (prefix test + strip)
//!     → Return: matched entry + remainder, or NoMatch
//!
//! Route Compilation (at startup):
//!     urls.rs / RouteConfig[]
//!     → Validate prefixes (syntax, duplicates)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by declaration)

pub mod inspect;
pub mod matcher;
pub mod router;
pub mod urls;

pub use matcher::PathPrefixMatcher;
pub use router::{RouteEntry, RouteError, RouteMatch, RouteTable};
