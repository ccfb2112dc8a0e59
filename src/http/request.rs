//! Request identification and rewriting.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Rewrite the URI so a handler group sees only the remainder
//! - Carry the stripped prefix alongside the request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Query string is preserved across the rewrite

use axum::http::{
    header::HeaderName,
    uri::{PathAndQuery, Uri},
    HeaderMap, HeaderValue, Request,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::GatewayError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_FORWARDED_PREFIX: HeaderName = HeaderName::from_static("x-forwarded-prefix");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID carried in `headers`, for log fields.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Prefix a request was routed by, in URL form (`/api/ai`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPrefix(String);

impl MatchedPrefix {
    /// Build from a declared prefix such as `api/ai/`.
    pub fn new(prefix: &str) -> Self {
        Self(format!("/{}", prefix.trim_end_matches('/')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Replace the path of `uri` with `/{remainder}`, keeping the query.
pub fn rewrite_uri(uri: &Uri, remainder: &str) -> Result<Uri, GatewayError> {
    let path_and_query = match uri.query() {
        Some(query) => format!("/{remainder}?{query}"),
        None => format!("/{remainder}"),
    };
    let path_and_query = PathAndQuery::try_from(path_and_query)
        .map_err(|e| GatewayError::BadRequest(e.to_string()))?;

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(|e| GatewayError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_keeps_query() {
        let uri: Uri = "/api/analytics/contacts?period=30".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "contacts").unwrap();
        assert_eq!(rewritten, "/contacts?period=30");
    }

    #[test]
    fn test_rewrite_empty_remainder_is_root() {
        let uri: Uri = "/admin/".parse().unwrap();
        assert_eq!(rewrite_uri(&uri, "").unwrap(), "/");
    }

    #[test]
    fn test_rewrite_absolute_form() {
        let uri: Uri = "http://gateway.local/api/ai/predict".parse().unwrap();
        let rewritten = rewrite_uri(&uri, "predict").unwrap();
        assert_eq!(rewritten.to_string(), "http://gateway.local/predict");
    }

    #[test]
    fn test_matched_prefix_url_form() {
        assert_eq!(MatchedPrefix::new("api/ai/").as_str(), "/api/ai");
        assert_eq!(MatchedPrefix::new("admin/").as_str(), "/admin");
    }

    #[test]
    fn test_request_uuid_is_valid_header() {
        let req = Request::new(());
        let id = MakeRequestUuid.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
