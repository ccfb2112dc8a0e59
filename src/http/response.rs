//! Gateway errors and their HTTP rendering.
//!
//! Every failure the gateway itself produces is answered with a small JSON
//! body: `{"error": "<code>", "message": "..."}`. Responses produced by a
//! handler group pass through untouched.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no route matches `{0}`")]
    NotFound(String),

    #[error("handler group `{group}` is unreachable: {reason}")]
    UpstreamUnavailable { group: String, reason: String },

    #[error("handler group `{0}` did not answer in time")]
    UpstreamTimeout(String),

    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("handler group `{0}` is not defined")]
    UnknownGroup(String),

    #[error("invalid upstream address `{0}`")]
    InvalidUpstream(String),

    #[error("route table: {0}")]
    Routes(#[from] RouteError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnknownGroup(_)
            | GatewayError::InvalidUpstream(_)
            | GatewayError::Routes(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::NotFound(_) => "not_found",
            GatewayError::UpstreamUnavailable { .. } => "bad_gateway",
            GatewayError::UpstreamTimeout(_) => "gateway_timeout",
            GatewayError::PayloadTooLarge(_) => "payload_too_large",
            GatewayError::BadRequest(_) => "bad_request",
            GatewayError::UnknownGroup(_)
            | GatewayError::InvalidUpstream(_)
            | GatewayError::Routes(_) => "internal_error",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let path = match &self {
            GatewayError::NotFound(path) => Some(path.as_str()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
            path,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: GatewayError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body_carries_path() {
        let (status, body) = body_json(GatewayError::NotFound("/nowhere".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["path"], "/nowhere");
    }

    #[tokio::test]
    async fn test_upstream_errors_map_to_gateway_statuses() {
        let (status, body) = body_json(GatewayError::UpstreamUnavailable {
            group: "ai_features".into(),
            reason: "connection refused".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "bad_gateway");
        assert!(body.get("path").is_none());

        let (status, _) = body_json(GatewayError::UpstreamTimeout("analytics".into())).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }
}
