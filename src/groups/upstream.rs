//! Forwarding to an upstream handler group.
//!
//! # Responsibilities
//! - Point the rewritten request at the upstream authority
//! - Strip hop-by-hop headers, add X-Forwarded-* headers
//! - Enforce the upstream deadline (504 on expiry)
//! - Retry connection failures of idempotent requests with backoff
//!
//! # Design Decisions
//! - One pooled client per group; the pool handles concurrency
//! - Bodies are buffered only when a retry is possible
//! - Any HTTP response from the upstream is final, even 5xx

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{
        header::{self, HeaderName},
        uri::{Authority, Scheme, Uri},
        HeaderMap, HeaderValue, Request,
    },
    response::Response,
};
use http_body_util::LengthLimitError;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{GatewayConfig, RetryConfig};
use crate::http::request::{request_id, MatchedPrefix, X_FORWARDED_PREFIX};
use crate::http::response::GatewayError;
use crate::observability::metrics;
use crate::resilience::{backoff::calculate_backoff, retries};

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Headers meaningful only for a single transport hop.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "upgrade",
];

/// An upstream HTTP service hosting a handler group.
#[derive(Clone)]
pub struct Upstream {
    authority: Authority,
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    retry: RetryConfig,
    max_body_bytes: usize,
}

impl fmt::Debug for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upstream")
            .field("authority", &self.authority)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Upstream {
    /// Build an upstream for `address` (`host:port`) using the gateway's
    /// timeout, retry and limit settings.
    pub fn new(address: &str, config: &GatewayConfig) -> Result<Self, GatewayError> {
        let authority: Authority = address
            .parse()
            .map_err(|_| GatewayError::InvalidUpstream(address.to_string()))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            authority,
            client,
            timeout: Duration::from_secs(config.timeouts.upstream_secs),
            retry: config.retries.clone(),
            max_body_bytes: config.limits.max_body_bytes,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Forward `request` (already rewritten to the remainder path).
    pub async fn forward(
        &self,
        group: &str,
        request: Request<Body>,
    ) -> Result<Response, GatewayError> {
        let (parts, body) = request.into_parts();
        let method = parts.method.clone();
        let request_id = request_id(&parts.headers).to_string();
        let uri = self.upstream_uri(&parts.uri)?;

        let client_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let prefix = parts.extensions.get::<MatchedPrefix>();
        let mut headers = parts.headers.clone();
        prepare_headers(&mut headers, client_ip.map(|ip| ip.to_string()), prefix);

        let max_attempts = retries::max_attempts(&self.retry, &method);
        let (replay, mut once) = if max_attempts > 1 {
            (Some(buffer_body(body, self.max_body_bytes).await?), None)
        } else {
            (None, Some(body))
        };

        tracing::debug!(
            request_id = %request_id,
            group = %group,
            upstream = %self.authority,
            uri = %uri,
            "Delegating to upstream"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut outbound = Request::new(next_body(replay.as_ref(), &mut once));
            *outbound.method_mut() = method.clone();
            *outbound.uri_mut() = uri.clone();
            *outbound.headers_mut() = headers.clone();

            match tokio::time::timeout(self.timeout, self.client.request(outbound)).await {
                Ok(Ok(response)) => {
                    let (mut parts, body) = response.into_parts();
                    strip_hop_by_hop(&mut parts.headers);
                    return Ok(Response::from_parts(parts, Body::new(body)));
                }
                Ok(Err(e)) => {
                    let connect_error = e.is_connect();
                    metrics::record_upstream_error(
                        group,
                        if connect_error { "connect" } else { "protocol" },
                    );

                    if attempt < max_attempts && retries::is_retryable(&method, connect_error) {
                        let delay = calculate_backoff(attempt, &self.retry);
                        tracing::info!(
                            request_id = %request_id,
                            group = %group,
                            attempt,
                            delay = ?delay,
                            "Retrying after upstream connection error"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    tracing::error!(
                        request_id = %request_id,
                        group = %group,
                        attempt,
                        error = %e,
                        "Upstream request failed"
                    );
                    return Err(GatewayError::UpstreamUnavailable {
                        group: group.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    metrics::record_upstream_error(group, "timeout");
                    tracing::warn!(
                        request_id = %request_id,
                        group = %group,
                        timeout = ?self.timeout,
                        "Upstream timed out"
                    );
                    return Err(GatewayError::UpstreamTimeout(group.to_string()));
                }
            }
        }
    }

    fn upstream_uri(&self, uri: &Uri) -> Result<Uri, GatewayError> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some("/".parse().map_err(|_| {
                GatewayError::BadRequest("empty request path".to_string())
            })?);
        }
        Uri::from_parts(parts).map_err(|e| GatewayError::BadRequest(e.to_string()))
    }
}

/// Read the whole body so it can be replayed. Only an overflow of `limit`
/// is the client's payload being too large; anything else is a broken body.
async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        let source = e.into_inner();
        if source.is::<LengthLimitError>() {
            GatewayError::PayloadTooLarge(limit)
        } else {
            GatewayError::BadRequest(format!("failed to read request body: {source}"))
        }
    })
}

fn next_body(replay: Option<&Bytes>, once: &mut Option<Body>) -> Body {
    match (replay, once.take()) {
        (Some(bytes), _) => Body::from(bytes.clone()),
        (None, Some(body)) => body,
        (None, None) => Body::empty(),
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named by `Connection` are hop-by-hop too.
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(header::TRANSFER_ENCODING);
}

/// Prepare inbound headers for the upstream hop.
fn prepare_headers(headers: &mut HeaderMap, client_ip: Option<String>, prefix: Option<&MatchedPrefix>) {
    let original_host = headers.get(header::HOST).cloned();
    strip_hop_by_hop(headers);

    if let Some(ip) = client_ip {
        let chain = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{existing}, {ip}"),
            None => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST, host);
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(prefix) = prefix {
        if let Ok(value) = HeaderValue::from_str(prefix.as_str()) {
            headers.insert(X_FORWARDED_PREFIX, value);
        }
    }
}
