//! Handler groups.
//!
//! A handler group is the external collection of endpoints reachable under a
//! route prefix. The gateway never looks inside one: it hands over the
//! rewritten request and returns whatever comes back.
//!
//! # Targets
//! - `Local`: an `axum::Router` supplied by the embedding application
//! - `Upstream`: an HTTP service the request is forwarded to

pub mod upstream;

use axum::{
    body::Body,
    http::Request,
    response::Response,
    Router,
};
use tower::ServiceExt;

use crate::http::response::GatewayError;

pub use upstream::Upstream;

/// Where a handler group lives.
#[derive(Debug, Clone)]
pub enum Target {
    Local(Router),
    Upstream(Upstream),
}

/// A named handler group.
#[derive(Debug, Clone)]
pub struct HandlerGroup {
    name: String,
    target: Target,
}

impl HandlerGroup {
    /// An in-process group served by `router`.
    pub fn local(name: impl Into<String>, router: Router) -> Self {
        Self {
            name: name.into(),
            target: Target::Local(router),
        }
    }

    /// A group served by a remote HTTP service.
    pub fn upstream(name: impl Into<String>, upstream: Upstream) -> Self {
        Self {
            name: name.into(),
            target: Target::Upstream(upstream),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Short human description of the target, for listings.
    pub fn describe(&self) -> String {
        match &self.target {
            Target::Local(_) => "in-process".to_string(),
            Target::Upstream(upstream) => format!("http://{}", upstream.authority()),
        }
    }

    /// Delegate an already rewritten request to this group.
    pub async fn call(&self, request: Request<Body>) -> Result<Response, GatewayError> {
        match &self.target {
            Target::Local(router) => match router.clone().oneshot(request).await {
                Ok(response) => Ok(response),
                Err(never) => match never {},
            },
            Target::Upstream(upstream) => upstream.forward(&self.name, request).await,
        }
    }
}
