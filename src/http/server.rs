//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the route table from configuration
//! - Create the Axum router with the dispatch fallback
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Dispatch requests to handler groups with the prefix stripped
//! - Bind server to listener and drain on shutdown

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CorsConfig, GatewayConfig};
use crate::groups::{HandlerGroup, Upstream};
use crate::http::request::{request_id, rewrite_uri, MakeRequestUuid, MatchedPrefix, X_REQUEST_ID};
use crate::http::response::GatewayError;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::routing::{RouteEntry, RouteTable};

/// Route table whose entries point at handler groups.
pub type GroupTable = RouteTable<Arc<HandlerGroup>>;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<GroupTable>,
    pub append_slash: bool,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    routes: Arc<GroupTable>,
}

impl HttpServer {
    /// Create a server whose handler groups are the configured upstreams.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let groups = config
            .groups
            .iter()
            .map(|(name, group)| {
                Upstream::new(&group.upstream, &config)
                    .map(|upstream| HandlerGroup::upstream(name.clone(), upstream))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::with_groups(config, groups)
    }

    /// Create a server with caller-supplied handler groups. Every group a
    /// route names must be present; extra groups are ignored.
    pub fn with_groups(
        config: GatewayConfig,
        groups: impl IntoIterator<Item = HandlerGroup>,
    ) -> Result<Self, GatewayError> {
        let groups: HashMap<String, Arc<HandlerGroup>> = groups
            .into_iter()
            .map(|group| (group.name().to_string(), Arc::new(group)))
            .collect();

        let entries = config
            .effective_routes()
            .into_iter()
            .map(|route| {
                groups
                    .get(&route.group)
                    .cloned()
                    .map(|group| RouteEntry::new(route.prefix, group))
                    .ok_or(GatewayError::UnknownGroup(route.group))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let routes = Arc::new(RouteTable::new(entries)?);

        for entry in routes.entries() {
            tracing::info!(
                prefix = %entry.prefix(),
                group = %entry.target().name(),
                target = %entry.target().describe(),
                "Route registered"
            );
        }

        let state = AppState {
            routes: routes.clone(),
            append_slash: config.routing.append_slash,
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            routes,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ));

        // Preflights are answered here and never reach a handler group.
        if config.cors.enabled {
            router = router.layer(cors_layer(&config.cors));
        }

        router
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The compiled route table.
    pub fn routes(&self) -> &GroupTable {
        &self.routes
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any())
        .max_age(Duration::from_secs(config.max_age_secs))
}

/// Fallback handler: every request goes through the route table.
async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();

    let Some(found) = state.routes.resolve(&path) else {
        if state.append_slash && matches!(*request.method(), Method::GET | Method::HEAD) {
            if let Some(location) = state.routes.suggest_slash(&path) {
                let location = match request.uri().query() {
                    Some(query) => format!("{location}?{query}"),
                    None => location,
                };
                tracing::debug!(
                    request_id = %request_id,
                    path = %path,
                    location = %location,
                    "Appending slash"
                );
                metrics::record_request("none", 301, start);
                return (
                    StatusCode::MOVED_PERMANENTLY,
                    [(header::LOCATION, location)],
                )
                    .into_response();
            }
        }

        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request("none", 404, start);
        return GatewayError::NotFound(path.clone()).into_response();
    };

    let group = Arc::clone(found.target());
    let prefix = MatchedPrefix::new(found.prefix());
    let remainder = found.remainder.to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %path,
        group = %group.name(),
        remainder = %remainder,
        "Dispatching request"
    );

    match rewrite_uri(request.uri(), &remainder) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            metrics::record_request(group.name(), e.status().as_u16(), start);
            return e.into_response();
        }
    }
    request.extensions_mut().insert(prefix);

    let response = match group.call(request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(group.name(), response.status().as_u16(), start);
    response
}
