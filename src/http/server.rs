//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, request ID, response timeout)
//! - Serve HTTP/1.1 and HTTP/2 connections with a header read timeout
//! - Graceful shutdown with a bounded drain period

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
};
use tower::ServiceExt;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::{ServerError, UpstreamAddrError};
use crate::forwarder::Forwarder;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::http::response::welcome_response;
use crate::lifecycle::ShutdownSignal;
use crate::net::Listener;
use crate::observability::metrics;
use crate::routing::{Dispatcher, Target};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub forwarder: Arc<Forwarder>,
    pub welcome_body: Arc<str>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamAddrError> {
        let forwarder = Forwarder::from_config(&config.upstream)?;

        tracing::info!(
            upstream = %forwarder.upstream(),
            timeout = ?forwarder.timeout(),
            forward_body = config.upstream.forward_body,
            "Forwarder ready"
        );

        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(config.welcome.path_prefix.clone())),
            forwarder: Arc::new(forwarder),
            welcome_body: Arc::from(config.welcome.body.as_str()),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.write_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Accept connections until `shutdown` fires, then drain.
    ///
    /// After the signal the listener is closed and in-flight connections get
    /// `shutdown_grace_secs` to finish.
    pub async fn run(self, listener: Listener, mut shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let graceful = GracefulShutdown::new();
        let mut builder = Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(self.config.timeouts.read_secs));

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            continue;
                        }
                    };

                    let router = self.router.clone();
                    let service = service_fn(move |mut request: Request<Incoming>| {
                        request.extensions_mut().insert(ConnectInfo(remote_addr));
                        router.clone().oneshot(request)
                    });

                    let conn = builder
                        .serve_connection_with_upgrades(TokioIo::new(stream), service)
                        .into_owned();
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(peer_addr = %remote_addr, error = %e, "Connection error");
                        }
                        drop(permit);
                    });
                }
                _ = shutdown.recv() => {
                    tracing::info!("No longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        match tokio::time::timeout(grace, graceful.shutdown()).await {
            Ok(()) => {
                tracing::info!("HTTP server stopped");
                Ok(())
            }
            Err(_) => Err(ServerError::ShutdownTimeout(grace)),
        }
    }
}

/// Send the welcome prefix to the greeting and everything else upstream.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.dispatcher.dispatch(&request) {
        Target::Welcome => welcome_response(&state.welcome_body),
        Target::Forward => proxy_handler(&state, request).await,
    }
}

async fn proxy_handler(state: &AppState, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let response = match state.forwarder.forward(request, remote_addr).await {
        Ok(response) => response,
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(error = %e, kind = e.kind(), "Forwarding failed");
            } else {
                tracing::warn!(error = %e, kind = e.kind(), "Rejected request");
            }
            metrics::record_upstream_error(e.kind());
            e.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}
