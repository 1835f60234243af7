//! HTTP server setup and the proxy pipeline handler.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (tracing, request timeout)
//! - Derive the proxy origin per request
//! - Drive resolve → forward → sanitize → rewrite for each request
//!
//! # Responses
//! - `/` and unresolvable paths → landing page (200)
//! - shortcut tokens → 302 into the path-encoding scheme
//! - resolved targets → upstream status, sanitized headers, rewritten body
//! - invalid target → 400, upstream failure → 500

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST, LOCATION, REFERER},
    http::{HeaderMap, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::schema::ListenerConfig;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::forward::{build_client, forward, outbound_headers};
use crate::http::home::render_home;
use crate::observability::metrics;
use crate::resolve::{resolve, Resolution};
use crate::rewrite::{HtmlRewriter, RewriteRules};
use crate::sanitize::sanitize;

/// Application state injected into the handler. Immutable after startup;
/// per-request values never land here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub rules: Arc<RewriteRules>,
    pub client: reqwest::Client,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    #[allow(deprecated)]
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let rules = Arc::new(RewriteRules::with_overrides(&config.rewrite.rules));
        let client = build_client()?;
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);

        let state = AppState {
            config: Arc::new(config),
            rules,
            client,
        };

        let router = Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http());

        Ok(Self { router })
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: resolve the target, forward, sanitize, rewrite.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let method_str = method.to_string();

    let proxy_origin = derive_proxy_origin(&parts.headers, &parts.uri, &state.config.listener);
    let referer = parts.headers.get(REFERER).and_then(|v| v.to_str().ok());

    let resolution = match resolve(
        parts.uri.path(),
        parts.uri.query(),
        referer,
        &proxy_origin,
        &state.config.shortcuts,
    ) {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::warn!(request_id = %request_id, path = %parts.uri.path(), error = %err, "Target resolution failed");
            metrics::record_request(&method_str, err.status().as_u16(), "none", start);
            return err.into_response();
        }
    };

    let target = match resolution {
        Resolution::Home => {
            metrics::record_request(&method_str, 200, "home", start);
            return render_home(&proxy_origin, &state.config.home).into_response();
        }
        Resolution::Shortcut(destination) => {
            metrics::record_request(&method_str, 302, "shortcut", start);
            return redirect_found(&format!("{proxy_origin}/{destination}"));
        }
        Resolution::Target(url) => url,
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Proxying request"
    );

    let body_bytes = match axum::body::to_bytes(body, state.config.limits.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            let err = ProxyError::BodyTooLarge;
            metrics::record_request(&method_str, err.status().as_u16(), "none", start);
            return err.into_response();
        }
    };

    let headers = outbound_headers(&parts.headers, &target);
    let upstream = match forward(&state.client, method, headers, body_bytes, &target).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(request_id = %request_id, target = %target, error = %err, "Upstream error");
            metrics::record_request(
                &method_str,
                err.status().as_u16(),
                target.host_str().unwrap_or("none"),
                start,
            );
            return err.into_response();
        }
    };

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    sanitize(&mut headers, &target, &proxy_origin);

    // Decided once, from the immutable Content-Type; never reconsidered
    // mid-stream.
    let is_html = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));

    let body = if is_html {
        let bytes = match upstream.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(request_id = %request_id, target = %target, error = %err, "Upstream body error");
                let err = ProxyError::from(err);
                metrics::record_request(
                    &method_str,
                    err.status().as_u16(),
                    target.host_str().unwrap_or("none"),
                    start,
                );
                return err.into_response();
            }
        };
        match std::str::from_utf8(&bytes) {
            Ok(text) => {
                let target_origin = target.origin().ascii_serialization();
                let rewriter = HtmlRewriter::new(&state.rules, &proxy_origin, &target_origin);
                let rewritten = rewriter.rewrite(text);
                // Length changed; the server recomputes framing.
                headers.remove(CONTENT_LENGTH);
                Body::from(rewritten)
            }
            // Not UTF-8; forward the bytes untouched rather than corrupt them.
            Err(_) => Body::from(bytes),
        }
    } else {
        // Non-HTML bodies stream through byte-identical. Dropping this
        // response (client disconnect) drops the upstream connection with it.
        Body::from_stream(upstream.bytes_stream())
    };

    // Recorded once the response status is settled; a failed HTML body read
    // above records its own error status instead of the upstream's.
    metrics::record_request(
        &method_str,
        status.as_u16(),
        target.host_str().unwrap_or("none"),
        start,
    );

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Scheme+host+port the proxy is reachable at, for this request.
fn derive_proxy_origin(headers: &HeaderMap, uri: &Uri, listener: &ListenerConfig) -> String {
    if !listener.public_origin.is_empty() {
        return listener.public_origin.trim_end_matches('/').to_string();
    }
    let scheme = uri.scheme_str().unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

fn redirect_found(location: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    if let Ok(value) = axum::http::HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
