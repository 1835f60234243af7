//! Outbound request construction and dispatch.
//!
//! # Responsibilities
//! - Build the outbound header map from the inbound one (anonymity and
//!   compatibility overrides, proxy-topology removal)
//! - Issue the request to the target with manual redirect handling
//!
//! # Design Decisions
//! - Redirects are never auto-followed: the sanitizer rewrites `Location`
//!   itself, keeping the path-encoding scheme intact
//! - `Accept-Encoding: identity` so the HTML rewriter always sees an
//!   uncompressed body
//! - The `Cookie` header is forwarded, enabling session-bound browsing
//! - Single attempt, no retries; network failure surfaces as a 500 with the
//!   reason

use axum::body::Bytes;
use axum::http::header::{
    HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_LENGTH, HOST, ORIGIN, REFERER, USER_AGENT,
};
use axum::http::Method;
use url::Url;

use crate::error::ProxyError;

/// Static realistic browser identity, reduces bot-blocking by upstreams.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Headers identifying proxy infrastructure; never leaked upstream.
const TOPOLOGY_HEADERS: &[&str] = &[
    "forwarded",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-proto",
    "x-real-ip",
    "via",
    "x-request-id",
    "cf-connecting-ip",
    "true-client-ip",
    "x-vercel-id",
    "x-vercel-forwarded-for",
];

/// Hop-by-hop headers, meaningful only for the inbound connection.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Build the outbound HTTP client. Manual redirect mode is the load-bearing
/// setting here.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Derive the outbound header map from the inbound one.
///
/// All transformations are simple overwrite/delete operations and are
/// order-independent.
pub fn outbound_headers(inbound: &HeaderMap, target: &Url) -> HeaderMap {
    let mut headers = inbound.clone();

    for name in TOPOLOGY_HEADERS.iter().chain(HOP_BY_HOP_HEADERS) {
        headers.remove(*name);
    }
    // reqwest frames the body itself.
    headers.remove(CONTENT_LENGTH);

    if let Some(host) = host_with_port(target) {
        if let Ok(value) = HeaderValue::from_str(&host) {
            headers.insert(HOST, value);
        }
    }
    if let Ok(value) = HeaderValue::from_str(target.as_str()) {
        headers.insert(REFERER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&target.origin().ascii_serialization()) {
        headers.insert(ORIGIN, value);
    }
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    headers
}

/// Issue the outbound request. Body and method pass through unchanged.
pub async fn forward(
    client: &reqwest::Client,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
    target: &Url,
) -> Result<reqwest::Response, ProxyError> {
    let response = client
        .request(method, target.clone())
        .headers(headers)
        .body(body)
        .send()
        .await?;
    Ok(response)
}

fn host_with_port(target: &Url) -> Option<String> {
    let host = target.host_str()?;
    Some(match target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
