//! Target resolution.
//!
//! # Responsibilities
//! - Turn an inbound path + query + Referer into a fully-qualified target URL
//! - Recognize reserved shortcut tokens before anything else
//! - Signal "no target" so the caller can render the home page
//!
//! # Design Decisions
//! - Referer repair: secondary asset requests (stylesheets, scripts, images)
//!   arrive with only a relative path because the browser's notion of
//!   "current page" is the rewritten proxy URL. When the Referer itself
//!   path-encodes an absolute URL, the candidate is resolved against it with
//!   standard relative-URL rules
//! - A candidate that starts with `http` but fails to parse is a client
//!   error, distinct from "no target"
//! - Only `http` and `https` targets are ever produced

use std::collections::HashMap;

use url::Url;

use crate::error::ProxyError;

/// Outcome of resolving an inbound request path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing parseable; render the landing page.
    Home,
    /// Reserved token; redirect into the path-encoding scheme.
    Shortcut(String),
    /// Fully-qualified upstream URL to fetch.
    Target(Url),
}

/// Resolve an inbound path + query against the shortcut table and the
/// Referer header.
///
/// `proxy_origin` is the scheme+host+port the proxy is reachable at;
/// `shortcuts` maps reserved bare path tokens to well-known absolute URLs.
pub fn resolve(
    path: &str,
    query: Option<&str>,
    referer: Option<&str>,
    proxy_origin: &str,
    shortcuts: &HashMap<String, String>,
) -> Result<Resolution, ProxyError> {
    // Exactly one leading separator is stripped; a remaining leading slash
    // keeps origin-relative semantics during referer repair.
    let stripped = path.strip_prefix('/').unwrap_or(path);
    if stripped.is_empty() && query.is_none() {
        return Ok(Resolution::Home);
    }

    // Reserved tokens bypass URL interpretation entirely.
    if query.is_none() {
        if let Some(destination) = shortcuts.get(stripped) {
            return Ok(Resolution::Shortcut(destination.clone()));
        }
    }

    let mut candidate = stripped.to_string();
    if let Some(q) = query {
        candidate.push('?');
        candidate.push_str(q);
    }

    if !candidate.starts_with("http") {
        if let Some(repaired) = repair_from_referer(&candidate, referer, proxy_origin) {
            candidate = repaired;
        }
    }

    if !candidate.starts_with("http") {
        return Ok(Resolution::Home);
    }

    let target = Url::parse(&candidate)
        .map_err(|e| ProxyError::InvalidTarget(format!("{candidate}: {e}")))?;
    match target.scheme() {
        "http" | "https" => Ok(Resolution::Target(target)),
        other => Err(ProxyError::InvalidTarget(format!(
            "{candidate}: unsupported scheme {other}"
        ))),
    }
}

/// Attempt to resolve `candidate` relative to the absolute URL path-encoded
/// in a proxy-origin Referer. Returns `None` when the Referer is absent,
/// foreign, or does not itself encode a target.
fn repair_from_referer(candidate: &str, referer: Option<&str>, proxy_origin: &str) -> Option<String> {
    let referer = referer?;
    if !referer.starts_with(proxy_origin) {
        return None;
    }
    let referer_url = Url::parse(referer).ok()?;

    let referer_path = referer_url.path();
    let mut encoded = referer_path.strip_prefix('/').unwrap_or(referer_path).to_string();
    if let Some(q) = referer_url.query() {
        encoded.push('?');
        encoded.push_str(q);
    }
    if !encoded.starts_with("http") {
        return None;
    }

    let base = Url::parse(&encoded).ok()?;
    base.join(candidate).ok().map(|joined| joined.to_string())
}
