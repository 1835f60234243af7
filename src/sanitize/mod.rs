//! Response header sanitization.
//!
//! # Responsibilities
//! - Defeat upstream CORS/CSP policy expressed in terms of the original origin
//! - Rewrite redirect `Location` targets back into the path-encoding scheme
//! - Re-scope `Set-Cookie` to the proxy's own host
//!
//! # Design Decisions
//! - Header-only stage, pure and synchronous over the buffered header set;
//!   it never touches the body
//! - Unknown and custom headers pass through unchanged
//! - `Location` uses the same three-way URL-shape rule as the HTML rewriter,
//!   so redirects and links cannot diverge

use axum::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONNECTION, LOCATION, SET_COOKIE,
    TRANSFER_ENCODING,
};
use url::Url;

use crate::rewrite::rewrite_url_value;

/// Sanitize upstream response headers in place.
pub fn sanitize(headers: &mut HeaderMap, target: &Url, proxy_origin: &str) {
    // The browser treats all proxied content as same-origin to the proxy;
    // upstream restrictions no longer apply.
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.remove("content-security-policy");
    headers.remove("content-security-policy-report-only");
    headers.remove("clear-site-data");

    // Upstream framing is this hop's concern, not the client's.
    headers.remove(TRANSFER_ENCODING);
    headers.remove(CONNECTION);

    rewrite_location(headers, target, proxy_origin);
    strip_cookie_domains(headers);
}

fn rewrite_location(headers: &mut HeaderMap, target: &Url, proxy_origin: &str) {
    let Some(location) = headers.get(LOCATION).and_then(|v| v.to_str().ok()) else {
        return;
    };
    let target_origin = target.origin().ascii_serialization();
    if let Some(rewritten) = rewrite_url_value(location, proxy_origin, &target_origin) {
        if let Ok(value) = HeaderValue::from_str(&rewritten) {
            headers.insert(LOCATION, value);
        }
    }
}

/// Remove the `Domain` attribute from every `Set-Cookie` value so cookies
/// scope to the proxy's host, which is what the browser's address bar shows.
/// All other attributes are preserved.
fn strip_cookie_domains(headers: &mut HeaderMap) {
    let cookies: Vec<String> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(strip_domain_attribute)
        .collect();
    if cookies.is_empty() {
        return;
    }

    headers.remove(SET_COOKIE);
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(SET_COOKIE, value);
        }
    }
}

fn strip_domain_attribute(cookie: &str) -> String {
    cookie
        .split(';')
        .map(str::trim)
        .filter(|part| {
            let lower = part.to_ascii_lowercase();
            lower != "domain" && !lower.starts_with("domain=")
        })
        .collect::<Vec<_>>()
        .join("; ")
}
