//! Path-encoding forwarding proxy library.
//!
//! Lets a client browse arbitrary third-party sites through a single fixed
//! origin by embedding the full target URL in the proxy's own path:
//! `https://proxy.example/https://target.example/page`.
//!
//! # Request pipeline
//!
//! ```text
//!   inbound request
//!       → resolve   (path + Referer → target URL, shortcut, or home page)
//!       → forward   (header hygiene, manual redirects, single attempt)
//!       → sanitize  (CORS, CSP, Location, Set-Cookie domain scoping)
//!       → rewrite   (HTML attribute URLs routed back through the proxy)
//!       → response
//! ```
//!
//! Every stage is a pure transformation over request-scoped values; nothing
//! is shared across requests.

pub mod config;
pub mod error;
pub mod forward;
pub mod http;
pub mod observability;
pub mod resolve;
pub mod rewrite;
pub mod sanitize;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
