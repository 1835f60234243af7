//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, public origin).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request buffering limits.
    pub limits: LimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Landing page copy and shortcut links.
    pub home: HomeConfig,

    /// Reserved bare path tokens resolving to well-known URLs
    /// (e.g. `gh = "https://github.com"`).
    #[serde(default = "default_shortcuts")]
    pub shortcuts: HashMap<String, String>,

    /// HTML rewrite rule overrides.
    pub rewrite: RewriteConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
            observability: ObservabilityConfig::default(),
            home: HomeConfig::default(),
            shortcuts: default_shortcuts(),
            rewrite: RewriteConfig::default(),
        }
    }
}

fn default_shortcuts() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("gh".to_string(), "https://github.com".to_string());
    map
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Origin the proxy is publicly reachable at, e.g.
    /// "https://proxy.example". When empty, derived per request from the
    /// inbound Host header. Set this when TLS terminates in front of the
    /// proxy.
    pub public_origin: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_origin: String::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request buffering limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Landing page copy and shortcut links.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HomeConfig {
    /// Browser tab title.
    pub page_title: String,

    /// Main heading.
    pub main_title: String,

    /// Subtitle below the heading.
    pub sub_title: String,

    /// URL input placeholder text.
    pub input_placeholder: String,

    /// Submit button label.
    pub button_text: String,

    /// Optional background image URL; the flat dark background is used when
    /// empty.
    pub bg_image: String,

    /// Shortcut links rendered below the input.
    pub shortcuts: Vec<HomeShortcut>,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            page_title: "mirrorgate".to_string(),
            main_title: "mirrorgate".to_string(),
            sub_title: "browse anywhere through one origin".to_string(),
            input_placeholder: "Enter a URL to start (e.g. google.com)".to_string(),
            button_text: "Go".to_string(),
            bg_image: String::new(),
            shortcuts: vec![
                HomeShortcut::new("Google", "https://www.google.com"),
                HomeShortcut::new("GitHub", "https://github.com"),
                HomeShortcut::new("Wikipedia", "https://en.wikipedia.org"),
                HomeShortcut::new("YouTube", "https://www.youtube.com"),
            ],
        }
    }
}

/// A single landing page shortcut link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HomeShortcut {
    pub name: String,
    pub url: String,
}

impl HomeShortcut {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// HTML rewrite rule overrides, merged over the built-in table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RewriteConfig {
    /// Per-tag attribute lists, e.g. `img = ["src", "data-src", "data-original"]`.
    pub rules: HashMap<String, Vec<String>>,
}
