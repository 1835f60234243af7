//! HTML link rewriting.
//!
//! # Responsibilities
//! - Hold the tag → URL-bearing-attribute table (immutable configuration)
//! - Classify a single attribute value by URL shape and rewrite it
//! - Drive the single-pass scanner over HTML bodies
//!
//! # Design Decisions
//! - The rule table is an explicitly passed value, not shared mutable state;
//!   site-specific quirks (lazy-load attributes, custom elements) are added
//!   through configuration without touching the scanning algorithm
//! - Bare relative paths, fragments, `mailto:` and `javascript:` values are
//!   never rewritten: without full base-URL resolution that would corrupt
//!   non-navigational attribute values
//! - Rewriting is idempotent: a value already prefixed with the proxy origin
//!   is left alone

use std::collections::HashMap;

pub mod scanner;

pub use scanner::HtmlRewriter;

/// Maps a lowercase tag name to the attribute names on that element which
/// carry URLs needing rewriting (e.g. `a → href`, `img → {src, data-src}`).
#[derive(Debug, Clone)]
pub struct RewriteRules {
    tags: HashMap<String, Vec<String>>,
}

impl RewriteRules {
    /// An empty table; nothing gets rewritten.
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    /// The built-in table covering the common URL-bearing attributes.
    pub fn standard() -> Self {
        let mut rules = Self::empty();
        rules.set("a", &["href"]);
        rules.set("link", &["href"]);
        rules.set("img", &["src", "data-src"]);
        rules.set("script", &["src"]);
        rules.set("iframe", &["src"]);
        rules.set("embed", &["src"]);
        rules.set("source", &["src"]);
        rules.set("form", &["action"]);
        rules.set("video", &["src", "poster"]);
        rules.set("audio", &["src"]);
        rules
    }

    /// The standard table with per-tag overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<String, Vec<String>>) -> Self {
        let mut rules = Self::standard();
        for (tag, attrs) in overrides {
            let attrs: Vec<&str> = attrs.iter().map(String::as_str).collect();
            rules.set(tag, &attrs);
        }
        rules
    }

    /// Register (or replace) the rewritable attributes for a tag.
    pub fn set(&mut self, tag: &str, attrs: &[&str]) {
        self.tags.insert(
            tag.to_ascii_lowercase(),
            attrs.iter().map(|a| a.to_ascii_lowercase()).collect(),
        );
    }

    /// Rewritable attribute names for a lowercase tag name, if any.
    pub fn attrs_for(&self, tag: &str) -> Option<&[String]> {
        self.tags.get(tag).map(Vec::as_slice)
    }
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rewrite a single URL value by shape, returning `None` when the value must
/// be left untouched.
///
/// Shapes, checked in priority order:
/// 1. absolute (`http…`) → `proxy_origin/value`, unless already proxied
/// 2. protocol-relative (`//…`) → `proxy_origin/https://…`
/// 3. origin-relative (`/…`) → `proxy_origin/target_origin/…`
/// 4. anything else → untouched
///
/// The same rule is used for HTML attribute values and the `Location`
/// response header.
pub fn rewrite_url_value(value: &str, proxy_origin: &str, target_origin: &str) -> Option<String> {
    if value.starts_with("http") {
        // Idempotence: never double-prefix a value that already routes
        // through the proxy.
        if value
            .strip_prefix(proxy_origin)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        {
            return None;
        }
        Some(format!("{proxy_origin}/{value}"))
    } else if value.starts_with("//") {
        // No scheme given; assume https.
        Some(format!("{proxy_origin}/https:{value}"))
    } else if value.starts_with('/') {
        Some(format!("{proxy_origin}/{target_origin}{value}"))
    } else {
        None
    }
}
