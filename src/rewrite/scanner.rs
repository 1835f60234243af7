//! Single-pass HTML attribute scanner.
//!
//! # Responsibilities
//! - Walk tag boundaries and attribute spans in one pass over the document
//! - Replace only attribute values the rule table owns; every other byte is
//!   emitted verbatim, in original order
//! - Skip `<script>`/`<style>` text, comments, and doctype declarations
//!
//! # Design Decisions
//! - A small state machine over {outside-tag, tag-name, attr-name,
//!   attr-value} instead of whole-document regex substitution: attribute
//!   order and quoting style vary, one element may carry several rewritable
//!   attributes, and script/style text must never be touched
//! - No DOM, no re-serialization: whitespace, attribute order, quoting and
//!   self-closing syntax of untouched elements are preserved exactly
//! - Malformed markup (unterminated tags, quotes, comments) is copied through
//!   verbatim rather than erroring

use super::{rewrite_url_value, RewriteRules};

/// Rewrites URL-bearing attributes in an HTML document so intra-page links
/// route back through the proxy.
pub struct HtmlRewriter<'a> {
    rules: &'a RewriteRules,
    proxy_origin: &'a str,
    target_origin: &'a str,
}

impl<'a> HtmlRewriter<'a> {
    pub fn new(rules: &'a RewriteRules, proxy_origin: &'a str, target_origin: &'a str) -> Self {
        Self {
            rules,
            proxy_origin,
            target_origin,
        }
    }

    /// Rewrite `input` in a single pass.
    pub fn rewrite(&self, input: &str) -> String {
        let bytes = input.as_bytes();
        let len = bytes.len();
        let mut out = String::with_capacity(len + len / 8);
        let mut i = 0;

        while i < len {
            // Text node: copy up to the next tag open.
            match find_byte(bytes, b'<', i) {
                Some(lt) => {
                    out.push_str(&input[i..lt]);
                    i = lt;
                }
                None => {
                    out.push_str(&input[i..]);
                    break;
                }
            }

            if bytes[i..].starts_with(b"<!--") {
                // Comment, copied through its terminator.
                let end = find_subslice(bytes, b"-->", i + 4).map_or(len, |p| p + 3);
                out.push_str(&input[i..end]);
                i = end;
            } else if i + 1 < len && (bytes[i + 1] == b'!' || bytes[i + 1] == b'?') {
                // Doctype or processing instruction.
                let end = find_byte(bytes, b'>', i).map_or(len, |p| p + 1);
                out.push_str(&input[i..end]);
                i = end;
            } else if i + 1 < len && bytes[i + 1] == b'/' {
                // Closing tag.
                let end = find_byte(bytes, b'>', i).map_or(len, |p| p + 1);
                out.push_str(&input[i..end]);
                i = end;
            } else if i + 1 < len && bytes[i + 1].is_ascii_alphabetic() {
                i = self.scan_tag(input, i, &mut out);
            } else {
                // Stray '<' in text.
                out.push('<');
                i += 1;
            }
        }

        out
    }

    /// Scan one opening tag starting at `start` (pointing at `<`), emit it
    /// with any attribute rewrites spliced in, and return the index just past
    /// the element (including raw text for script/style).
    fn scan_tag(&self, input: &str, start: usize, out: &mut String) -> usize {
        let bytes = input.as_bytes();
        let len = bytes.len();

        let mut p = start + 1;
        while p < len
            && (bytes[p].is_ascii_alphanumeric() || bytes[p] == b'-' || bytes[p] == b':')
        {
            p += 1;
        }
        let tag = input[start + 1..p].to_ascii_lowercase();
        let attrs = self.rules.attrs_for(&tag);

        // Byte spans to replace: (value_start, value_end, replacement).
        let mut edits: Vec<(usize, usize, String)> = Vec::new();
        let mut self_closing = false;
        let mut closed = true;
        let tag_end;

        loop {
            while p < len && bytes[p].is_ascii_whitespace() {
                p += 1;
            }
            if p >= len {
                tag_end = len;
                closed = false;
                break;
            }
            match bytes[p] {
                b'>' => {
                    tag_end = p + 1;
                    break;
                }
                b'/' => {
                    if p + 1 < len && bytes[p + 1] == b'>' {
                        self_closing = true;
                    }
                    p += 1;
                }
                _ => {
                    let name_start = p;
                    while p < len
                        && !bytes[p].is_ascii_whitespace()
                        && bytes[p] != b'='
                        && bytes[p] != b'>'
                        && bytes[p] != b'/'
                    {
                        p += 1;
                    }
                    let name = input[name_start..p].to_ascii_lowercase();

                    while p < len && bytes[p].is_ascii_whitespace() {
                        p += 1;
                    }
                    if p >= len || bytes[p] != b'=' {
                        // Bare attribute without a value.
                        continue;
                    }
                    p += 1;
                    while p < len && bytes[p].is_ascii_whitespace() {
                        p += 1;
                    }
                    if p >= len {
                        tag_end = len;
                        closed = false;
                        break;
                    }

                    let (value_start, value_end) = match bytes[p] {
                        quote @ (b'"' | b'\'') => {
                            let value_start = p + 1;
                            match find_byte(bytes, quote, value_start) {
                                Some(close) => {
                                    p = close + 1;
                                    (value_start, close)
                                }
                                None => {
                                    p = len;
                                    (value_start, len)
                                }
                            }
                        }
                        _ => {
                            let value_start = p;
                            while p < len && !bytes[p].is_ascii_whitespace() && bytes[p] != b'>' {
                                p += 1;
                            }
                            (value_start, p)
                        }
                    };

                    if attrs.is_some_and(|a| a.iter().any(|a| a == &name)) {
                        if let Some(replacement) = rewrite_url_value(
                            &input[value_start..value_end],
                            self.proxy_origin,
                            self.target_origin,
                        ) {
                            edits.push((value_start, value_end, replacement));
                        }
                    }
                }
            }
        }

        // An unterminated tag is malformed input; emit it untouched.
        if !closed {
            edits.clear();
        }

        // Emit the tag, splicing in replacements; bytes we do not own are
        // copied verbatim.
        let mut cursor = start;
        for (edit_start, edit_end, replacement) in &edits {
            out.push_str(&input[cursor..*edit_start]);
            out.push_str(replacement);
            cursor = *edit_end;
        }
        out.push_str(&input[cursor..tag_end]);

        // Raw-text elements: their text content is not markup and must never
        // be rewritten. Copy through to the matching close tag.
        if !self_closing && (tag == "script" || tag == "style") {
            let close = format!("</{tag}");
            let raw_end = find_subslice_ci(bytes, close.as_bytes(), tag_end).unwrap_or(len);
            out.push_str(&input[tag_end..raw_end]);
            return raw_end;
        }

        tag_end
    }
}

fn find_byte(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack[from..].iter().position(|&b| b == needle).map(|p| p + from)
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn find_subslice_ci(haystack: &[u8], needle_lower: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle_lower.len())
        .position(|w| w.eq_ignore_ascii_case(needle_lower))
        .map(|p| p + from)
}
