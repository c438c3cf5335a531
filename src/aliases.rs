//! Stable per-file aliases and reference path helpers.
//!
//! Every chapter file gets a short decimal alias the first time it is seen.
//! Labels and internal hyperlink targets are expressed as `alias#fragment`,
//! so a link written from any chapter resolves to the same string the target
//! chapter registered for itself.

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use percent_encoding::percent_decode_str;

/// How a hyperlink `href` should be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `#fragment` inside the current file.
    Fragment,
    /// Relative path to another file of the book.
    CrossFile,
    /// Absolute URI with a scheme (`http:`, `mailto:`, ...).
    External,
}

impl ReferenceKind {
    /// Classify a raw `href` value.
    pub fn classify(href: &str) -> Self {
        if href.starts_with('#') {
            return Self::Fragment;
        }
        if has_uri_scheme(href) {
            Self::External
        } else {
            Self::CrossFile
        }
    }
}

fn has_uri_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

/// Table mapping normalized file paths to decimal alias strings.
#[derive(Clone, Debug, Default)]
pub struct FileAliases {
    entries: Vec<(String, String)>,
    index: BTreeMap<String, usize>,
}

impl FileAliases {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for `path`, assigning the next free id on first sight.
    ///
    /// Raw and normalized spellings of the same path share one alias.
    pub fn alias_for(&mut self, path: &str) -> &str {
        let slot = match self.index.get(path) {
            Some(slot) => *slot,
            None => {
                let normalized = normalize_path(&decode_html_url(path));
                let slot = match self.index.get(&normalized) {
                    Some(slot) => *slot,
                    None => {
                        let slot = self.entries.len();
                        self.entries.push((normalized.clone(), slot.to_string()));
                        self.index.insert(normalized, slot);
                        slot
                    }
                };
                self.index.insert(path.to_string(), slot);
                slot
            }
        };
        &self.entries[slot].1
    }

    /// Alias for `path` if it was already assigned.
    pub fn get(&self, path: &str) -> Option<&str> {
        let slot = match self.index.get(path) {
            Some(slot) => *slot,
            None => *self.index.get(&normalize_path(&decode_html_url(path)))?,
        };
        Some(self.entries[slot].1.as_str())
    }

    /// Rewrite `path#fragment` as `alias#fragment`.
    ///
    /// The fragment is carried over unchanged; a reference without one maps
    /// to the bare alias.
    pub fn normalized_reference(&mut self, reference: &str) -> String {
        let (path, fragment) = match reference.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (reference, None),
        };
        let mut out = self.alias_for(path).to_string();
        if let Some(fragment) = fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    /// Number of distinct files aliased.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no file has been aliased.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(normalized path, alias)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, alias)| (path.as_str(), alias.as_str()))
    }
}

/// Percent-decode a URL path, replacing invalid UTF-8 lossily.
pub fn decode_html_url(url: &str) -> Cow<'_, str> {
    percent_decode_str(url).decode_utf8_lossy()
}

/// Resolve `.`, `..` and empty segments; the result has no leading `/`.
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(8);
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    parts.join("/")
}

/// Everything up to and including the last `/`, or `""`.
pub fn directory_prefix(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}
