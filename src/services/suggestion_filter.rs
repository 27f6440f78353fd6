//! Whitelist filtering of model output against the local catalog.
//!
//! The model is asked for a comma-separated list of place names, but its
//! output is untrusted: it may number the entries, wrap them in quotes, add a
//! label, or invent places. Only names that exist in the catalog survive.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Labels the model tends to prepend to its list
const LABEL_PREFIXES: &[&str] = &["suggested places:", "places:", "suggestions:"];

/// Leading `1.`, `-`, `*` or `•` list markers
static ENUMERATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\.|[-*•])\s*").expect("static regex"));

/// Quote characters removed from the edges of a token
const EDGE_QUOTES: &[char] = &['\'', '`', '‘', '’', '“', '”'];

/// Case-insensitive lookup from a cleaned name to its catalog spelling
#[derive(Debug, Clone, Default)]
pub struct PlaceNameIndex {
    by_folded: HashMap<String, String>,
}

impl PlaceNameIndex {
    /// Builds the index; the first spelling of a name wins
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_folded = HashMap::new();
        for name in names {
            let name: String = name.into();
            by_folded.entry(fold(&name)).or_insert(name);
        }
        Self { by_folded }
    }

    pub fn canonical(&self, candidate: &str) -> Option<&str> {
        self.by_folded.get(&fold(candidate)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_folded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_folded.is_empty()
    }

    /// Canonical names in a stable order, for prompting
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_folded.values().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Extracts the catalog names mentioned in `raw`, in order of first mention
///
/// Only the first line is considered. Tokens that do not exactly match a
/// catalog name (ignoring case) are dropped and logged.
pub fn filter_suggestions(raw: &str, index: &PlaceNameIndex) -> Vec<String> {
    let text = raw.trim();
    if text.is_empty() {
        tracing::debug!("Model returned no text to filter");
        return Vec::new();
    }

    let first_line = text.lines().next().unwrap_or_default().replace('"', "");
    let line = strip_label(&first_line);

    let mut accepted: Vec<String> = Vec::new();
    for token in line.split(',') {
        let candidate = clean_token(token);
        if candidate.is_empty() {
            continue;
        }

        match index.canonical(candidate) {
            Some(name) => {
                if !accepted.iter().any(|a| a == name) {
                    accepted.push(name.to_string());
                }
            }
            None => {
                tracing::debug!(candidate = %candidate, "Discarding suggestion not in catalog");
            }
        }
    }

    tracing::debug!(
        accepted = accepted.len(),
        catalog = index.len(),
        "Filtered model suggestions"
    );

    accepted
}

/// Removes any known label prefixes, ignoring case
fn strip_label(line: &str) -> &str {
    let mut rest = line.trim();
    loop {
        let Some(prefix) = LABEL_PREFIXES.iter().find(|p| {
            rest.get(..p.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(p))
        }) else {
            return rest;
        };
        rest = rest[prefix.len()..].trim_start();
    }
}

fn clean_token(token: &str) -> &str {
    let token = token.trim().trim_matches(EDGE_QUOTES).trim();
    let token = match ENUMERATION_MARKER.find(token) {
        Some(marker) => &token[marker.end()..],
        None => token,
    };
    token
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace() || EDGE_QUOTES.contains(&c))
        .trim_start_matches(EDGE_QUOTES)
        .trim()
}
