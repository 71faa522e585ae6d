//! `key = value` tokenizer for solver output (force blocks and ST files).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Joined form of the spiral-stability label, which the solver prints with
/// embedded spaces.
pub const SPIRAL_KEY: &str = "Clb_Cnr/Clr_Cnb";

/// Ordered `key -> value` list. Keys may repeat when several blocks are
/// concatenated; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coefficients(Vec<(String, f64)>);

impl Coefficients {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: f64) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for Coefficients {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Coefficients {
    type Item = (String, f64);
    type IntoIter = std::vec::IntoIter<(String, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Coefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.0 {
            writeln!(f, "{:<16} {:>12.6}", key, value)?;
        }
        Ok(())
    }
}

fn equals_padding() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]*=[ \t]*").expect("valid regex"))
}

fn spiral_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Clb\s+Cnr\s*/\s*Clr\s+Cnb").expect("valid regex"))
}

/// Glue every `=` to its key and value, and join lines.
pub fn normalize(text: &str) -> String {
    equals_padding().replace_all(text, "=").replace(['\r', '\n'], " ")
}

/// Every `key=value` token of a force block, in order of appearance.
pub fn parse_force_block(text: &str) -> Coefficients {
    let normalized = normalize(text);
    let mut out = Coefficients::new();
    for token in normalized.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        match value.parse::<f64>() {
            Ok(v) => out.push(key, v),
            Err(_) => log::debug!("skipping non-numeric token '{}'", token),
        }
    }
    out
}

/// Like [`parse_force_block`], with the spiral-stability label joined into
/// [`SPIRAL_KEY`] first.
pub fn parse_stability_file(text: &str) -> Coefficients {
    parse_force_block(&spiral_label().replace_all(text, SPIRAL_KEY))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
