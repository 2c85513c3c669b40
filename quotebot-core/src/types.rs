use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One forwarded unit: a post's title, a blank line, then its body.
///
/// Two quotes are the same quote only when their text matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quote(String);

impl Quote {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn from_post(title: &str, body: &str) -> Self {
        Self(format!("{}\n\n{}", title, body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Quote {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Quote {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Quotes already forwarded to the channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(HashSet<Quote>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, quote: &Quote) -> bool {
        self.0.contains(quote)
    }

    /// Returns `true` if the quote was not seen before.
    pub fn insert(&mut self, quote: Quote) -> bool {
        self.0.insert(quote)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Quote> for SeenSet {
    fn from_iter<I: IntoIterator<Item = Quote>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub sent: usize,
    pub skipped: usize,
    pub saved: bool,
}
