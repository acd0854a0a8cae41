//! Near-duplicate detection for tutor questions
//!
//! A new question is compared against the user's earlier questions with a
//! normalized Levenshtein similarity. The first earlier question scoring
//! strictly above the threshold is returned so the tutor can offer a hint
//! instead of starting over.
//!
//! Lengths are counted in Unicode scalar values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// History entries must be longer than this many characters to be compared
pub const DEFAULT_MIN_LENGTH: usize = 5;

/// Similarity must strictly exceed this to count as "asked before"
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// New text must be longer than this many characters before history is scanned
pub const DEFAULT_QUERY_MIN_LENGTH: usize = 12;

/// One recorded chat message, in the chat history's JSON shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "content")]
    pub text: String,
    #[serde(rename = "isUser")]
    pub is_from_user: bool,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_from_user: true,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_from_user: false,
        }
    }
}

/// Which assistant a chat history belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Tutor,
    Psych,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Tutor => "tutor",
            SessionKind::Psych => "psych",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tutor" => Ok(SessionKind::Tutor),
            "psych" => Ok(SessionKind::Psych),
            other => Err(crate::Error::InvalidArgument(format!(
                "unknown session kind '{}'",
                other
            ))),
        }
    }
}

/// Tunables for the "asked before" check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallSettings {
    /// History entries must be longer than this to be candidates
    pub min_length: usize,
    /// Similarity must strictly exceed this
    pub threshold: f64,
    /// New text must be longer than this to run the check at all
    pub query_min_length: usize,
}

impl Default for RecallSettings {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            threshold: DEFAULT_THRESHOLD,
            query_min_length: DEFAULT_QUERY_MIN_LENGTH,
        }
    }
}

/// Levenshtein distance with unit costs, using two rolling rows sized by `s`.
pub fn edit_distance(s: &str, t: &str) -> usize {
    let s: Vec<char> = s.chars().collect();

    let mut cost: Vec<usize> = (0..=s.len()).collect();
    let mut new_cost = vec![0usize; s.len() + 1];

    for (i, tc) in t.chars().enumerate() {
        new_cost[0] = i + 1;
        for j in 1..=s.len() {
            let substitute = cost[j - 1] + usize::from(s[j - 1] != tc);
            let insert = cost[j] + 1;
            let delete = new_cost[j - 1] + 1;
            new_cost[j] = substitute.min(insert).min(delete);
        }
        std::mem::swap(&mut cost, &mut new_cost);
    }

    cost[s.len()]
}

/// Case-insensitive normalized similarity in `[0, 1]`.
///
/// `(len(longer) - distance) / len(longer)`; two empty strings are
/// identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (longer, longer_len, shorter) = if a_len >= b_len {
        (&a, a_len, &b)
    } else {
        (&b, b_len, &a)
    };

    if longer_len == 0 {
        return 1.0;
    }

    let distance = edit_distance(longer, shorter);
    (longer_len as f64 - distance as f64) / longer_len as f64
}

/// First earlier user message similar to `new_text`, in history order.
///
/// Only user messages longer than `min_length` characters are considered,
/// and the score must be strictly greater than `threshold`. The scan stops
/// at the first match rather than looking for the best one.
pub fn find_similar<'a>(
    new_text: &str,
    history: &'a [HistoryEntry],
    min_length: usize,
    threshold: f64,
) -> Option<&'a str> {
    history
        .iter()
        .filter(|entry| entry.is_from_user && entry.text.chars().count() > min_length)
        .find(|entry| similarity(new_text, &entry.text) > threshold)
        .map(|entry| entry.text.as_str())
}

/// Gate on the new text's length, then run [`find_similar`] with `settings`.
pub fn check_recall<'a>(
    new_text: &str,
    history: &'a [HistoryEntry],
    settings: &RecallSettings,
) -> Option<&'a str> {
    if new_text.chars().count() <= settings.query_min_length {
        return None;
    }
    find_similar(new_text, history, settings.min_length, settings.threshold)
}
