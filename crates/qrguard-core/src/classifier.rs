//! Static heuristic link/content classifier.
//!
//! Pure function over the input and two fixed reference lists. No network
//! lookups, no state.

use std::fmt;

/// Domains treated as known-safe when they appear anywhere in the input.
pub static SAFE_DOMAINS: &[&str] = &[
    "google.com",
    "youtube.com",
    "github.com",
    "stackoverflow.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
    "wikipedia.org",
];

/// Keywords commonly seen in phishing / scam links.
///
/// Matched as plain substrings, so "win" also hits "winter".
pub static SUSPICIOUS_KEYWORDS: &[&str] = &[
    "free", "win", "prize", "urgent", "click", "limited", "offer", "bitcoin", "crypto", "money",
    "bank", "password", "login",
];

/// Inputs longer than this many characters are flagged when nothing else matched.
pub const LONG_INPUT_THRESHOLD: usize = 100;

pub const REASON_ABNORMALLY_LONG: &str = "abnormally long";
pub const REASON_NO_SIGNAL: &str = "no signal found";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Safe,
    Suspicious,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationResult {
    pub verdict: Verdict,
    /// Matched domain, comma-joined keywords, or a fixed note.
    pub reason: String,
    pub confidence: Confidence,
}

impl ClassificationResult {
    fn new(verdict: Verdict, reason: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            verdict,
            reason: reason.into(),
            confidence,
        }
    }
}

/// Classify a link or decoded payload. First matching rule wins:
/// safe domain, suspicious keywords, excessive length, then unknown.
pub fn classify(text: &str) -> ClassificationResult {
    let lower = text.to_lowercase();

    if let Some(domain) = SAFE_DOMAINS.iter().find(|d| lower.contains(*d)) {
        return ClassificationResult::new(Verdict::Safe, *domain, Confidence::High);
    }

    let keywords = matched_keywords(&lower);
    if !keywords.is_empty() {
        return ClassificationResult::new(
            Verdict::Suspicious,
            keywords.join(", "),
            Confidence::Medium,
        );
    }

    if text.chars().count() > LONG_INPUT_THRESHOLD {
        return ClassificationResult::new(
            Verdict::Suspicious,
            REASON_ABNORMALLY_LONG,
            Confidence::Medium,
        );
    }

    ClassificationResult::new(Verdict::Unknown, REASON_NO_SIGNAL, Confidence::Low)
}

/// Keywords present in `lower`, ordered by first occurrence (ties keep list order).
fn matched_keywords(lower: &str) -> Vec<&'static str> {
    let mut found: Vec<(usize, &'static str)> = SUSPICIOUS_KEYWORDS
        .iter()
        .filter_map(|kw| lower.find(kw).map(|pos| (pos, *kw)))
        .collect();
    // Stable sort keeps list order for equal positions.
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, kw)| kw).collect()
}
