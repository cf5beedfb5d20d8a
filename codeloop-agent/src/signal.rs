//! Structured signals parsed out of free-text agent output

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Score a linter report must reach for the loop to stop asking for changes
pub const PERFECT_SCORE: f64 = 10.0;

/// Outcome of looking for a signal in text.
///
/// Absence is its own variant so it can never be confused with a zero score
/// or an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal<T> {
    Found(T),
    NotFound,
}

impl<T> Signal<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Signal::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Signal::Found(value) => Some(value),
            Signal::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Signal<U> {
        match self {
            Signal::Found(value) => Signal::Found(f(value)),
            Signal::NotFound => Signal::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Signal<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Signal::Found(v),
            None => Signal::NotFound,
        }
    }
}

static SCORE_RE: OnceLock<Regex> = OnceLock::new();

/// Find a pylint-style rating: `Your code has been rated at 7.50/10`.
///
/// The first rating wins, so `(previous run: ...)` trailers are ignored.
pub fn extract_quality_score(text: &str) -> Signal<f64> {
    let re = SCORE_RE.get_or_init(|| {
        Regex::new(r"rated at (-?\d+(?:\.\d+)?)/10").expect("quality score regex")
    });

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .into()
}

/// Which signals the chat loop reads from an agent's replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalRole {
    /// Replies carry a quality score
    Linter,
    /// Replies carry a code block
    Coder,
    /// Replies are passed along untouched
    Other,
}

impl SignalRole {
    /// Classify by agent name: anything containing "linter" reports scores,
    /// exactly "coder" produces code (both case-insensitive).
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("linter") {
            SignalRole::Linter
        } else if name == "coder" {
            SignalRole::Coder
        } else {
            SignalRole::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pylint_rating() {
        let report = "************* Module tmp\n\
                      tmp.py:1:0: C0114: Missing module docstring (missing-module-docstring)\n\
                      \n\
                      ------------------------------------------------------------------\n\
                      Your code has been rated at 7.50/10 (previous run: 5.00/10, +2.50)\n";
        assert_eq!(extract_quality_score(report), Signal::Found(7.5));
    }

    #[test]
    fn test_perfect_rating() {
        let score = extract_quality_score("rated at 10.00/10");
        assert_eq!(score, Signal::Found(PERFECT_SCORE));
    }

    #[test]
    fn test_negative_and_integer_ratings() {
        assert_eq!(extract_quality_score("rated at -3.20/10"), Signal::Found(-3.2));
        assert_eq!(extract_quality_score("rated at 9/10"), Signal::Found(9.0));
    }

    #[test]
    fn test_missing_rating_is_not_zero() {
        let score = extract_quality_score("pylint: command not found");
        assert_eq!(score, Signal::NotFound);
        assert_eq!(score.found(), None);
    }

    #[test]
    fn test_signal_helpers() {
        let found = Signal::Found("  x ").map(str::trim);
        assert!(found.is_found());
        assert_eq!(found.found(), Some("x"));
        assert_eq!(Signal::<u8>::from(None), Signal::NotFound);
    }

    #[test]
    fn test_role_from_name() {
        assert_eq!(SignalRole::from_name("Linter"), SignalRole::Linter);
        assert_eq!(SignalRole::from_name("PylintLinter"), SignalRole::Linter);
        assert_eq!(SignalRole::from_name("CODER"), SignalRole::Coder);
        assert_eq!(SignalRole::from_name("Coder 2"), SignalRole::Other);
        assert_eq!(SignalRole::from_name("Debugger"), SignalRole::Other);
    }
}
