//! Response interpretation.
//!
//! Summary, answer and evaluation text pass through unchanged. Challenge
//! output is strictly decoded; a malformed question list is a terminal
//! failure. Verdicts and citations are read out of free text for logging.

use docent_core::challenge::{ChallengeSet, Verdict};
use docent_core::document::{AddressableText, Marker};
use docent_core::error::ChallengeSetError;
use thiserror::Error;

/// Feedback recorded for a question whose evaluation produced nothing.
pub const EVALUATION_FALLBACK: &str = "Evaluation not available.";

/// Challenge output could not be turned into a [`ChallengeSet`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    #[error("output is not a JSON array of strings: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Shape(#[from] ChallengeSetError),
}

/// Decode raw model output as exactly three non-blank question strings.
///
/// Only surrounding whitespace is tolerated: no code fences, no prose, no
/// coercion of non-string items.
pub fn parse_challenge(raw: &str) -> Result<ChallengeSet, InterpretError> {
    let questions: Vec<String> =
        serde_json::from_str(raw.trim()).map_err(|e| InterpretError::InvalidJson(e.to_string()))?;
    Ok(ChallengeSet::try_new(questions)?)
}

/// The verdict stated in an evaluation, if any.
///
/// The earliest label in the text wins, so "Incorrect" is never read as
/// "Correct" and "Partially Correct" is never read as "Correct".
pub fn parse_verdict(text: &str) -> Option<Verdict> {
    let lower = text.to_ascii_lowercase();
    [
        ("partially correct", Verdict::PartiallyCorrect),
        ("incorrect", Verdict::Incorrect),
        ("correct", Verdict::Correct),
    ]
    .into_iter()
    .filter_map(|(label, verdict)| lower.find(label).map(|pos| (pos, label.len(), verdict)))
    .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
    .map(|(_, _, verdict)| verdict)
}

/// Which citation markers in a model answer point at real source lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationReport {
    /// Distinct markers in order of first appearance.
    pub cited: Vec<Marker>,
    /// The subset of `cited` with no matching line in the document.
    pub unresolved: Vec<Marker>,
}

impl CitationReport {
    pub fn is_grounded(&self) -> bool {
        !self.cited.is_empty() && self.unresolved.is_empty()
    }
}

pub fn check_citations(answer: &str, text: &AddressableText) -> CitationReport {
    let mut cited: Vec<Marker> = Vec::new();
    for marker in Marker::find_all(answer) {
        if !cited.contains(&marker) {
            cited.push(marker);
        }
    }
    let unresolved = cited
        .iter()
        .filter(|m| text.resolve(m).is_none())
        .copied()
        .collect();
    CitationReport { cited, unresolved }
}
