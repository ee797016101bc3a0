//! Comprehension challenge types.
//!
//! A challenge is never persisted server-side: the caller receives the
//! questions and sends them back, with answers, for evaluation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ChallengeSetError;

/// How many questions a generated challenge must contain.
pub const CHALLENGE_QUESTION_COUNT: usize = 3;

/// Exactly [`CHALLENGE_QUESTION_COUNT`] non-blank questions, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChallengeSet(Vec<String>);

impl ChallengeSet {
    pub fn try_new(questions: Vec<String>) -> Result<Self, ChallengeSetError> {
        if questions.len() != CHALLENGE_QUESTION_COUNT {
            return Err(ChallengeSetError::WrongCount {
                expected: CHALLENGE_QUESTION_COUNT,
                actual: questions.len(),
            });
        }
        if let Some(index) = questions.iter().position(|q| q.trim().is_empty()) {
            return Err(ChallengeSetError::BlankQuestion { index });
        }
        Ok(Self(questions))
    }

    pub fn questions(&self) -> &[String] {
        &self.0
    }
}

/// Per-question evaluation text keyed by question index.
///
/// Serializes as a JSON object whose keys are the string-encoded indices
/// (`{"0": "...", "1": "..."}`), matching the caller's answer mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationFeedback(BTreeMap<usize, String>);

impl EvaluationFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, feedback: impl Into<String>) {
        self.0.insert(index, feedback.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(i, s)| (*i, s.as_str()))
    }
}

/// The ternary grade a model gives a user's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    PartiallyCorrect,
    Incorrect,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::PartiallyCorrect => "Partially Correct",
            Self::Incorrect => "Incorrect",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
