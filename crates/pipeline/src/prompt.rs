//! Prompt builder.
//!
//! Pure functions that turn addressable text plus task parameters into a
//! [`PromptRequest`]. Every prompt embeds the whole document; there is no
//! chunking or retrieval.
//!
//! Prompts that ask for citations name the marker scheme through
//! [`MARKER_VOCABULARY`], the same constant the extractor's markers are
//! checked against.

use docent_core::challenge::CHALLENGE_QUESTION_COUNT;
use docent_core::document::{AddressableText, MARKER_VOCABULARY};
use docent_core::provider::OutputSchema;

/// Upper bound on summary length requested from the model.
pub const SUMMARY_WORD_LIMIT: usize = 150;

/// A prompt ready for the model gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt: String,
    pub output: OutputSchema,
}

impl PromptRequest {
    fn plain(prompt: String) -> Self {
        Self {
            prompt,
            output: OutputSchema::PlainText,
        }
    }
}

/// Summary of at most [`SUMMARY_WORD_LIMIT`] words.
pub fn summarize(text: &AddressableText) -> PromptRequest {
    PromptRequest::plain(format!(
        "Summarize the following document in no more than {SUMMARY_WORD_LIMIT} words. \
         Focus on the main points. Document content: {text}"
    ))
}

/// Free-form question answered from the document with cited evidence.
pub fn answer(text: &AddressableText, query: &str) -> PromptRequest {
    PromptRequest::plain(format!(
        "Based on the following document, answer the question: '{query}'. \
         Provide justification using {MARKER_VOCABULARY} markers.\n\n\
         Document content: {text}"
    ))
}

/// Exactly [`CHALLENGE_QUESTION_COUNT`] comprehension questions as a JSON
/// array of strings.
pub fn generate_challenge(text: &AddressableText) -> PromptRequest {
    PromptRequest {
        prompt: format!(
            "Generate {} distinct logic-based or comprehension-focused questions based on \
             the following document. Provide them as a JSON array: {}\n\n\
             Document content: {text}",
            count_word(CHALLENGE_QUESTION_COUNT),
            json_array_example(CHALLENGE_QUESTION_COUNT),
        ),
        output: OutputSchema::JsonArrayOfString,
    }
}

/// Grade one user answer against the document.
pub fn evaluate_answer(text: &AddressableText, question: &str, user_answer: &str) -> PromptRequest {
    PromptRequest::plain(format!(
        "Based on the document, evaluate if this answer: '{user_answer}' is correct for the \
         question: '{question}'. Give a verdict (Correct/Partially Correct/Incorrect) and \
         justify using {MARKER_VOCABULARY} markers.\n\n\
         Document content: {text}"
    ))
}

fn count_word(n: usize) -> String {
    match n {
        1 => "one".into(),
        2 => "two".into(),
        3 => "three".into(),
        4 => "four".into(),
        5 => "five".into(),
        n => n.to_string(),
    }
}

/// `["Q1", "Q2", "Q3"]`
fn json_array_example(n: usize) -> String {
    let items: Vec<String> = (1..=n).map(|i| format!("\"Q{i}\"")).collect();
    format!("[{}]", items.join(", "))
}
