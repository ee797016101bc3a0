//! # Docent Core
//!
//! Domain types, traits, and error definitions for the Docent document
//! assistant. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external seams (the remote generation capability and the document
//! store) are defined as traits here. Implementations live in their
//! respective crates. This enables:
//! - Swapping the model backend or the store via configuration
//! - Easy testing with scripted providers
//! - Clean dependency graph (all crates depend inward on core)

pub mod challenge;
pub mod document;
pub mod error;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use challenge::{CHALLENGE_QUESTION_COUNT, ChallengeSet, EvaluationFeedback, Verdict};
pub use document::{
    AddressableText, AddressableTextWriter, DocumentInfo, DocumentRecord, MARKER_VOCABULARY,
    Marker, SourceKind,
};
pub use error::{ChallengeSetError, ExtractionError, ProviderError, StoreError};
pub use provider::{GenerationRequest, GenerationResponse, OutputSchema, Provider, Usage};
pub use store::DocumentStore;
