//! The document grounding pipeline for Docent.
//!
//! Extraction turns uploads into line-addressable text, the prompt builder
//! grounds every request on that text, the model gateway makes the single
//! outbound call, and the interpreter validates what comes back. The
//! orchestrators in [`orchestrator`] compose these per use case.

pub mod extract;
pub mod interpret;
pub mod model_gateway;
pub mod orchestrator;
pub mod prompt;

#[cfg(test)]
mod test_helpers;

pub use extract::extract;
pub use interpret::{EVALUATION_FALLBACK, InterpretError};
pub use model_gateway::ModelGateway;
pub use orchestrator::{
    DEFAULT_EVALUATION_CONCURRENCY, DocumentTasks, Task, TaskError, UploadOutcome,
    validate_upload_name,
};
pub use prompt::PromptRequest;
