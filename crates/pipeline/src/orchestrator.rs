//! Task orchestrators.
//!
//! Each operation is a single pass: validate inputs, look up the document,
//! build the prompt, call the model gateway, interpret the output. Nothing
//! is retried.

use crate::extract;
use crate::interpret::{self, EVALUATION_FALLBACK, InterpretError};
use crate::model_gateway::ModelGateway;
use crate::prompt;
use docent_core::challenge::{ChallengeSet, EvaluationFeedback};
use docent_core::document::{AddressableText, DocumentInfo, DocumentRecord, SourceKind};
use docent_core::error::{ExtractionError, ProviderError, StoreError};
use docent_core::store::DocumentStore;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The operation a failure belongs to; selects the caller-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Summarize,
    Answer,
    Challenge,
    Evaluate,
}

impl Task {
    fn generation_failure_message(&self) -> &'static str {
        match self {
            Self::Summarize => "Failed to generate summary",
            Self::Answer => "Failed to get an answer from the assistant",
            Self::Challenge => "Failed to generate challenge questions",
            Self::Evaluate => "Failed to evaluate answer",
        }
    }

    fn not_found_message(&self) -> &'static str {
        match self {
            Self::Answer => "Document content not found. Please upload the document again.",
            _ => "Document content not found.",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Summarize => "summarize",
            Self::Answer => "answer",
            Self::Challenge => "challenge",
            Self::Evaluate => "evaluate",
        })
    }
}

/// Why an orchestrated operation produced no result.
///
/// `Display` is the message shown to the caller; the wrapped source keeps
/// the technical detail for logs.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("File type not allowed")]
    UnsupportedFileType { filename: String },

    #[error("{}", .task.not_found_message())]
    DocumentNotFound { name: String, task: Task },

    #[error("Failed to extract text from document")]
    Extraction(#[from] ExtractionError),

    #[error("{}", .task.generation_failure_message())]
    Generation {
        task: Task,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid JSON from assistant")]
    Decode(#[from] InterpretError),

    #[error("Document store unavailable")]
    Store(#[from] StoreError),
}

impl TaskError {
    /// Whether the caller, not the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::UnsupportedFileType { .. }
                | Self::DocumentNotFound { .. }
        )
    }

    fn missing(message: &str) -> Self {
        Self::InvalidInput(message.to_string())
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub document: DocumentInfo,
    pub summary: String,
}

/// Resolve the kind of an uploaded file from its name.
///
/// An empty name is a missing file; anything but `.pdf`/`.txt` (any case)
/// is rejected.
pub fn validate_upload_name(filename: &str) -> Result<SourceKind, TaskError> {
    if filename.is_empty() {
        return Err(TaskError::missing("No selected file"));
    }
    SourceKind::from_filename(filename).ok_or_else(|| TaskError::UnsupportedFileType {
        filename: filename.to_string(),
    })
}

/// Answers of one challenge graded at the same time, unless configured.
pub const DEFAULT_EVALUATION_CONCURRENCY: usize = 4;

/// The four document use cases over an injected store and model gateway.
#[derive(Clone)]
pub struct DocumentTasks {
    store: Arc<dyn DocumentStore>,
    gateway: ModelGateway,
    evaluation_concurrency: usize,
}

impl DocumentTasks {
    pub fn new(store: Arc<dyn DocumentStore>, gateway: ModelGateway) -> Self {
        Self {
            store,
            gateway,
            evaluation_concurrency: DEFAULT_EVALUATION_CONCURRENCY,
        }
    }

    /// Cap the model calls one evaluation keeps in flight (at least 1).
    pub fn with_evaluation_concurrency(mut self, limit: usize) -> Self {
        self.evaluation_concurrency = limit.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    /// Extract `bytes` and store the result under `filename`.
    ///
    /// Nothing is stored when extraction fails. A re-upload under the same
    /// name replaces the previous text.
    pub async fn ingest(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Arc<DocumentRecord>, TaskError> {
        let kind = validate_upload_name(filename)?;
        let size = bytes.len();

        let text = extract::extract(bytes, kind).await.map_err(|e| {
            warn!(document = %filename, error = %e, "Extraction failed");
            TaskError::Extraction(e)
        })?;

        let stored = Arc::new(DocumentRecord::new(filename, kind, text));
        let replaced = self.store.put(Arc::clone(&stored)).await?;

        info!(
            document = %filename,
            kind = %kind,
            bytes = size,
            lines = stored.text.marked_lines(),
            replaced = replaced.is_some(),
            "Document ingested"
        );
        Ok(stored)
    }

    /// Ingest a file and summarize it.
    ///
    /// The document stays stored when only the summary fails.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadOutcome, TaskError> {
        let record = self.ingest(filename, bytes).await?;
        let summary = self.summarize_text(&record.text).await?;
        Ok(UploadOutcome {
            document: DocumentInfo::from(record.as_ref()),
            summary,
        })
    }

    /// Summarize a stored document.
    pub async fn summarize(&self, document_name: &str) -> Result<String, TaskError> {
        if document_name.is_empty() {
            return Err(TaskError::missing("Missing document name"));
        }
        let record = self.lookup(document_name, Task::Summarize).await?;
        self.summarize_text(&record.text).await
    }

    async fn summarize_text(&self, text: &AddressableText) -> Result<String, TaskError> {
        let request = prompt::summarize(text);
        self.gateway
            .generate(&request)
            .await
            .map_err(|source| TaskError::Generation {
                task: Task::Summarize,
                source,
            })
    }

    /// Answer a free-form question from a stored document.
    pub async fn answer(&self, document_name: &str, query: &str) -> Result<String, TaskError> {
        if query.is_empty() || document_name.is_empty() {
            return Err(TaskError::missing("Missing query or document name"));
        }
        let record = self.lookup(document_name, Task::Answer).await?;

        info!(document = %document_name, query_chars = query.len(), "Answering question");
        let request = prompt::answer(&record.text, query);
        let answer =
            self.gateway
                .generate(&request)
                .await
                .map_err(|source| TaskError::Generation {
                    task: Task::Answer,
                    source,
                })?;

        log_citations(Task::Answer, document_name, &answer, &record.text);
        Ok(answer)
    }

    /// Generate a three-question comprehension challenge.
    pub async fn generate_challenge(&self, document_name: &str) -> Result<ChallengeSet, TaskError> {
        if document_name.is_empty() {
            return Err(TaskError::missing("Missing document name"));
        }
        let record = self.lookup(document_name, Task::Challenge).await?;

        let request = prompt::generate_challenge(&record.text);
        let raw =
            self.gateway
                .generate(&request)
                .await
                .map_err(|source| TaskError::Generation {
                    task: Task::Challenge,
                    source,
                })?;

        let challenge = interpret::parse_challenge(&raw).map_err(|e| {
            warn!(document = %document_name, error = %e, raw = %raw, "Challenge output rejected");
            TaskError::Decode(e)
        })?;

        info!(document = %document_name, "Challenge generated");
        Ok(challenge)
    }

    /// Grade each answer independently.
    ///
    /// The answer for question `i` is `answers[i.to_string()]`, or empty
    /// when absent. Every question gets an entry under its own index; an
    /// item whose generation fails gets [`EVALUATION_FALLBACK`]. At most
    /// `evaluation_concurrency` model calls run at once.
    pub async fn evaluate_challenge(
        &self,
        document_name: &str,
        questions: &[String],
        answers: &HashMap<String, String>,
    ) -> Result<EvaluationFeedback, TaskError> {
        if document_name.is_empty() || questions.is_empty() || answers.is_empty() {
            return Err(TaskError::missing("Missing data"));
        }
        let record = self.lookup(document_name, Task::Evaluate).await?;

        info!(
            document = %document_name,
            questions = questions.len(),
            concurrency = self.evaluation_concurrency,
            "Evaluating challenge answers"
        );

        let items = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let user_answer = answers
                    .get(&index.to_string())
                    .map(String::as_str)
                    .unwrap_or("");
                let text = &record.text;
                async move {
                    let request = prompt::evaluate_answer(text, question, user_answer);
                    let feedback = match self.gateway.generate(&request).await {
                        Ok(evaluation) => {
                            match interpret::parse_verdict(&evaluation) {
                                Some(verdict) => debug!(index, verdict = %verdict, "Answer graded"),
                                None => debug!(index, "Evaluation states no verdict"),
                            }
                            log_citations(Task::Evaluate, document_name, &evaluation, text);
                            evaluation
                        }
                        Err(e) => {
                            warn!(index, error = %e, "Evaluation failed, using fallback");
                            EVALUATION_FALLBACK.to_string()
                        }
                    };
                    (index, feedback)
                }
            })
            .collect::<Vec<_>>();

        let graded: Vec<(usize, String)> = stream::iter(items)
            .buffered(self.evaluation_concurrency)
            .collect()
            .await;

        let mut feedback = EvaluationFeedback::new();
        for (index, text) in graded {
            feedback.insert(index, text);
        }
        Ok(feedback)
    }

    /// Listing of every stored document, sorted by name.
    pub async fn documents(&self) -> Result<Vec<DocumentInfo>, TaskError> {
        Ok(self.store.list().await?)
    }

    async fn lookup(&self, name: &str, task: Task) -> Result<Arc<DocumentRecord>, TaskError> {
        self.store.get(name).await?.ok_or_else(|| {
            debug!(document = %name, task = %task, "Document not found");
            TaskError::DocumentNotFound {
                name: name.to_string(),
                task,
            }
        })
    }
}

fn log_citations(task: Task, document: &str, output: &str, text: &AddressableText) {
    let report = interpret::check_citations(output, text);
    if report.cited.is_empty() {
        debug!(task = %task, document = %document, "Output cites no source lines");
    } else if !report.unresolved.is_empty() {
        let unresolved: Vec<String> = report.unresolved.iter().map(|m| m.to_string()).collect();
        warn!(
            task = %task,
            document = %document,
            unresolved = ?unresolved,
            "Output cites lines that do not exist"
        );
    }
}
