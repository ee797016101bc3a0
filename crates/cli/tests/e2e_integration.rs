//! End-to-end integration tests for Docent.
//!
//! These tests exercise the full path from raw upload bytes to model output:
//! extraction, storage, prompt grounding, the model gateway and output
//! interpretation, both directly through `DocumentTasks` and over HTTP.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use docent_core::document::{Marker, SourceKind};
use docent_core::error::ProviderError;
use docent_core::provider::{GenerationRequest, GenerationResponse, OutputSchema, Provider, Usage};
use docent_gateway::{GatewayState, build_router};
use docent_pipeline::{DocumentTasks, EVALUATION_FALLBACK, ModelGateway, TaskError};
use docent_store::InMemoryDocumentStore;
use http_body_util::BodyExt;
use tower::ServiceExt;

// ── Mock Provider ────────────────────────────────────────────────────────

type Responder = dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync;

/// A mock provider that answers each prompt through a script and records
/// every request it sees.
struct ScriptedProvider {
    respond: Box<Responder>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    fn new(respond: impl Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn text(reply: &'static str) -> Self {
        Self::new(move |_| Ok(reply.to_string()))
    }

    fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let reply = (self.respond)(&request.prompt);
        self.requests.lock().unwrap().push(request);
        reply.map(|text| GenerationResponse {
            text,
            model: "e2e-model".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }

    fn supports_structured_output(&self) -> bool {
        true
    }
}

fn tasks_with(provider: Arc<ScriptedProvider>) -> DocumentTasks {
    DocumentTasks::new(
        Arc::new(InMemoryDocumentStore::new()),
        ModelGateway::new(provider, "e2e-model"),
    )
}

/// Routes prompts the way the four use cases phrase them.
fn by_task(prompt: &str) -> Result<String, ProviderError> {
    if prompt.starts_with("Summarize") {
        Ok("A short greeting document.".into())
    } else if prompt.contains("answer the question") {
        Ok("It says Hello [Line 1].".into())
    } else if prompt.starts_with("Generate") {
        Ok(r#"["What is greeted?", "Which word comes last?", "How many lines are blank?"]"#.into())
    } else if prompt.contains("evaluate if this answer: 'World'") {
        Err(ProviderError::RateLimited {
            retry_after_secs: 1,
        })
    } else {
        Ok("Correct. The document says Hello [Line 1].".into())
    }
}

// ── Direct pipeline ──────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_text_upload_is_grounded_in_every_prompt() {
    let provider = Arc::new(ScriptedProvider::new(by_task));
    let tasks = tasks_with(provider.clone());

    let outcome = tasks
        .upload("notes.txt", b"Hello\n\nWorld".to_vec())
        .await
        .unwrap();
    assert_eq!(outcome.summary, "A short greeting document.");
    assert_eq!(outcome.document.kind, SourceKind::Text);
    assert_eq!(outcome.document.lines, 2);

    let stored = tasks.store().get("notes.txt").await.unwrap().unwrap();
    assert_eq!(stored.text.as_str(), "[Line 1] Hello\n\n[Line 3] World\n");

    let answer = tasks.answer("notes.txt", "What does it say?").await.unwrap();
    assert_eq!(answer, "It says Hello [Line 1].");
    assert_eq!(
        stored.text.resolve(&Marker::Line { line: 1 }),
        Some("Hello")
    );

    // Summary and answer prompts both embed the annotated document
    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    for prompt in &prompts {
        assert!(prompt.contains("[Line 1] Hello\n\n[Line 3] World"));
    }
    assert!(prompts[1].contains("'What does it say?'"));
}

#[tokio::test]
async fn e2e_missing_document_is_not_found() {
    let provider = Arc::new(ScriptedProvider::new(by_task));
    let tasks = tasks_with(provider.clone());

    let err = tasks.answer("missing.pdf", "Anything?").await.unwrap_err();
    assert!(matches!(err, TaskError::DocumentNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "Document content not found. Please upload the document again."
    );

    let err = tasks.generate_challenge("missing.pdf").await.unwrap_err();
    assert_eq!(err.to_string(), "Document content not found.");

    let answers = HashMap::from([("0".to_string(), "x".to_string())]);
    let err = tasks
        .evaluate_challenge("missing.pdf", &["Q?".to_string()], &answers)
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn e2e_challenge_round_trip_with_partial_failure() {
    let provider = Arc::new(ScriptedProvider::new(by_task));
    let tasks = tasks_with(provider.clone());
    tasks
        .ingest("notes.txt", b"Hello\n\nWorld".to_vec())
        .await
        .unwrap();

    let challenge = tasks.generate_challenge("notes.txt").await.unwrap();
    assert_eq!(challenge.questions().len(), 3);
    assert_eq!(challenge.questions()[0], "What is greeted?");
    assert_eq!(
        provider.requests.lock().unwrap()[0].output,
        OutputSchema::JsonArrayOfString
    );

    // Question 2 is left unanswered; question 1's grading call fails
    let answers = HashMap::from([
        ("0".to_string(), "Hello".to_string()),
        ("1".to_string(), "World".to_string()),
    ]);
    let feedback = tasks
        .evaluate_challenge("notes.txt", challenge.questions(), &answers)
        .await
        .unwrap();

    assert_eq!(feedback.len(), 3);
    assert_eq!(
        feedback.get(0),
        Some("Correct. The document says Hello [Line 1].")
    );
    assert_eq!(feedback.get(1), Some(EVALUATION_FALLBACK));
    assert!(feedback.get(2).is_some());
    assert!(
        provider
            .prompts()
            .iter()
            .any(|p| p.contains("evaluate if this answer: ''"))
    );
}

#[tokio::test]
async fn e2e_invalid_challenge_output_is_rejected() {
    for raw in [
        "Here are some questions: 1. What? 2. Why?",
        r#"["Only one", "Only two"]"#,
        r#"["A", "B", "C", "D"]"#,
    ] {
        let provider = Arc::new(ScriptedProvider::new(move |prompt| {
            if prompt.starts_with("Generate") {
                Ok(raw.to_string())
            } else {
                Ok("summary".to_string())
            }
        }));
        let tasks = tasks_with(provider);
        tasks.ingest("notes.txt", b"Hello".to_vec()).await.unwrap();

        let err = tasks.generate_challenge("notes.txt").await.unwrap_err();
        assert!(matches!(err, TaskError::Decode(_)), "accepted: {raw}");
        assert_eq!(err.to_string(), "Invalid JSON from assistant");
    }
}

#[tokio::test]
async fn e2e_reupload_replaces_document() {
    let provider = Arc::new(ScriptedProvider::text("ok"));
    let tasks = tasks_with(provider.clone());

    tasks.upload("a.txt", b"first version".to_vec()).await.unwrap();
    tasks.upload("a.txt", b"second version".to_vec()).await.unwrap();
    tasks.answer("a.txt", "Which version?").await.unwrap();

    let last = provider.prompts().pop().unwrap();
    assert!(last.contains("[Line 1] second version"));
    assert!(!last.contains("first version"));
    assert_eq!(tasks.documents().await.unwrap().len(), 1);
}

#[tokio::test]
async fn e2e_unreadable_upload_stores_nothing() {
    let provider = Arc::new(ScriptedProvider::text("ok"));
    let tasks = tasks_with(provider.clone());

    let err = tasks
        .upload("broken.pdf", b"definitely not a pdf".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::Extraction(_)));

    let err = tasks.upload("blank.txt", b"  \n\n\t\n".to_vec()).await.unwrap_err();
    assert!(matches!(err, TaskError::Extraction(_)));

    assert!(tasks.documents().await.unwrap().is_empty());
    assert_eq!(provider.calls(), 0);
}

// ── HTTP ─────────────────────────────────────────────────────────────────

struct TestServer {
    router: Router,
    _upload_dir: tempfile::TempDir,
}

fn server(provider: Arc<ScriptedProvider>) -> TestServer {
    let upload_dir = tempfile::tempdir().unwrap();
    let mut config = docent_config::GatewayConfig::default();
    config.upload_dir = upload_dir.path().to_path_buf();

    TestServer {
        router: build_router(GatewayState::new(tasks_with(provider), config)),
        _upload_dir: upload_dir,
    }
}

fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "e2e-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
         filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(server: &TestServer, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = server.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn e2e_http_upload_ask_challenge_evaluate() {
    let provider = Arc::new(ScriptedProvider::new(by_task));
    let server = server(provider.clone());

    let (status, body) = call(&server, upload_request("notes.txt", b"Hello\n\nWorld")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File uploaded and summarized successfully");
    assert_eq!(body["summary"], "A short greeting document.");

    let (status, body) = call(
        &server,
        post_json(
            "/ask",
            serde_json::json!({"query": "What does it say?", "documentName": "notes.txt"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "It says Hello [Line 1].");

    let (status, body) = call(
        &server,
        post_json("/challenge", serde_json::json!({"documentName": "notes.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let questions = body["questions"].as_array().unwrap().clone();
    assert_eq!(questions.len(), 3);

    let (status, body) = call(
        &server,
        post_json(
            "/evaluate_challenge",
            serde_json::json!({
                "documentName": "notes.txt",
                "questions": questions,
                "userAnswers": {"0": "Hello", "1": "World", "2": "One"}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let feedback = body["feedback"].as_object().unwrap();
    assert_eq!(feedback.len(), 3);
    assert_eq!(feedback["1"], EVALUATION_FALLBACK);
    assert!(feedback["0"].as_str().unwrap().starts_with("Correct"));

    let (status, body) = call(
        &server,
        Request::builder()
            .uri("/documents")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents"][0]["name"], "notes.txt");
    assert_eq!(body["documents"][0]["kind"], "txt");
}

#[tokio::test]
async fn e2e_http_errors() {
    let provider = Arc::new(ScriptedProvider::new(by_task));
    let server = server(provider.clone());

    let (status, body) = call(
        &server,
        post_json(
            "/ask",
            serde_json::json!({"query": "Anything?", "documentName": "missing.pdf"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "Document content not found. Please upload the document again."
    );

    let (status, body) = call(&server, upload_request("slides.pptx", b"binary")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File type not allowed");

    let (status, body) = call(
        &server,
        post_json("/evaluate_challenge", serde_json::json!({"documentName": "notes.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing data");

    assert_eq!(provider.calls(), 0);
}
