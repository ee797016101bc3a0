//! Model gateway: the single seam to the remote generation capability.
//!
//! Wraps exactly one provider call per request with a hard timeout. There
//! is no retry and no fallback provider: a failure is returned to the
//! orchestrator immediately.

use crate::prompt::PromptRequest;
use docent_core::error::ProviderError;
use docent_core::provider::{GenerationRequest, OutputSchema, Provider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Sends prompts to one provider/model pair.
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a gateway using the configured model, sampling and timeout.
    ///
    /// A `default_model` in the default provider's table takes precedence
    /// over the top-level one.
    pub fn from_config(provider: Arc<dyn Provider>, config: &docent_config::AppConfig) -> Self {
        let model = config
            .providers
            .get(&config.default_provider)
            .and_then(|p| p.default_model.clone())
            .unwrap_or_else(|| config.default_model.clone());

        Self::new(provider, model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether schema-constrained requests reach the provider as such.
    pub fn supports_structured_output(&self) -> bool {
        self.provider.supports_structured_output()
    }

    /// Generate text for one prompt.
    ///
    /// A structured output request is sent as plain text when the provider
    /// cannot enforce it; the prompt already describes the expected shape.
    /// Whitespace-only output counts as no result.
    pub async fn generate(&self, request: &PromptRequest) -> Result<String, ProviderError> {
        let output = if request.output.is_structured() && !self.supports_structured_output() {
            debug!(
                provider = %self.provider.name(),
                requested = ?request.output,
                "Provider lacks structured output, sending as plain text"
            );
            OutputSchema::PlainText
        } else {
            request.output
        };

        let generation = GenerationRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            output,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let started = Instant::now();
        let response = match tokio::time::timeout(self.timeout, self.provider.generate(generation))
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(provider = %self.provider.name(), error = %e, "Generation failed");
                return Err(e);
            }
            Err(_) => {
                warn!(
                    provider = %self.provider.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Generation timed out"
                );
                return Err(ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                )));
            }
        };

        if response.text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(
                "generated text is blank".into(),
            ));
        }

        debug!(
            provider = %self.provider.name(),
            model = %response.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            prompt_tokens = response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = response.usage.as_ref().map(|u| u.completion_tokens),
            "Generation complete"
        );

        Ok(response.text)
    }
}
