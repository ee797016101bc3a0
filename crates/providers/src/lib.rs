//! Language-model provider implementations for Docent.
//!
//! All providers implement the `docent_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::ProviderRouter;

/// Shared HTTP client construction for every provider.
pub(crate) fn http_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Map a transport failure to the provider error taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> docent_core::ProviderError {
    if e.is_timeout() {
        docent_core::ProviderError::Timeout(e.to_string())
    } else {
        docent_core::ProviderError::Network(e.to_string())
    }
}
