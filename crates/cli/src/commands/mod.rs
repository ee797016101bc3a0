pub mod doctor;
pub mod document;
pub mod extract;
pub mod onboard;
pub mod serve;
pub mod status;

use docent_config::AppConfig;
use docent_pipeline::{DocumentTasks, ModelGateway};
use docent_store::InMemoryDocumentStore;
use std::path::Path;
use std::sync::Arc;

/// Load config and wire the default provider into a fresh task set.
pub(crate) fn build_tasks() -> Result<DocumentTasks, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    require_api_key(&config)?;

    let router = docent_providers::router::build_from_config(&config);
    let provider = router
        .default()
        .ok_or_else(|| format!("Provider '{}' is not available", config.default_provider))?;
    let gateway = ModelGateway::from_config(provider, &config);
    tracing::debug!(provider = %gateway.provider_name(), model = %gateway.model(), "Using model");

    Ok(
        DocumentTasks::new(Arc::new(InMemoryDocumentStore::new()), gateway)
            .with_evaluation_concurrency(config.max_concurrent_evaluations),
    )
}

/// Read a local file and return the name it is stored under.
///
/// The name is the final path component, matching what an HTTP upload of
/// the same file would use.
pub(crate) async fn read_document(
    path: &Path,
) -> Result<(String, Vec<u8>), Box<dyn std::error::Error>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Not a file path: {}", path.display()))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok((name, bytes))
}

/// Providers that run without a key.
pub(crate) fn needs_api_key(config: &AppConfig) -> bool {
    !matches!(
        config.default_provider.as_str(),
        "ollama" | "vllm" | "llamacpp" | "llama.cpp"
    )
}

/// Print setup instructions and fail when no key is configured.
pub(crate) fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() || !needs_api_key(config) {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    DOCENT_API_KEY   (generic)");
    eprintln!("    GEMINI_API_KEY   (Gemini, recommended)");
    eprintln!("    GOOGLE_API_KEY");
    eprintln!("    OPENAI_API_KEY   (with DOCENT_PROVIDER=openai)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
