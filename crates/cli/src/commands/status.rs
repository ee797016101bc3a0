//! `docent status` — Show configuration status.

use docent_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("📚 Docent Status");
    println!("================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", config.default_model);
    println!("  Temperature:  {}", config.default_temperature);
    println!("  Timeout:      {}s", config.request_timeout_secs);
    println!("  Evaluations:  {} at a time", config.max_concurrent_evaluations);
    println!("  API key:      {}", if config.has_api_key() { "set" } else { "missing" });
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  Upload dir:   {}", config.gateway.upload_dir.display());
    println!("  Upload limit: {} bytes", config.gateway.max_upload_bytes);
    if config.gateway.allowed_origins.is_empty() {
        println!("  CORS:         any origin");
    } else {
        println!("  CORS:         {}", config.gateway.allowed_origins.join(", "));
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `docent onboard` first");
    }

    Ok(())
}
