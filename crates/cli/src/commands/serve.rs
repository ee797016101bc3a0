//! `docent serve` — Start the HTTP API server.

use docent_config::AppConfig;

pub async fn run(
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(host) = host_override {
        config.gateway.host = host;
    }
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    std::fs::create_dir_all(&config.gateway.upload_dir).map_err(|e| {
        format!(
            "Failed to create upload directory {}: {e}",
            config.gateway.upload_dir.display()
        )
    })?;

    println!("📚 Docent API");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.default_provider, config.default_model);
    println!("   Uploads:   {}", config.gateway.upload_dir.display());

    docent_gateway::start(config).await?;

    Ok(())
}
