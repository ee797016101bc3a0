//! `docent doctor` — Diagnose setup problems.

use docent_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Docent Doctor — Setup Diagnostics");
    println!("===================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — defaults in use (run `docent onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else if super::needs_api_key(&config) {
        println!("  ❌ No API key — set GEMINI_API_KEY or add api_key to config.toml");
        issues += 1;
    } else {
        println!("  ✅ {} runs without an API key", config.default_provider);
    }

    let router = docent_providers::router::build_from_config(&config);
    match router.default() {
        Some(provider) => {
            println!("  ✅ Provider '{}' ready", provider.name());
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable"),
                Ok(false) => {
                    println!("  ❌ Provider rejected the health check");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        None => {
            println!("  ❌ Provider '{}' not available", config.default_provider);
            issues += 1;
        }
    }

    let upload_dir = &config.gateway.upload_dir;
    if upload_dir.is_dir() {
        println!("  ✅ Upload directory exists: {}", upload_dir.display());
    } else {
        println!("  ⚠️  No upload directory at {} — it is created on `docent serve`", upload_dir.display());
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
