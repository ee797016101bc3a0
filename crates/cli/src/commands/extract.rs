//! `docent extract` — Print the line-addressable text of a file.
//!
//! Runs locally; no model is called.

use docent_pipeline::validate_upload_name;
use std::path::Path;

pub async fn run(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (name, bytes) = super::read_document(path).await?;
    let kind = validate_upload_name(&name)?;

    let text = docent_pipeline::extract(bytes, kind)
        .await
        .map_err(|e| format!("{name}: {e}"))?;

    if json {
        let out = serde_json::json!({
            "name": name,
            "kind": kind,
            "lines": text.marked_lines(),
            "text": text.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print!("{}", text.as_str());
    eprintln!("\n  {} marked line(s) from {name}", text.marked_lines());

    Ok(())
}
