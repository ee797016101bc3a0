//! `docent summarize | ask | challenge` — Run a use case against a local file.
//!
//! Each command ingests the file into a fresh in-memory store, exactly as an
//! HTTP upload would, then runs one operation.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn summarize(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = super::build_tasks()?;
    let (name, bytes) = super::read_document(path).await?;

    eprint!("  Summarizing {name}...");
    let outcome = tasks.upload(&name, bytes).await;
    eprint!("\r{}\r", " ".repeat(name.len() + 20));
    let outcome = outcome?;

    println!("📄 {} ({} lines)", outcome.document.name, outcome.document.lines);
    println!();
    println!("{}", outcome.summary.trim_end());

    Ok(())
}

pub async fn ask(path: &Path, question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = super::build_tasks()?;
    let (name, bytes) = super::read_document(path).await?;

    tasks.ingest(&name, bytes).await?;
    let answer = tasks.answer(&name, question).await?;

    for line in answer.trim_end().lines() {
        println!("  Assistant > {line}");
    }

    Ok(())
}

pub async fn challenge(path: &Path, quiz: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = super::build_tasks()?;
    let (name, bytes) = super::read_document(path).await?;

    tasks.ingest(&name, bytes).await?;
    let challenge = tasks.generate_challenge(&name).await?;

    println!("🧠 Challenge: {name}");
    println!();
    for (i, question) in challenge.questions().iter().enumerate() {
        println!("  {}. {question}", i + 1);
    }

    if !quiz {
        return Ok(());
    }

    println!();
    println!("  Answer each question and press Enter. Leave blank to skip.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut answers = HashMap::new();
    for (i, _) in challenge.questions().iter().enumerate() {
        print!("  {}. You > ", i + 1);
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if !line.is_empty() {
            answers.insert(i.to_string(), line.to_string());
        }
    }

    if answers.is_empty() {
        println!("\n  No answers given.");
        return Ok(());
    }

    eprint!("  Grading...");
    let feedback = tasks
        .evaluate_challenge(&name, challenge.questions(), &answers)
        .await;
    eprint!("\r           \r");
    let feedback = feedback?;

    println!();
    for (i, text) in feedback.iter() {
        println!("  {}. {}", i + 1, text.trim_end());
        println!();
    }

    Ok(())
}
