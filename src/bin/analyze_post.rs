use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};

#[derive(Parser)]
#[command(
    name = "lexbrief-post",
    about = "Helper for posting documents and advice queries to a running LexBrief server"
)]
struct Cli {
    /// Base URL of the LexBrief server.
    #[arg(long, default_value = "http://127.0.0.1:4300")]
    server: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a local file as a data URI and run the analysis pipeline on it.
    Analyze {
        #[arg(long)]
        file: PathBuf,
        /// Override the media type guessed from the file extension.
        #[arg(long)]
        media_type: Option<String>,
    },
    /// Ask a legal question and print the advice checklist.
    Advice {
        #[arg(long)]
        query: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let http = reqwest::Client::new();
    match cli.command {
        Command::Analyze { file, media_type } => {
            post_analyze(&http, &cli.server, &file, media_type).await
        }
        Command::Advice { query } => post_advice(&http, &cli.server, &query).await,
    }
}

async fn post_analyze(
    http: &reqwest::Client,
    server: &str,
    file: &Path,
    media_type: Option<String>,
) -> Result<()> {
    let media_type = match media_type {
        Some(explicit) => explicit,
        None => guess_media_type(file)?,
    };
    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read document at {}", file.display()))?;
    let document = format!("data:{media_type};base64,{}", BASE64.encode(&bytes));

    let response = http
        .post(format!("{}/analyze", server.trim_end_matches('/')))
        .json(&json!({ "document": document }))
        .send()
        .await
        .context("failed to reach the LexBrief server")?;

    let status = response.status();
    let body = response.text().await.context("failed to read response")?;
    if !status.is_success() {
        bail!("server returned {status}: {body}");
    }

    let value: Value = serde_json::from_str(&body).context("failed to parse response JSON")?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn post_advice(http: &reqwest::Client, server: &str, query: &str) -> Result<()> {
    let response = http
        .post(format!("{}/advice", server.trim_end_matches('/')))
        .json(&json!({ "query": query }))
        .send()
        .await
        .context("failed to reach the LexBrief server")?;

    let status = response.status();
    let body = response.text().await.context("failed to read response")?;
    if !status.is_success() {
        bail!("server returned {status}: {body}");
    }

    let value: Value = serde_json::from_str(&body).context("failed to parse response JSON")?;
    match value.get("adviceChecklist").and_then(Value::as_str) {
        Some(checklist) => println!("{checklist}"),
        None => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

fn guess_media_type(file: &Path) -> Result<String> {
    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let media_type = match extension.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        other => bail!("cannot guess media type for extension '{other}'; pass --media-type"),
    };
    Ok(media_type.to_string())
}
