use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use darts_engine::engine::config::{load_config, load_default_config};
use darts_engine::engine::host::{handle_request, parse_request, MatchHost};
use darts_engine::games::VariantRegistry;

#[derive(Parser)]
#[command(
    name = "darts-engine",
    about = "Darts scoring engine speaking line-delimited JSON on stdin/stdout"
)]
struct Cli {
    /// Path to darts_engine.toml (default: auto-discover)
    #[arg(long, env = "DARTS_ENGINE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries protocol responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => {
            load_config(path).map_err(|e| format!("Failed to load config: {}", e))?
        }
        None => load_default_config(),
    };

    let registry = VariantRegistry::with_defaults(&config);
    tracing::info!(
        variants = ?registry.list_variant_ids(),
        "registered variants"
    );

    let (host, task) = MatchHost::spawn(registry, &config.host);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match parse_request(&line) {
            Ok(request) => handle_request(&host, request).await,
            Err(response) => response,
        };
        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    drop(host);
    task.await?;
    tracing::info!("input closed, shutting down");
    Ok(())
}
