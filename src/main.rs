use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use piazza_conversation_extractor::config::Config;
use piazza_conversation_extractor::export::{
    write_content_dump, write_post_metadata_jsonl, write_threads_jsonl,
};
use piazza_conversation_extractor::extract::PostExtractor;
use piazza_conversation_extractor::piazza::PiazzaClient;
use piazza_conversation_extractor::pipeline::{run_once, PipelineOptions};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting piazza-conversation-extractor");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(network_id = %config.network_id, mode = ?config.feed_mode, "Configuration loaded");

    let client = PiazzaClient::new(&config).context("Failed to initialize Piazza client")?;
    client
        .login(&config.user_email, &config.user_password)
        .await
        .context("Failed to log in to Piazza")?;

    let extractor = PostExtractor::from_config(&config).context("Invalid Piazza base URL")?;
    let options = PipelineOptions::from(&config);

    let report = run_once(&client, &extractor, &options).await?;

    for processed in &report.processed {
        info!(
            post_nr = ?processed.post.post_id,
            uid = ?processed.thread.uid,
            hash = %processed.thread.content_hash(),
            images = processed.post.image_urls.len(),
            "Conversation ready"
        );
        debug!(post_nr = ?processed.post.post_id, "\n{}", processed.thread.conversation_text);
    }

    if let Some(path) = &config.output_path {
        write_threads_jsonl(path, &report.processed).await?;
    }
    if let Some(path) = &config.content_dump_path {
        write_content_dump(path, &report.processed).await?;
    }
    if let Some(path) = &config.metadata_path {
        write_post_metadata_jsonl(path, &report.processed).await?;
    }

    info!(
        processed = report.processed.len(),
        skipped = report.skipped,
        "Done"
    );

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,piazza_conversation_extractor=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
