use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use moodlens_core::advice::AdviceClient;
use moodlens_core::auth::AuthClient;
use moodlens_core::feed::{FeedEvent, FeedSubscriber};
use moodlens_core::firestore::FirestoreClient;
use moodlens_core::models::{DiaryRecord, RangeMode};
use moodlens_core::{tracing_setup, CoreConfig};

#[derive(Parser)]
#[command(name = "moodlens-cli")]
#[command(about = "CLI interface for the diary admin service")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Email for commands that need a signed-in session
    #[arg(long, env = "MOODLENS_EMAIL")]
    email: Option<String>,

    /// Password for commands that need a signed-in session
    #[arg(long, env = "MOODLENS_PASSWORD")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one diary document by id
    Fetch {
        /// Document id
        id: String,
    },

    /// Send text to the remote advice endpoint and print the analysis
    Advice {
        /// Diary text to analyze
        text: String,
    },

    /// Subscribe to the diary feed and print each snapshot as a JSON line
    Watch {
        /// Range mode: today, last-3-days, last-7-days, last-30-days, all
        #[arg(long, default_value = "all")]
        range: RangeMode,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_setup::init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CoreConfig::from_file(path)
            .ok_or_else(|| anyhow::anyhow!("could not read config file {}", path.display()))?,
        None => CoreConfig::load(),
    };

    match &cli.command {
        Commands::Fetch { id } => fetch(&cli, &config, id).await,
        Commands::Advice { text } => advice(&cli, &config, text).await,
        Commands::Watch { range } => watch(&cli, &config, *range).await,
    }
}

/// Sign in with the CLI credentials and return a store client carrying the
/// session token.
async fn signed_in_store(cli: &Cli, config: &CoreConfig) -> Result<FirestoreClient> {
    let email = cli
        .email
        .as_deref()
        .context("--email (or MOODLENS_EMAIL) is required for this command")?;
    let password = cli
        .password
        .as_deref()
        .context("--password (or MOODLENS_PASSWORD) is required for this command")?;

    let session = AuthClient::new(config).sign_in(email, password).await?;
    Ok(FirestoreClient::new(config).with_token(&session.id_token))
}

async fn fetch(cli: &Cli, config: &CoreConfig, id: &str) -> Result<()> {
    let store = signed_in_store(cli, config).await?;
    let document = store
        .get_document(moodlens_core::feed::DIARIES_COLLECTION, id)
        .await?
        .with_context(|| format!("no diary with id {id}"))?;
    let record = DiaryRecord::from_document(&document);
    print_json(cli, &record_json(&record))
}

async fn advice(cli: &Cli, config: &CoreConfig, text: &str) -> Result<()> {
    let response = AdviceClient::new(config).get_advice(text).await?;
    print_json(
        cli,
        &serde_json::json!({ "emotion": response.emotion, "advice": response.advice }),
    )
}

async fn watch(cli: &Cli, config: &CoreConfig, range: RangeMode) -> Result<()> {
    let store = signed_in_store(cli, config).await?;
    let (feed_tx, mut feed_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut subscriber = FeedSubscriber::new(Arc::new(store), config.poll_interval(), feed_tx);
    subscriber.subscribe(range);

    while let Some(event) = feed_rx.recv().await {
        if !subscriber.accepts(&event) {
            continue;
        }
        match event {
            FeedEvent::Snapshot { records, .. } => {
                let line = serde_json::json!({
                    "count": records.len(),
                    "records": records.iter().map(record_json).collect::<Vec<_>>(),
                });
                // Snapshots stream until interrupted; one JSON line each.
                println!("{line}");
            }
            FeedEvent::Unavailable { message, .. } => {
                eprintln!("feed unavailable: {message}");
                break;
            }
        }
    }
    Ok(())
}

fn record_json(record: &DiaryRecord) -> serde_json::Value {
    serde_json::json!({
        "id": record.id,
        "content": record.content,
        "keywords": record.keywords,
        "suggestion": record.suggestion,
        "emotionalReflection": record.emotional_reflection,
        "mood": record.mood,
        "createdDate": record.created_date.map(|d| d.to_rfc3339()),
        "images": record.images,
    })
}

fn print_json(cli: &Cli, value: &serde_json::Value) -> Result<()> {
    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}
