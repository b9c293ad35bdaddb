mod directive;
mod engine;
mod remind;
mod sync;

use clap::{Parser, Subcommand};
use engine::Engine;
use std::sync::Arc;
use taskflow_core::config;
use taskflow_core::task::{DocumentId, UserId};
use taskflow_core::traits::TaskStore;
use taskflow_store::{FeedNotifier, Store};

#[derive(Parser)]
#[command(
    name = "taskflow",
    version,
    about = "TaskFlow: directive-driven task records and due-date reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic reminder scheduler.
    Start,
    /// Synchronize one document's text from a file. Newly assigned task
    /// ids are written back into the file.
    Sync {
        /// Document id owning the directives (e.g. Main.WebHome).
        document: String,
        /// Path to the file holding the document text.
        file: String,
        /// Acting user, recorded as creator of new tasks.
        #[arg(short, long, default_value = "unknown")]
        user: String,
    },
    /// Run one reminder pass now and print the dispatch grouping.
    Remind,
    /// List a document's task records.
    Tasks {
        /// Document id to list.
        document: String,
    },
    /// Check configuration and store contents.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.taskflow.log_level)),
        )
        .init();

    match cli.command {
        Commands::Start => {
            if !cfg.scheduler.enabled {
                anyhow::bail!("scheduler is disabled in config");
            }
            let engine = Arc::new(build_engine(&cfg).await?);
            println!("TaskFlow scheduler running...");
            engine.scheduler_loop(cfg.scheduler.clone()).await;
        }
        Commands::Sync {
            document,
            file,
            user,
        } => {
            let text = std::fs::read_to_string(&file)?;
            let engine = build_engine(&cfg).await?;

            let outcome = engine
                .on_document_changed(&DocumentId(document.clone()), &text, &UserId(user))
                .await?;

            if outcome.skipped {
                println!("{document}: unchanged, nothing to do");
            } else {
                if outcome.content != text {
                    std::fs::write(&file, &outcome.content)?;
                    println!("{document}: wrote assigned ids back to {file}");
                }
                println!(
                    "{document}: {} created, {} updated, {} deleted",
                    outcome.created, outcome.updated, outcome.deleted
                );
            }
        }
        Commands::Remind => {
            let engine = build_engine(&cfg).await?;
            let now = chrono::Local::now().naive_local();
            let grouping = engine.reminder_pass(now).await;
            println!("{}", serde_json::to_string_pretty(&grouping)?);
        }
        Commands::Tasks { document } => {
            let store = Store::new(&cfg.store).await?;
            let records = store.records(&DocumentId(document.clone())).await?;

            if records.is_empty() {
                println!("No task records for {document}");
            } else {
                for record in records {
                    let due = record
                        .due_date
                        .map(|d| d.format(&cfg.sync.date_format).to_string())
                        .unwrap_or_else(|| "no due date".to_string());
                    let times = record
                        .reminder_intervals
                        .iter()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>()
                        .join(",");
                    let who = record
                        .responsible
                        .iter()
                        .map(|u| u.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    let done = if record.done { " [done]" } else { "" };
                    println!("[{}] {}{done}", record.id, record.content);
                    println!("  due {due} ({times}) for {who}");
                }
            }
        }
        Commands::Status => {
            println!("TaskFlow status\n");
            println!("Config: {}", cli.config);
            println!("Database: {}", cfg.store.db_path);
            println!("Date format: {}", cfg.sync.date_format);
            println!();

            let store = Store::new(&cfg.store).await?;
            println!("  documents:    {}", store.document_count().await?);
            println!("  task records: {}", store.record_count().await?);
            println!("  feed entries: {}", store.feed_count().await?);
        }
    }

    Ok(())
}

/// Build the engine over the configured store and the feed notifier.
async fn build_engine(cfg: &config::Config) -> anyhow::Result<Engine> {
    let store = Store::new(&cfg.store).await?;
    let notifier = FeedNotifier::new(store.pool().clone());
    Ok(Engine::new(
        Arc::new(store),
        Arc::new(notifier),
        cfg.sync.clone(),
    ))
}
