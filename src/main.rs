use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use exile_trade::batch::{BatchObserver, BatchOrchestrator, BatchReport};
use exile_trade::cli::{Cli, Commands};
use exile_trade::client::TradeClient;
use exile_trade::item::{EquipmentSnapshot, ModKind};
use exile_trade::query::{QuerySynthesizer, SearchMode};
use exile_trade::resolve::ModResolver;
use exile_trade::settings::SearchSettings;
use exile_trade::stats::{StatsIndex, load_dataset};

/// Progress display for interactive batch runs.
struct ConsoleObserver;

impl BatchObserver for ConsoleObserver {
    fn on_progress(&self, current: usize, total: usize, name: &str) {
        println!("[{current}/{total}] {name}");
    }

    fn on_rate_limit_wait(&self, remaining: Duration) {
        print!("\r  rate limited, retrying in {}s ", remaining.as_secs());
        let _ = std::io::stdout().flush();
    }

    fn on_search_opened(&self, url: &str) {
        println!("  -> {url}");
    }

    fn on_complete(&self, report: &BatchReport) {
        if report.cancelled {
            println!(
                "Cancelled: {} searches opened, {} failed",
                report.success_count, report.error_count
            );
        } else {
            println!(
                "Done: {} searches opened, {} failed",
                report.success_count, report.error_count
            );
        }
    }
}

async fn load_settings(path: Option<&Path>) -> anyhow::Result<SearchSettings> {
    match path {
        Some(path) => SearchSettings::load(path).await,
        None => Ok(SearchSettings::default()),
    }
}

async fn load_snapshot(path: &Path) -> anyhow::Result<EquipmentSnapshot> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading equipment snapshot at {}", path.display()))?;
    serde_json::from_str(&body)
        .with_context(|| format!("parsing equipment snapshot at {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    exile_trade::tracing::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            mod_text,
            dataset,
            kind,
            equipment,
        } => {
            let kind: ModKind = kind.parse().map_err(anyhow::Error::msg)?;
            let index = StatsIndex::build(load_dataset(&dataset).await?);
            let resolver = ModResolver::new(&index);

            match resolver.resolve(&mod_text, kind, equipment) {
                Some(resolved) => {
                    println!("ids: {}", resolved.canonical_ids.join(", "));
                    if let Some(value) = resolved.numeric_value {
                        println!("value: {value}");
                    }
                    println!("local variant: {}", resolved.used_local_variant);
                }
                None => {
                    println!("no matcher resolves '{mod_text}' as a {kind} modifier");
                }
            }
        }

        Commands::Query {
            dataset,
            snapshot,
            mode,
            item,
            settings,
        } => {
            let mode: SearchMode = mode.parse().map_err(anyhow::Error::msg)?;
            let settings = load_settings(settings.as_deref()).await?;
            let index = StatsIndex::build(load_dataset(&dataset).await?);
            let snapshot = load_snapshot(&snapshot).await?;

            let (_, target) = snapshot
                .iter()
                .nth(item)
                .with_context(|| format!("snapshot has no item at index {item}"))?;

            let synthesizer = QuerySynthesizer::new(&index, &settings);
            let query = synthesizer.synthesize(target, mode).with_context(|| {
                format!("item '{}' has no searchable anchor", target.display_name())
            })?;

            println!("{}", serde_json::to_string_pretty(&query)?);
        }

        Commands::Batch {
            dataset,
            snapshot,
            settings,
            league,
        } => {
            let mut settings = load_settings(settings.as_deref()).await?;
            if let Some(league) = league {
                settings.league = league;
            }
            let index = StatsIndex::build(load_dataset(&dataset).await?);
            let snapshot = load_snapshot(&snapshot).await?;

            let synthesizer = QuerySynthesizer::new(&index, &settings);
            let endpoint = Arc::new(TradeClient::new()?);
            let mut orchestrator = BatchOrchestrator::new(
                endpoint,
                Arc::new(ConsoleObserver),
                settings.league.clone(),
            );

            let handle = orchestrator.cancel_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Cancellation requested, stopping after current search");
                    handle.cancel();
                }
            });

            orchestrator.run(&synthesizer, &snapshot).await;
        }
    }

    Ok(())
}
