use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use homedir::my_home;
use tracing_subscriber::EnvFilter;

mod ai;
mod bookmarks;
mod cli;
mod config;
mod search;
mod search_query;
mod storage;
#[cfg(test)]
mod tests;

use ai::{AiSearchOutcome, AiSearcher, OpenAiTransport};
use bookmarks::{BackendCsv, Bookmark, RecordStore};
use cli::HistoryArgs;
use config::Config;
use search::{Orchestrator, SearchCache, SearchHistory, SearchOptions, SearchService};
use storage::{BackendLocal, FileKeyValueStore, KeyValueStore, StorageManager};

const BOOKMARKS_FILE: &str = "bookmarks.csv";

pub fn parse_tags(tags: String) -> Vec<String> {
    tags.split(',')
        .flat_map(|value| value.split(&[' ', ' ']).filter(|value| !value.is_empty()))
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
}

fn base_path() -> anyhow::Result<String> {
    if let Ok(base_path) = std::env::var("BB_BASE_PATH") {
        return Ok(base_path);
    }

    let home = my_home()?.context("Home directory path is empty")?;
    Ok(format!("{}/.local/share/bb", home.to_string_lossy()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(args))
}

async fn run(args: cli::Args) -> anyhow::Result<()> {
    let base_path = base_path()?;
    let config = Config::load_with(&base_path)?;
    let db = BackendCsv::load(&format!("{base_path}/{BOOKMARKS_FILE}"))?;

    let storage: Arc<dyn StorageManager> = Arc::new(BackendLocal::new(&base_path)?);
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(storage));
    let history = SearchHistory::load(kv).await?;

    let ai = AiSearcher::new(Arc::new(OpenAiTransport::new()), Arc::new(SearchCache::new()));
    let orchestrator = Orchestrator::new(ai).with_timeout(config.ai_timeout());
    let mut service =
        SearchService::new(orchestrator, history).with_smart_options(config.smart_options());

    let settings = config.ai_settings();

    match args.command {
        cli::Command::Search {
            query,
            ai,
            no_history,
            format,
        } => {
            let opts = SearchOptions {
                history: !no_history,
                suggestions: true,
                use_ai: ai,
            };
            if ai && !settings.is_configured() {
                log::warn!("ai is not configured, using local search only");
            }

            let response = service.search(&query, &db.all(), &settings, opts).await;
            println!("{}", search::export(&response, format)?);
        }

        cli::Command::Ai { query, strict } => {
            let records = db.all();
            let results = match service.ai_search(&query, &records, &settings, !strict).await {
                AiSearchOutcome::Found(results) => results,
                AiSearchOutcome::Deferred => {
                    log::info!("ai search unavailable, using local search");
                    search::advanced_search(&query, &records)
                }
                AiSearchOutcome::Failed(err) => {
                    return Err(anyhow::Error::new(err).context("ai search failed"));
                }
            };
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        cli::Command::Get { id } => {
            let Some(bmark) = db.get(&id) else {
                bail!("bookmark {id} not found");
            };
            println!("{}", serde_json::to_string_pretty(&bmark)?);
        }

        cli::Command::Quick { query } => {
            let results = search::quick_search(&query, &db.all());
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        cli::Command::Advanced { query } => {
            let results = search::advanced_search(&query, &db.all());
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        cli::Command::Suggest { input, ai } => {
            let suggestions = if ai {
                service.ai_suggestions(&input, &settings).await
            } else {
                service.suggestions(&input, &db.all())
            };
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }

        cli::Command::History { action } => match action {
            HistoryArgs::List {} => {
                for query in service.history().entries() {
                    println!("{query}");
                }
            }
            HistoryArgs::Remove { query } => {
                service.history_mut().remove(&query).await?;
            }
            HistoryArgs::Clear {} => {
                service.clear_history().await?;
                println!("search history cleared");
            }
        },

        cli::Command::Add {
            url,
            title,
            description,
            tags,
        } => {
            let bmark = db.upsert(Bookmark {
                id: rusty_ulid::generate_ulid_string(),
                title,
                url,
                description,
                tags: tags.map(parse_tags).unwrap_or_default(),
                status: None,
            })?;
            println!("{}", serde_json::to_string_pretty(&bmark)?);
        }
    }

    Ok(())
}
