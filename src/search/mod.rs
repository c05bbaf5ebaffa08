//! Bookmark search: local keyword engine, AI orchestration, caching,
//! history and suggestions.
//!
//! # Architecture
//!
//! - `local`: scores an in-memory snapshot with the query syntax
//! - `cache`: TTL + capacity bounded memo for AI rankings
//! - `merge`: union / intersect / ai-first result combination
//! - `hybrid`: runs local and AI search and picks a policy
//! - `history`: persisted recent queries
//! - `suggest`: completions from history, tags and known sites
//! - `export`: JSON, CSV and HTML reports of a response

mod cache;
mod export;
mod history;
mod hybrid;
mod local;
mod merge;
mod suggest;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use cache::SearchCache;
pub use export::{export, ExportFormat};
pub use history::SearchHistory;
pub use hybrid::{
    HybridOptions, Orchestrator, SmartOptions, DEFAULT_AI_LIMIT, DEFAULT_AI_THRESHOLD,
};
pub use local::{local_search, LocalSearchOptions, DEFAULT_LOCAL_LIMIT};
pub use merge::MergeStrategy;
pub use suggest::{suggest, Suggestion, SuggestionKind};

use crate::{
    ai::{AiSearchOptions, AiSearchOutcome, AiSettings},
    bookmarks::{Bookmark, ScoredBookmark},
    search_query,
    storage::StorageError,
};

const QUICK_LIMIT: usize = 20;
const QUICK_MIN_SCORE: i64 = 1;
const ADVANCED_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total: usize,
    pub matched: usize,
    pub query: String,
    pub has_advanced: bool,
    /// Unix milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredBookmark>,
    pub stats: SearchStats,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Record the query in the search history.
    pub history: bool,
    /// Attach suggestions derived from history and tags.
    pub suggestions: bool,
    /// Let the smart search policy involve the AI when configured.
    pub use_ai: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            history: true,
            suggestions: true,
            use_ai: true,
        }
    }
}

/// Local-only search tuned for live typing feedback.
pub fn quick_search(query: &str, records: &[Bookmark]) -> Vec<ScoredBookmark> {
    local_search(
        records,
        query,
        LocalSearchOptions {
            limit: QUICK_LIMIT,
            min_score: QUICK_MIN_SCORE,
        },
    )
}

/// Local search with a larger limit when the query uses advanced syntax.
pub fn advanced_search(query: &str, records: &[Bookmark]) -> Vec<ScoredBookmark> {
    let opts = if search_query::is_advanced(query) {
        LocalSearchOptions {
            limit: ADVANCED_LIMIT,
            ..Default::default()
        }
    } else {
        LocalSearchOptions::default()
    };
    local_search(records, query, opts)
}

/// Every distinct tag in first-seen order.
pub fn tag_vocabulary(records: &[Bookmark]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|bm| bm.tags.iter())
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .cloned()
        .collect()
}

/// One per process: owns the orchestrator (and through it the cache) and
/// the search history.
pub struct SearchService {
    orchestrator: Orchestrator,
    history: SearchHistory,
    smart: SmartOptions,
}

impl SearchService {
    pub fn new(orchestrator: Orchestrator, history: SearchHistory) -> Self {
        Self {
            orchestrator,
            history,
            smart: SmartOptions::default(),
        }
    }

    pub fn with_smart_options(mut self, smart: SmartOptions) -> Self {
        self.smart = smart;
        self
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory {
        &mut self.history
    }

    /// Forgets past queries together with the AI rankings cached for them.
    pub async fn clear_history(&mut self) -> Result<(), StorageError> {
        self.orchestrator.ai().clear_cache();
        self.history.clear().await
    }

    /// AI ranking alone. With `fallback` unset, configuration, transport and
    /// timeout errors come back as `Failed` instead of `Deferred`.
    pub async fn ai_search(
        &self,
        query: &str,
        records: &[Bookmark],
        settings: &AiSettings,
        fallback: bool,
    ) -> AiSearchOutcome {
        let opts = AiSearchOptions {
            fallback_to_local: fallback,
            use_cache: true,
            timeout: self.orchestrator.ai_timeout(),
        };
        self.orchestrator
            .ai()
            .semantic_search(query, records, settings, &opts)
            .await
    }

    /// Full search returning results, stats and suggestions. A blank query
    /// returns an empty response and leaves the history alone.
    #[tracing::instrument(level = "debug", skip(self, records, settings, opts))]
    pub async fn search(
        &mut self,
        query: &str,
        records: &[Bookmark],
        settings: &AiSettings,
        opts: SearchOptions,
    ) -> SearchResponse {
        let query = query.trim();
        if query.is_empty() {
            return SearchResponse {
                stats: SearchStats {
                    timestamp: chrono::Utc::now().timestamp_millis(),
                    ..Default::default()
                },
                ..Default::default()
            };
        }

        let results = if opts.use_ai {
            self.orchestrator
                .smart_search(query, records, settings, &self.smart)
                .await
        } else {
            local_search(records, query, LocalSearchOptions::default())
        };

        if opts.history {
            if let Err(err) = self.history.add(query).await {
                log::warn!("couldnt save search history: {err}");
            }
        }

        let suggestions = if opts.suggestions {
            suggest(query, self.history.entries(), &tag_vocabulary(records))
        } else {
            vec![]
        };

        SearchResponse {
            stats: SearchStats {
                total: records.len(),
                matched: results.len(),
                query: query.to_string(),
                has_advanced: search_query::is_advanced(query),
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
            results,
            suggestions,
        }
    }

    pub fn suggestions(&self, input: &str, records: &[Bookmark]) -> Vec<Suggestion> {
        suggest(input, self.history.entries(), &tag_vocabulary(records))
    }

    pub async fn ai_suggestions(&self, input: &str, settings: &AiSettings) -> Vec<Suggestion> {
        self.orchestrator
            .ai()
            .suggestions(input, settings, self.orchestrator.ai_timeout())
            .await
            .into_iter()
            .map(|text| Suggestion {
                kind: SuggestionKind::Ai,
                text,
            })
            .collect()
    }
}
