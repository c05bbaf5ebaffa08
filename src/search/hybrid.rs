use std::time::Duration;

use super::{
    local::{local_search, LocalSearchOptions, DEFAULT_LOCAL_LIMIT},
    merge::{merge, MergeStrategy},
};
use crate::{
    ai::{AiSearchOptions, AiSearchOutcome, AiSearcher, AiSettings, DEFAULT_TIMEOUT_MS},
    bookmarks::{Bookmark, ScoredBookmark},
};

pub const DEFAULT_AI_LIMIT: usize = 20;
pub const DEFAULT_AI_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct HybridOptions {
    pub local_limit: usize,
    pub ai_limit: usize,
    pub merge_strategy: MergeStrategy,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            local_limit: DEFAULT_LOCAL_LIMIT,
            ai_limit: DEFAULT_AI_LIMIT,
            merge_strategy: MergeStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SmartOptions {
    pub prefer_ai: bool,
    /// Without `prefer_ai`/`use_hybrid`, AI only runs when local search
    /// found fewer results than this.
    pub ai_threshold: usize,
    pub use_hybrid: bool,
    pub hybrid: HybridOptions,
}

impl Default for SmartOptions {
    fn default() -> Self {
        Self {
            prefer_ai: false,
            ai_threshold: DEFAULT_AI_THRESHOLD,
            use_hybrid: true,
            hybrid: HybridOptions::default(),
        }
    }
}

/// Decides between local, AI and hybrid search. The local engine is always
/// available; AI failures never reach the caller.
pub struct Orchestrator {
    ai: AiSearcher,
    ai_timeout: Duration,
}

impl Orchestrator {
    pub fn new(ai: AiSearcher) -> Self {
        Self {
            ai,
            ai_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.ai_timeout = timeout;
        self
    }

    pub fn ai(&self) -> &AiSearcher {
        &self.ai
    }

    pub fn ai_timeout(&self) -> Duration {
        self.ai_timeout
    }

    fn ai_options(&self) -> AiSearchOptions {
        AiSearchOptions {
            fallback_to_local: true,
            use_cache: true,
            timeout: self.ai_timeout,
        }
    }

    /// Runs local and AI search together and merges them. When the AI has
    /// nothing usable the local results come back unchanged.
    pub async fn hybrid_search(
        &self,
        query: &str,
        records: &[Bookmark],
        settings: &AiSettings,
        opts: &HybridOptions,
    ) -> Vec<ScoredBookmark> {
        if query.trim().is_empty() {
            return vec![];
        }

        let local_opts = LocalSearchOptions {
            limit: opts.local_limit,
            ..Default::default()
        };
        let ai_opts = self.ai_options();

        let (local, ai) = tokio::join!(
            async { local_search(records, query, local_opts) },
            self.ai.semantic_search(query, records, settings, &ai_opts),
        );

        match ai.usable() {
            Some(ai) => {
                log::debug!(
                    "merging {} ai and {} local results ({})",
                    ai.len(),
                    local.len(),
                    opts.merge_strategy
                );
                merge(ai, local, opts.merge_strategy, opts.ai_limit)
            }
            None => local,
        }
    }

    pub async fn smart_search(
        &self,
        query: &str,
        records: &[Bookmark],
        settings: &AiSettings,
        opts: &SmartOptions,
    ) -> Vec<ScoredBookmark> {
        let local_opts = LocalSearchOptions::default();

        if !settings.is_configured() {
            return local_search(records, query, local_opts);
        }

        if opts.use_hybrid {
            return self.hybrid_search(query, records, settings, &opts.hybrid).await;
        }

        if opts.prefer_ai {
            if query.trim().is_empty() {
                return vec![];
            }
            return match self
                .ai
                .semantic_search(query, records, settings, &self.ai_options())
                .await
            {
                AiSearchOutcome::Found(results) => results,
                AiSearchOutcome::Deferred | AiSearchOutcome::Failed(_) => {
                    local_search(records, query, local_opts)
                }
            };
        }

        let local = local_search(records, query, local_opts);
        if query.trim().is_empty() || local.len() >= opts.ai_threshold {
            return local;
        }

        log::debug!(
            "local search found {} (< {}), asking ai",
            local.len(),
            opts.ai_threshold
        );
        self.ai
            .semantic_search(query, records, settings, &self.ai_options())
            .await
            .usable()
            .unwrap_or(local)
    }
}
