use std::{collections::HashSet, sync::Arc, time::Duration};

use serde_json::json;

use super::{response, AiError, AiSettings, CompletionTransport, DEFAULT_TIMEOUT_MS};
use crate::{
    bookmarks::{Bookmark, ScoredBookmark, SearchType},
    search::SearchCache,
};

/// Collections larger than this are narrowed with a substring match before
/// anything is sent to the completion service.
pub const PREFILTER_THRESHOLD: usize = 100;

/// Highest score an AI ranking hands out; rank `n` (0-based) gets `100 - n`.
const AI_TOP_SCORE: i64 = 100;

#[derive(Debug, Clone)]
pub struct AiSearchOptions {
    pub fallback_to_local: bool,
    pub use_cache: bool,
    pub timeout: Duration,
}

impl Default for AiSearchOptions {
    fn default() -> Self {
        Self {
            fallback_to_local: true,
            use_cache: true,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Result of an AI search. `Found(vec![])` means the model ran and found
/// nothing; `Deferred` means the caller should use local results instead.
#[derive(Debug)]
pub enum AiSearchOutcome {
    Found(Vec<ScoredBookmark>),
    Deferred,
    Failed(AiError),
}

impl AiSearchOutcome {
    /// Results worth merging: a non-empty `Found`.
    pub fn usable(self) -> Option<Vec<ScoredBookmark>> {
        match self {
            AiSearchOutcome::Found(results) if !results.is_empty() => Some(results),
            _ => None,
        }
    }
}

pub struct AiSearcher {
    transport: Arc<dyn CompletionTransport>,
    cache: Arc<SearchCache>,
}

impl AiSearcher {
    pub fn new(transport: Arc<dyn CompletionTransport>, cache: Arc<SearchCache>) -> Self {
        Self { transport, cache }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &Arc<SearchCache> {
        &self.cache
    }

    /// Forgets every memoized ranking.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub(super) fn transport(&self) -> &dyn CompletionTransport {
        self.transport.as_ref()
    }

    /// Ranks `records` by meaning with the configured model.
    ///
    /// Transport errors, timeouts and missing configuration become
    /// `Deferred` when `fallback_to_local` is set and `Failed` otherwise.
    /// Unparseable model output is logged and reported as `Found(vec![])`.
    pub async fn semantic_search(
        &self,
        query: &str,
        records: &[Bookmark],
        settings: &AiSettings,
        opts: &AiSearchOptions,
    ) -> AiSearchOutcome {
        let Some(endpoint) = settings.endpoint() else {
            return fail(opts, AiError::NotConfigured);
        };

        let ids: Vec<&str> = records.iter().map(|b| b.id.as_str()).collect();
        if opts.use_cache {
            if let Some(cached) = self.cache.get(query, &ids) {
                log::debug!("ai search cache hit for {query:?}");
                return AiSearchOutcome::Found(cached);
            }
        }

        let candidates = prefilter(query, records);
        if candidates.is_empty() {
            return AiSearchOutcome::Found(vec![]);
        }

        let prompt = build_prompt(query, &candidates);
        let call = self.transport.complete(endpoint, &prompt);

        let content = match tokio::time::timeout(opts.timeout, call).await {
            Ok(Ok(content)) => content,
            Ok(Err(err)) => return fail(opts, err),
            Err(_) => return fail(opts, AiError::Timeout(opts.timeout.as_millis() as u64)),
        };

        let ranked = match response::parse_ranked_ids(&content) {
            Ok(ranked) => ranked,
            Err(err) => {
                log::warn!("ignoring AI ranking: {err}");
                return AiSearchOutcome::Found(vec![]);
            }
        };

        let results = rank(&ranked, &candidates);
        log::info!(
            "ai search {query:?}: {} of {} returned ids are known",
            results.len(),
            ranked.len()
        );

        if opts.use_cache {
            self.cache.set(query, &ids, results.clone());
        }

        AiSearchOutcome::Found(results)
    }
}

fn fail(opts: &AiSearchOptions, err: AiError) -> AiSearchOutcome {
    if opts.fallback_to_local {
        match err {
            AiError::NotConfigured => log::debug!("ai search skipped: {err}"),
            _ => log::warn!("ai search failed, falling back to local: {err}"),
        }
        AiSearchOutcome::Deferred
    } else {
        AiSearchOutcome::Failed(err)
    }
}

fn prefilter<'a>(query: &str, records: &'a [Bookmark]) -> Vec<&'a Bookmark> {
    if records.len() <= PREFILTER_THRESHOLD {
        return records.iter().collect();
    }

    let needle = query.trim().to_lowercase();
    let candidates: Vec<&Bookmark> = records
        .iter()
        .filter(|b| {
            b.title.to_lowercase().contains(&needle)
                || b.url.to_lowercase().contains(&needle)
                || b.description().to_lowercase().contains(&needle)
                || b.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect();

    log::debug!(
        "prefiltered {} bookmarks down to {}",
        records.len(),
        candidates.len()
    );
    candidates
}

fn build_prompt(query: &str, candidates: &[&Bookmark]) -> String {
    let listing = candidates
        .iter()
        .map(|b| {
            json!({
                "id": b.id,
                "title": b.title,
                "url": b.url,
                "description": b.description(),
                "tags": b.tags,
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Find the bookmarks that best match the search query by meaning, not only by keywords.\n\
         Query: {query}\n\n\
         Bookmarks (one JSON object per line):\n{listing}\n\n\
         Answer with a JSON array of the matching bookmark ids, most relevant first. \
         Leave out bookmarks that are not relevant. Answer [] if none match."
    )
}

/// Keeps the model's order, drops ids that are unknown or repeated.
fn rank(ranked: &[String], candidates: &[&Bookmark]) -> Vec<ScoredBookmark> {
    let mut seen = HashSet::new();

    ranked
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| candidates.iter().find(|b| b.id == **id))
        .enumerate()
        .map(|(idx, bookmark)| ScoredBookmark {
            bookmark: (*bookmark).clone(),
            score: AI_TOP_SCORE - idx as i64,
            matches: None,
            search_type: Some(SearchType::Ai),
            ai_rank: Some(idx + 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str, title: &str) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{id}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_drops_unknown_and_duplicate_ids() {
        let a = bookmark("a", "A");
        let b = bookmark("b", "B");
        let candidates = vec![&a, &b];
        let ranked = vec!["b".to_string(), "ghost".to_string(), "b".to_string(), "a".to_string()];

        let results = rank(&ranked, &candidates);
        let ids: Vec<&str> = results.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(results[0].score, 100);
        assert_eq!(results[1].score, 99);
        assert_eq!(results[1].ai_rank, Some(2));
        assert_eq!(results[0].search_type, Some(SearchType::Ai));
    }

    #[test]
    fn test_prefilter_only_above_threshold() {
        let small: Vec<Bookmark> = (0..10).map(|i| bookmark(&i.to_string(), "x")).collect();
        assert_eq!(prefilter("rust", &small).len(), 10);

        let mut large: Vec<Bookmark> = (0..150).map(|i| bookmark(&i.to_string(), "other")).collect();
        large[3].title = "Learning Rust".to_string();
        large[7].tags = vec!["RUST".to_string()];
        let kept: Vec<&str> = prefilter("Rust", &large).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(kept, vec!["3", "7"]);
    }

    #[test]
    fn test_prompt_lists_every_candidate() {
        let a = bookmark("a1", "Alpha");
        let b = bookmark("b2", "Beta");
        let prompt = build_prompt("greek letters", &[&a, &b]);
        assert!(prompt.contains("greek letters"));
        assert!(prompt.contains("\"id\":\"a1\""));
        assert!(prompt.contains("\"id\":\"b2\""));
    }
}
