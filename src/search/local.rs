use crate::{
    bookmarks::{Bookmark, ScoredBookmark},
    search_query::{self, ParsedQuery},
};

pub const DEFAULT_LOCAL_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct LocalSearchOptions {
    pub limit: usize,
    pub min_score: i64,
}

impl Default for LocalSearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOCAL_LIMIT,
            min_score: 0,
        }
    }
}

/// Score given to bookmarks the query rejects, below any `min_score`.
const REJECTED: i64 = -1;

/// Keyword search over an in-memory snapshot. Results are sorted by score
/// (stable, so ties keep input order) and carry score and highlight spans.
pub fn local_search(
    records: &[Bookmark],
    query: &str,
    opts: LocalSearchOptions,
) -> Vec<ScoredBookmark> {
    if query.trim().is_empty() {
        return vec![];
    }

    let parsed = search_query::parse(query);
    search_parsed(records, &parsed, opts)
}

pub fn search_parsed(
    records: &[Bookmark],
    parsed: &ParsedQuery,
    opts: LocalSearchOptions,
) -> Vec<ScoredBookmark> {
    let mut scored: Vec<(&Bookmark, i64)> = records
        .iter()
        .map(|bm| (bm, search_query::evaluate(parsed, bm).unwrap_or(REJECTED)))
        .filter(|(_, score)| *score >= opts.min_score)
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(opts.limit);

    let highlighter = search_query::Highlighter::new(parsed);
    scored
        .into_iter()
        .map(|(bm, score)| {
            let mut hit = ScoredBookmark::new(bm.clone(), score);
            let matches = highlighter.matches(bm);
            hit.matches = (!matches.is_empty()).then_some(matches);
            hit
        })
        .collect()
}
