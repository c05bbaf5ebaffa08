use regex::{Regex, RegexBuilder};

use super::ParsedQuery;
use crate::bookmarks::{Bookmark, FieldMatches, MatchSpan};

const TITLE_HIT: i64 = 10;
const TITLE_EXACT_BONUS: i64 = 20;
const URL_HIT: i64 = 5;
const DESCRIPTION_HIT: i64 = 3;
const TAG_HIT: i64 = 7;
const SITE_HIT: i64 = 5;
const TAG_FILTER_HIT: i64 = 8;

/// Lower-cased views of a bookmark's searchable fields.
struct Haystack {
    title: String,
    url: String,
    description: String,
    tags: Vec<String>,
    all: String,
}

impl Haystack {
    fn new(bm: &Bookmark) -> Self {
        let title = bm.title.to_lowercase();
        let url = bm.url.to_lowercase();
        let description = bm.description().to_lowercase();
        let tags: Vec<String> = bm.tags.iter().map(|t| t.to_lowercase()).collect();
        let all = format!("{} {} {} {}", title, url, description, tags.join(" "));

        Self {
            title,
            url,
            description,
            tags,
            all,
        }
    }
}

/// Returns `None` when the bookmark is rejected, otherwise its relevance
/// score. Checks run in a fixed order and the first failing one rejects.
pub fn evaluate(query: &ParsedQuery, bm: &Bookmark) -> Option<i64> {
    if query.is_vacuous() {
        return Some(0);
    }

    let hay = Haystack::new(bm);

    if query.exclude.iter().any(|term| hay.all.contains(term.as_str())) {
        return None;
    }

    if !query.sites.is_empty() && !query.sites.iter().any(|site| hay.url.contains(site.as_str())) {
        return None;
    }

    // every tag filter must hit some tag, unlike keywords where one is enough
    if !query
        .tags
        .iter()
        .all(|filter| hay.tags.iter().any(|tag| tag.contains(filter.as_str())))
    {
        return None;
    }

    if !query.phrases().all(|phrase| hay.all.contains(phrase)) {
        return None;
    }

    let mut keywords = query.keywords().peekable();
    if keywords.peek().is_some() && !keywords.any(|keyword| hay.all.contains(keyword)) {
        return None;
    }

    Some(score(query, &hay))
}

fn score(query: &ParsedQuery, hay: &Haystack) -> i64 {
    let mut score = 0;

    for term in &query.include {
        let term = term.as_str();
        if hay.title.contains(term) {
            score += TITLE_HIT;
            if hay.title == term {
                score += TITLE_EXACT_BONUS;
            }
        }
        if hay.url.contains(term) {
            score += URL_HIT;
        }
        if hay.description.contains(term) {
            score += DESCRIPTION_HIT;
        }
        if hay.tags.iter().any(|tag| tag.contains(term)) {
            score += TAG_HIT;
        }
    }

    for site in &query.sites {
        if hay.url.contains(site.as_str()) {
            score += SITE_HIT;
        }
    }

    // counted per matching tag, so one filter can score several times
    for filter in &query.tags {
        let hits = hay
            .tags
            .iter()
            .filter(|tag| tag.contains(filter.as_str()))
            .count() as i64;
        score += hits * TAG_FILTER_HIT;
    }

    score
}

/// Highlight spans for every include term in title, url and description.
/// Patterns are compiled once per query; spans keep the field's casing.
pub struct Highlighter {
    patterns: Vec<Regex>,
}

impl Highlighter {
    pub fn new(query: &ParsedQuery) -> Self {
        let patterns = query
            .include
            .iter()
            .filter_map(|term| {
                RegexBuilder::new(&regex::escape(term))
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| log::warn!("skipping highlight for {term:?}: {err}"))
                    .ok()
            })
            .collect();

        Self { patterns }
    }

    pub fn matches(&self, bm: &Bookmark) -> FieldMatches {
        let mut matches = FieldMatches::default();

        for regex in &self.patterns {
            let find_all = |text: &str| {
                regex
                    .find_iter(text)
                    .map(|m| MatchSpan {
                        start: m.start(),
                        end: m.end(),
                        text: m.as_str().to_string(),
                    })
                    .collect::<Vec<_>>()
            };

            matches.title.extend(find_all(&bm.title));
            matches.url.extend(find_all(&bm.url));
            matches.description.extend(find_all(bm.description()));
        }

        matches
    }
}
