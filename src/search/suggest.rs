use serde::{Deserialize, Serialize};

const MAX_HISTORY_SUGGESTIONS: usize = 5;
const MAX_TAG_SUGGESTIONS: usize = 3;
const MAX_PREFIX_SUGGESTIONS: usize = 5;

const TAG_PREFIXES: [&str; 2] = ["tag", "标签"];
const SITE_PREFIXES: [&str; 2] = ["site", "站点"];

const WELL_KNOWN_SITES: [&str; 8] = [
    "github.com",
    "stackoverflow.com",
    "developer.mozilla.org",
    "youtube.com",
    "medium.com",
    "zhihu.com",
    "juejin.cn",
    "bilibili.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    History,
    Tag,
    Site,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub text: String,
}

impl Suggestion {
    fn new(kind: SuggestionKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Suggestions for the text being typed.
///
/// `prefix:rest` completes tag names or well-known domains for the
/// recognised prefixes and yields nothing for any other prefix. Plain
/// input offers matching history entries followed by matching tags.
pub fn suggest(input: &str, history: &[String], tags: &[String]) -> Vec<Suggestion> {
    let input = input.trim().to_lowercase();

    if let Some((prefix, rest)) = input.split_once(':') {
        let rest = rest.trim();

        if TAG_PREFIXES.contains(&prefix) {
            return tags
                .iter()
                .filter(|tag| tag.to_lowercase().contains(rest))
                .take(MAX_PREFIX_SUGGESTIONS)
                .map(|tag| Suggestion::new(SuggestionKind::Tag, format!("{prefix}:{tag}")))
                .collect();
        }

        if SITE_PREFIXES.contains(&prefix) {
            return WELL_KNOWN_SITES
                .iter()
                .filter(|site| site.contains(rest))
                .take(MAX_PREFIX_SUGGESTIONS)
                .map(|site| Suggestion::new(SuggestionKind::Site, format!("{prefix}:{site}")))
                .collect();
        }

        return vec![];
    }

    let from_history = history
        .iter()
        .filter(|entry| entry.to_lowercase().starts_with(&input))
        .take(MAX_HISTORY_SUGGESTIONS)
        .map(|entry| Suggestion::new(SuggestionKind::History, entry.as_str()));

    let from_tags = tags
        .iter()
        .filter(|tag| tag.to_lowercase().contains(&input))
        .take(MAX_TAG_SUGGESTIONS)
        .map(|tag| Suggestion::new(SuggestionKind::Tag, tag.as_str()));

    from_history.chain(from_tags).collect()
}
