mod eval;
mod highlight;
mod lexer;

pub use eval::{evaluate, Highlighter};
pub use highlight::{escape_html, highlight};

use lexer::Token;

/// Filter buckets extracted from a raw query string.
///
/// `include` holds both quoted phrases and bare keywords; an entry that
/// contains whitespace is a phrase and must appear verbatim, every other
/// entry is a keyword of which at least one must appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub tags: Vec<String>,
    pub sites: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Set when the query used `tag:`, `site:`, `排除:` or a quoted phrase.
    pub advanced: bool,
}

impl ParsedQuery {
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.include
            .iter()
            .map(String::as_str)
            .filter(|term| is_phrase(term))
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.include
            .iter()
            .map(String::as_str)
            .filter(|term| !is_phrase(term))
    }

    /// No bucket carries a filter, so every record matches with score 0.
    pub fn is_vacuous(&self) -> bool {
        self.tags.is_empty()
            && self.sites.is_empty()
            && self.include.is_empty()
            && self.exclude.is_empty()
    }
}

fn is_phrase(term: &str) -> bool {
    term.chars().any(char::is_whitespace)
}

/// Parses a raw query. Never fails: text that is not a recognised filter
/// becomes plain keywords.
pub fn parse(input: &str) -> ParsedQuery {
    let (tokens, residual) = lexer::tokenize(input);

    let mut query = ParsedQuery {
        advanced: !tokens.is_empty(),
        ..Default::default()
    };

    for token in tokens {
        match token {
            Token::Tag(tag) => query.tags.push(tag),
            Token::Site(site) => query.sites.push(site),
            Token::Exclude(term) => query.exclude.push(term),
            Token::Phrase(phrase) => query.include.push(phrase),
        }
    }

    query.include.extend(
        residual
            .split_whitespace()
            .map(|keyword| keyword.to_lowercase()),
    );

    query
}

/// Whether `input` uses any advanced syntax.
pub fn is_advanced(input: &str) -> bool {
    parse(input).advanced
}
