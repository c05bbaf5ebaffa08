use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Tag(String),
    Site(String),
    Exclude(String),
    Phrase(String),
}

// Phrases are scanned first so that filter markers inside quotes stay
// literal text.
static PHRASE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("Failed to compile phrase regex"));
static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tag:(\S+)").expect("Failed to compile tag regex"));
static SITE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"site:(\S+)").expect("Failed to compile site regex"));
static EXCLUDE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"排除:(\S+)").expect("Failed to compile exclude regex"));

/// Extracts every filter token from `input` and returns them together with
/// the residual text (filters replaced by spaces). All tokens are
/// lower-cased.
pub fn tokenize(input: &str) -> (Vec<Token>, String) {
    let mut tokens = Vec::new();
    let mut residual = input.to_string();

    scan(&PHRASE_REGEX, Token::Phrase, &mut residual, &mut tokens);
    scan(&TAG_REGEX, Token::Tag, &mut residual, &mut tokens);
    scan(&SITE_REGEX, Token::Site, &mut residual, &mut tokens);
    scan(&EXCLUDE_REGEX, Token::Exclude, &mut residual, &mut tokens);

    (tokens, residual)
}

fn scan(
    regex: &Regex,
    make_token: fn(String) -> Token,
    residual: &mut String,
    tokens: &mut Vec<Token>,
) {
    for caps in regex.captures_iter(residual.as_str()) {
        let value = caps[1].trim().to_lowercase();
        if !value.is_empty() {
            tokens.push(make_token(value));
        }
    }
    *residual = regex.replace_all(residual.as_str(), " ").into_owned();
}
