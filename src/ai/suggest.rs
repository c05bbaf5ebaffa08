use std::time::Duration;

use super::{response, AiSearcher, AiSettings};

/// Inputs shorter than this never reach the model.
const MIN_INPUT_CHARS: usize = 2;
const MAX_SUGGESTIONS: usize = 5;

impl AiSearcher {
    /// Asks the model for related search queries. Missing configuration,
    /// short input and every kind of failure yield an empty list.
    pub async fn suggestions(
        &self,
        input: &str,
        settings: &AiSettings,
        timeout: Duration,
    ) -> Vec<String> {
        let input = input.trim();
        let Some(endpoint) = settings.endpoint() else {
            return vec![];
        };
        if input.chars().count() < MIN_INPUT_CHARS {
            return vec![];
        }

        let prompt = format!(
            "Suggest up to {MAX_SUGGESTIONS} search queries a user might mean when searching \
             their bookmarks for: {input}\n\
             Answer with a JSON array of strings."
        );

        let call = self.transport().complete(endpoint, &prompt);
        let content = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(content)) => content,
            Ok(Err(err)) => {
                log::warn!("ai suggestions failed: {err}");
                return vec![];
            }
            Err(_) => {
                log::warn!("ai suggestions timed out after {}ms", timeout.as_millis());
                return vec![];
            }
        };

        match response::parse_string_list(&content) {
            Ok(mut list) => {
                list.truncate(MAX_SUGGESTIONS);
                list
            }
            Err(err) => {
                log::warn!("ignoring ai suggestions: {err}");
                vec![]
            }
        }
    }
}
