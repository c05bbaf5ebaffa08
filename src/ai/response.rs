use serde_json::Value;

use super::AiError;

/// Finds the JSON payload in a completion. Models often wrap it in a
/// markdown fence or surround it with prose.
pub fn extract_json(content: &str) -> Result<Value, AiError> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(fenced) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str(fenced) {
            return Ok(value);
        }
    }

    for (open, close) in [('[', ']'), ('{', '}')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(AiError::MalformedResponse(truncate(trimmed, 200)))
}

fn fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```")?;
    let rest = &content[start + 3..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Reads a ranked id list: either a bare array or an object with an
/// `ids` / `results` array. Numeric ids are accepted as strings.
pub fn parse_ranked_ids(content: &str) -> Result<Vec<String>, AiError> {
    let value = extract_json(content)?;

    let list = match &value {
        Value::Array(list) => list,
        Value::Object(map) => map
            .get("ids")
            .or_else(|| map.get("results"))
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("expected an id list".into()))?,
        _ => return Err(AiError::MalformedResponse("expected an id list".into())),
    };

    Ok(list
        .iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            Value::Object(obj) => obj.get("id").and_then(|id| match id {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            }),
            _ => None,
        })
        .collect())
}

/// Reads a list of suggestion strings.
pub fn parse_string_list(content: &str) -> Result<Vec<String>, AiError> {
    match extract_json(content)? {
        Value::Array(list) => Ok(list
            .into_iter()
            .filter_map(|item| item.as_str().map(str::trim).map(str::to_string))
            .filter(|s| !s.is_empty())
            .collect()),
        Value::Object(mut map) => match map.remove("suggestions") {
            Some(Value::Array(list)) => Ok(list
                .into_iter()
                .filter_map(|item| item.as_str().map(str::trim).map(str::to_string))
                .filter(|s| !s.is_empty())
                .collect()),
            _ => Err(AiError::MalformedResponse("expected a string list".into())),
        },
        _ => Err(AiError::MalformedResponse("expected a string list".into())),
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
