//! Pulls a JSON document out of free-form model output.
//!
//! Models asked for JSON sometimes wrap it in a fenced code block or in a
//! sentence of commentary. Three strategies are tried in order: the whole
//! text, each fenced block, then the span from the first `{` to the last `}`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// None of the strategies produced valid JSON.
    NoJsonObject,
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::NoJsonObject => write!(f, "could not parse JSON from model response"),
        }
    }
}

impl std::error::Error for ExtractError {}

const FENCE: &str = "```";

pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    if let Ok(v) = serde_json::from_str(text) {
        return Ok(v);
    }
    for block in fenced_blocks(text) {
        match serde_json::from_str(block) {
            Ok(v) => return Ok(v),
            Err(e) => tracing::debug!(error = %e, "fenced block is not JSON"),
        }
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            match serde_json::from_str(&text[start..=end]) {
                Ok(v) => return Ok(v),
                Err(e) => tracing::debug!(error = %e, "brace span is not JSON"),
            }
        }
    }
    Err(ExtractError::NoJsonObject)
}

/// Bodies of ```` ``` ```` fenced blocks. The info string (`json`, or
/// nothing) up to the first newline is skipped.
fn fenced_blocks(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let open = rest.find(FENCE)?;
        let after = &rest[open + FENCE.len()..];
        let body_start = after.find('\n').map(|i| i + 1)?;
        let body = &after[body_start..];
        let close = body.find(FENCE)?;
        rest = &body[close + FENCE.len()..];
        Some(body[..close].trim())
    })
}

#[cfg(test)]
mod tests {
    use super::{ExtractError, extract_json};
    use serde_json::json;

    #[test]
    fn whole_text() {
        assert_eq!(extract_json("{\"a\":1}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn fenced_json_block() {
        let text = "Sure!\n```json\n{\"a\":1}\n```\nAnything else?";
        assert_eq!(extract_json(text).unwrap(), json!({"a": 1}));
        assert_eq!(extract_json("```json\n{\"a\":1}\n```").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn plain_fence_is_accepted() {
        let text = "```\n{\"a\": [1, 2]}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn brace_span_in_prose() {
        let text = "Here is the data: {\"a\":1} thanks";
        assert_eq!(extract_json(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn later_strategy_used_when_fence_is_broken() {
        let text = "```json\n{broken\n```\nfixed: {\"a\":2}";
        // The brace span runs from the broken block to the end and fails too.
        assert_eq!(extract_json(text), Err(ExtractError::NoJsonObject));
        let text = "```json\nnot json\n``` then {\"a\":2}";
        assert_eq!(extract_json(text).unwrap(), json!({"a": 2}));
    }

    #[test]
    fn garbage_is_an_error() {
        assert_eq!(extract_json("not json at all"), Err(ExtractError::NoJsonObject));
        assert_eq!(extract_json("} backwards {"), Err(ExtractError::NoJsonObject));
        assert_eq!(extract_json(""), Err(ExtractError::NoJsonObject));
    }
}
