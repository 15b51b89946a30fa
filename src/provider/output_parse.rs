use crate::provider::{ProviderError, ProviderKind};
use serde_json::Value;

pub(crate) fn parse_anthropic_output(stdout: &str) -> Result<String, ProviderError> {
    non_empty(stdout).ok_or_else(|| ProviderError::ParseFailure {
        provider: ProviderKind::Anthropic,
        reason: "stdout was empty".to_string(),
        log: None,
    })
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn agent_message_text(item: &Value) -> Option<String> {
    for field in ["text", "message"] {
        if let Some(text) = item.get(field).and_then(Value::as_str).and_then(non_empty) {
            return Some(text);
        }
    }

    match item.get("content")? {
        Value::String(text) => non_empty(text),
        Value::Array(parts) => {
            let lines = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .filter_map(non_empty)
                .collect::<Vec<_>>();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        _ => None,
    }
}

/// Returns the text of the last completed `agent_message` event in a codex JSONL stream.
pub fn parse_openai_jsonl(stdout: &str) -> Result<String, ProviderError> {
    let mut last_message = None;

    for line in stdout.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let event: Value = serde_json::from_str(line).map_err(|err| ProviderError::ParseFailure {
            provider: ProviderKind::OpenAi,
            reason: format!("invalid jsonl event: {err}"),
            log: None,
        })?;

        if event.get("type").and_then(Value::as_str) != Some("item.completed") {
            continue;
        }
        let Some(item) = event.get("item") else {
            continue;
        };
        if item.get("type").and_then(Value::as_str) != Some("agent_message") {
            continue;
        }
        if let Some(message) = agent_message_text(item) {
            last_message = Some(message);
        }
    }

    last_message.ok_or_else(|| ProviderError::ParseFailure {
        provider: ProviderKind::OpenAi,
        reason: "missing terminal agent_message item.completed event".to_string(),
        log: None,
    })
}
