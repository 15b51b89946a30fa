use super::ToolError;
use crate::shared::ids::new_request_id;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Builds a request envelope with a fresh unique id.
    pub fn new(method: &str, params: Option<Value>) -> Result<Self, ToolError> {
        Ok(Self {
            jsonrpc: "2.0",
            id: new_request_id().map_err(ToolError::Transport)?,
            method: method.to_string(),
            params,
        })
    }
}

/// Rendered `error` field of a response envelope, if any.
pub fn response_error(payload: &Value) -> Option<String> {
    match payload.get("error")? {
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

pub fn first_content_text(result: &Value) -> String {
    let Some(first) = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|content| content.first())
    else {
        return String::new();
    };
    if first.get("type").and_then(Value::as_str) == Some("text") {
        return first
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
    }
    serde_json::to_string_pretty(first).unwrap_or_else(|_| first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_omits_absent_params() {
        let request = RpcRequest::new("tools/list", None).expect("request");
        let rendered = serde_json::to_value(&request).expect("serialize");
        assert_eq!(rendered["jsonrpc"], "2.0");
        assert_eq!(rendered["method"], "tools/list");
        assert!(rendered.get("params").is_none());
        assert_eq!(rendered["id"].as_str().expect("id").len(), 36);
    }

    #[test]
    fn error_field_is_rendered_whatever_its_shape() {
        assert_eq!(response_error(&json!({"error": "boom"})).as_deref(), Some("boom"));
        assert_eq!(
            response_error(&json!({"error": {"code": 1}})).as_deref(),
            Some("{\"code\":1}")
        );
        assert_eq!(response_error(&json!({"result": {}})), None);
    }

    #[test]
    fn text_content_missing_text_is_empty() {
        assert_eq!(first_content_text(&json!({"content": [{"type": "text"}]})), "");
        assert_eq!(
            first_content_text(&json!({"content": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]})),
            "a"
        );
    }
}
