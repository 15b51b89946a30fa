use super::{ToolError, TOOLS_CALL_METHOD};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Recorded responses keyed by [`simulation_key`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSet {
    payloads: Map<String, Value>,
}

impl FixtureSet {
    pub fn from_path(path: &Path) -> Result<Self, ToolError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            ToolError::Configuration(format!("failed to read fixtures {}: {err}", path.display()))
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|err| {
            ToolError::Configuration(format!("invalid fixtures json {}: {err}", path.display()))
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(payloads) => Ok(Self { payloads }),
            other => Err(ToolError::Configuration(format!(
                "fixtures must be a json object keyed by request, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payloads.get(key)
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Bare method name, or `tools/call::<name>::<canonical arguments>` for tool calls.
pub fn simulation_key(method: &str, params: Option<&Value>) -> String {
    if method != TOOLS_CALL_METHOD {
        return method.to_string();
    }
    let name = params
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let empty = Value::Object(Map::new());
    let arguments = params
        .and_then(|p| p.get("arguments"))
        .filter(|args| !args.is_null())
        .unwrap_or(&empty);
    format!("{TOOLS_CALL_METHOD}::{name}::{}", canonical_json(arguments))
}

/// Sorted-key JSON with `", "` / `": "` separators and ASCII-only escapes, matching
/// the key format of recorded fixture files.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys = map.keys().collect::<Vec<_>>();
            keys.sort();
            out.push('{');
            for (index, key) in keys.into_iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_string(key, out);
                out.push_str(": ");
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(text) => write_string(text, out),
        other => out.push_str(&other.to_string()),
    }
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ch if (ch as u32) < 0x20 || (ch as u32) > 0x7e => {
                let mut units = [0_u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
