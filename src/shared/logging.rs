use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const REDACTED: &str = "***redacted***";
const SECRET_MARKERS: [&str; 3] = ["token", "secret", "apikey"];

pub fn orchestrator_log_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join("logs/orchestrator.log")
}

pub fn timestamp_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn redact_fields(fields: &mut Map<String, Value>) {
    for (key, value) in fields.iter_mut() {
        let lower = key.to_ascii_lowercase();
        if SECRET_MARKERS.iter().any(|marker| lower.contains(marker)) {
            *value = Value::String(REDACTED.to_string());
        }
    }
}

pub fn render_event_line(level: &str, event: &str, fields: Map<String, Value>) -> String {
    let mut payload = Map::new();
    payload.insert("ts".to_string(), Value::String(timestamp_utc()));
    payload.insert("level".to_string(), Value::String(level.to_string()));
    payload.insert("event".to_string(), Value::String(event.to_string()));
    for (key, value) in fields {
        payload.insert(key, value);
    }
    redact_fields(&mut payload);
    Value::Object(payload).to_string()
}

/// Append-only JSON-lines event log. Write failures never surface to callers.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
    echo: bool,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            echo: false,
        }
    }

    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(orchestrator_log_path(workspace_root))
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            echo: false,
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: impl AsRef<str>, fields: Map<String, Value>) {
        self.write("info", event, message.as_ref(), fields);
    }

    pub fn warn(&self, event: &str, message: impl AsRef<str>, fields: Map<String, Value>) {
        self.write("warn", event, message.as_ref(), fields);
    }

    fn write(&self, level: &str, event: &str, message: &str, mut fields: Map<String, Value>) {
        if self.echo {
            eprintln!("--- [orchestrator] {message} ---");
        }
        let Some(path) = self.path.as_ref() else {
            return;
        };
        fields.insert("message".to_string(), Value::String(message.to_string()));
        let line = render_event_line(level, event, fields);
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}

#[macro_export]
macro_rules! log_fields {
    () => {
        serde_json::Map::new()
    };
    ($($key:literal => $value:expr),+ $(,)?) => {{
        let mut fields = serde_json::Map::new();
        $(fields.insert($key.to_string(), serde_json::json!($value));)+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn secret_like_fields_are_redacted() {
        let mut fields = Map::new();
        fields.insert("auth_token".to_string(), json!("abc"));
        fields.insert("OpenAI_ApiKey".to_string(), json!("sk-1"));
        fields.insert("agent".to_string(), json!("Writer"));

        let line = render_event_line("info", "tool.call", fields);
        let parsed: Value = serde_json::from_str(&line).expect("json line");

        assert_eq!(parsed["auth_token"], REDACTED);
        assert_eq!(parsed["OpenAI_ApiKey"], REDACTED);
        assert_eq!(parsed["agent"], "Writer");
        assert_eq!(parsed["event"], "tool.call");
        assert!(parsed["ts"].as_str().expect("ts").ends_with('Z'));
    }

    #[test]
    fn event_log_appends_one_json_object_per_line() {
        let dir = tempdir().expect("tempdir");
        let log = EventLog::for_workspace(dir.path());
        log.info("run.start", "starting", crate::log_fields!("project" => "demo"));
        log.warn("checkpoint.corrupt", "bad checkpoint", Map::new());

        let raw = fs::read_to_string(orchestrator_log_path(dir.path())).expect("read log");
        let lines = raw.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).expect("first");
        assert_eq!(first["project"], "demo");
        assert_eq!(first["message"], "starting");
        let second: Value = serde_json::from_str(lines[1]).expect("second");
        assert_eq!(second["level"], "warn");
    }
}
