use crate::provider::{
    run_provider, write_prompt_files, AgentRegistry, PromptFiles, ProviderError,
    ProviderKind, ProviderRequest, RunnerBinaries,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Tool output text keyed by the tool's alias (or name).
pub type ToolResults = BTreeMap<String, String>;

/// Context handed to an agent: the step's declared inputs in declaration order,
/// followed by the task. Missing state keys are present with a `null` value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentContext {
    entries: Vec<(String, Value)>,
}

impl AgentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The boundary between the engine and whatever turns a prompt into text.
pub trait AgentInvoker {
    fn invoke(
        &mut self,
        agent: &str,
        context: &AgentContext,
        tool_results: &ToolResults,
    ) -> Result<String, ProviderError>;
}

impl<F> AgentInvoker for F
where
    F: FnMut(&str, &AgentContext, &ToolResults) -> Result<String, ProviderError>,
{
    fn invoke(
        &mut self,
        agent: &str,
        context: &AgentContext,
        tool_results: &ToolResults,
    ) -> Result<String, ProviderError> {
        self(agent, context, tool_results)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => format!("- {text}"),
                other => format!("- {other}"),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        other => other.to_string(),
    }
}

/// Renders the human-turn message an agent receives. Blank values are omitted.
pub fn format_human_message(context: &AgentContext, tool_results: &ToolResults) -> String {
    let mut message = String::from("Here is the context for your current task:\n\n");
    for (key, value) in context.iter() {
        if is_blank(value) {
            continue;
        }
        message.push_str(&format!("--- {} ---\n", key.to_uppercase()));
        message.push_str(&render_value(value));
        message.push_str("\n\n");
    }
    if !tool_results.is_empty() {
        message.push_str("--- TOOL RESULTS ---\n");
        for (alias, text) in tool_results {
            message.push_str(&format!("### {alias}\n{text}\n\n"));
        }
    }
    message.push_str(
        "Please perform your task now based on this context and your core instructions.",
    );
    message
}

/// Delegates to a provider CLI (`claude` / `codex`) using the agent's prompt file as
/// the system prompt and the formatted context as a companion file.
#[derive(Debug, Clone)]
pub struct ProviderAgentInvoker {
    registry: AgentRegistry,
    provider: ProviderKind,
    model: String,
    binaries: RunnerBinaries,
    timeout: Duration,
    work_dir: PathBuf,
}

impl ProviderAgentInvoker {
    pub fn new(registry: AgentRegistry, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            provider: ProviderKind::Anthropic,
            model: "sonnet".to_string(),
            binaries: RunnerBinaries::default(),
            timeout: Duration::from_secs(900),
            work_dir: work_dir.into(),
        }
    }

    pub fn from_settings(
        registry: AgentRegistry,
        settings: &crate::config::ProviderSettings,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::new(registry, work_dir)
            .with_provider(settings.provider.into(), settings.resolved_model())
            .with_binaries(RunnerBinaries::from_settings(settings))
            .with_timeout(Duration::from_secs(settings.timeout_seconds))
    }

    pub fn with_provider(mut self, provider: ProviderKind, model: impl Into<String>) -> Self {
        self.provider = provider;
        self.model = model.into();
        self
    }

    pub fn with_binaries(mut self, binaries: RunnerBinaries) -> Self {
        self.binaries = binaries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl AgentInvoker for ProviderAgentInvoker {
    fn invoke(
        &mut self,
        agent: &str,
        context: &AgentContext,
        tool_results: &ToolResults,
    ) -> Result<String, ProviderError> {
        let system_prompt = self.registry.load_prompt(agent)?;
        let request_id = format!("{agent}-{}", now_nanos());
        let prompt_files = write_prompt_files(
            &self.work_dir,
            &request_id,
            &system_prompt,
            &format_human_message(context, tool_results),
        )?;
        let request = ProviderRequest {
            agent: agent.to_string(),
            provider: self.provider,
            model: self.model.clone(),
            work_dir: self.work_dir.clone(),
            instruction: instruction_for(&prompt_files),
            prompt_files,
            timeout: self.timeout,
        };
        Ok(run_provider(&request, &self.binaries)?.message)
    }
}

fn instruction_for(files: &PromptFiles) -> String {
    format!(
        "Your core instructions are in {}. The context for your current task is in {}. Reply with the deliverable text only.",
        files.system_prompt.display(),
        files.context.display()
    )
}

fn now_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn human_message_lists_values_skips_blanks_and_appends_tools() {
        let mut context = AgentContext::new();
        context.insert("brief", json!("Automate invoices"));
        context.insert("deliverables_list", json!(["workflow.json", "README"]));
        context.insert("draft", Value::Null);
        context.insert("task", json!("Write the plan"));
        let mut tools = ToolResults::new();
        tools.insert("nodes".to_string(), "webhook, http".to_string());

        let message = format_human_message(&context, &tools);

        assert!(message.starts_with("Here is the context for your current task:\n\n"));
        assert!(message.contains("--- BRIEF ---\nAutomate invoices\n\n"));
        assert!(message.contains("--- DELIVERABLES_LIST ---\n- workflow.json\n- README\n\n"));
        assert!(!message.contains("DRAFT"));
        assert!(message.contains("--- TOOL RESULTS ---\n### nodes\nwebhook, http\n"));
        let brief_at = message.find("BRIEF").expect("brief");
        let task_at = message.find("TASK").expect("task");
        assert!(brief_at < task_at);
        assert!(message.ends_with("your core instructions."));
    }

    #[test]
    fn context_insert_replaces_in_place() {
        let mut context = AgentContext::new();
        context.insert("a", json!(1));
        context.insert("b", json!(2));
        context.insert("a", json!(3));
        assert_eq!(context.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(context.get("a"), Some(&json!(3)));
    }

    #[test]
    fn closures_act_as_agent_invokers() {
        let mut calls = Vec::new();
        let mut invoker = |agent: &str, _: &AgentContext, _: &ToolResults| {
            calls.push(agent.to_string());
            Ok::<_, ProviderError>(format!("{agent} done"))
        };
        let out = invoker
            .invoke("Writer", &AgentContext::new(), &ToolResults::new())
            .expect("invoke");
        assert_eq!(out, "Writer done");
        drop(invoker);
        assert_eq!(calls, vec!["Writer"]);
    }
}
