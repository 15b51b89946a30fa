use crate::config::{ToolInvocationRequest, WorkflowStep};
use crate::log_fields;
use crate::orchestration::state_store::ProjectState;
use crate::provider::{AgentContext, ToolResults};
use crate::shared::logging::EventLog;
use crate::tool_client::ToolInvoker;
use serde_json::Value;

pub const TOOL_CLIENT_NOT_CONFIGURED: &str = "tool client not configured";

/// Declared inputs in order (absent keys as `null`), then `task`.
pub fn assemble_context(state: &ProjectState, step: &WorkflowStep) -> AgentContext {
    let mut context = AgentContext::new();
    for key in &step.inputs {
        context.insert(key.as_str(), state.get(key).cloned().unwrap_or(Value::Null));
    }
    context.insert("task", Value::String(step.task.clone()));
    context
}

pub fn tool_error_text(name: &str, reason: &str) -> String {
    format!("error: tool `{name}` failed: {reason}")
}

/// Runs every declared tool call. Failures never abort the step: the slot holds
/// an inline error string instead of tool output.
pub fn gather_tool_results(
    tools: Option<&dyn ToolInvoker>,
    requests: &[ToolInvocationRequest],
    log: &EventLog,
) -> ToolResults {
    let mut results = ToolResults::new();
    for request in requests {
        let key = request.result_key().to_string();
        let outcome = match tools {
            Some(client) => client
                .call_tool_text(&request.name, &request.arguments)
                .map_err(|err| err.to_string()),
            None => Err(TOOL_CLIENT_NOT_CONFIGURED.to_string()),
        };
        let text = match outcome {
            Ok(text) => {
                log.info(
                    "tool.call",
                    format!("Tool '{}' returned {} bytes", request.name, text.len()),
                    log_fields!("tool" => request.name.as_str(), "alias" => key.as_str()),
                );
                text
            }
            Err(reason) => {
                log.warn(
                    "tool.error",
                    format!("Tool '{}' failed: {reason}", request.name),
                    log_fields!("tool" => request.name.as_str(), "alias" => key.as_str(), "error" => reason.as_str()),
                );
                tool_error_text(&request.name, &reason)
            }
        };
        results.insert(key, text);
    }
    results
}
