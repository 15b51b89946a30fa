use crate::app::command_handlers::CommandError;
use crate::app::command_support::parse_flags;
use crate::config::Settings;
use crate::tool_client::{ClientInfo, ToolClient, ToolError};

pub const MANAGEMENT_TOOLS: [&str; 2] = ["n8n_create_workflow", "n8n_update_partial_workflow"];

pub fn cmd_check(settings: &Settings, args: &[String]) -> Result<String, CommandError> {
    let required = required_tools(args)?;
    let client = ToolClient::from_settings(settings)
        .map_err(check_error)?
        .ok_or_else(|| {
            CommandError::not_configured(
                "Tool endpoint not configured. Set RELAYCREW_TOOLS_URL and RELAYCREW_TOOLS_TOKEN.",
            )
        })?;
    let mut lines = Vec::new();
    client
        .initialize(Some(ClientInfo::new("relaycrew-cli", env!("CARGO_PKG_VERSION"))))
        .map_err(check_error)?;
    let tools = client.list_tools().map_err(check_error)?;
    lines.push(format!(
        "OK: tools reachable (mode={}), tools: {}",
        client.mode(),
        tools.len()
    ));
    if !required.is_empty() {
        client.require_tools(required.as_slice()).map_err(check_error)?;
        lines.push(format!("OK: required tools present: {}", required.join(", ")));
    }
    Ok(lines.join("\n"))
}

fn check_error(err: ToolError) -> CommandError {
    match err {
        ToolError::Configuration(_) => CommandError::not_configured(format!("ERROR: {err}")),
        other => CommandError::failure(format!("ERROR: {other}")),
    }
}

/// Union of every `--require` list plus the management set, first occurrence order.
fn required_tools(args: &[String]) -> Result<Vec<String>, CommandError> {
    let flags = parse_flags(args, &["--require"], &["--require-management"])?;
    let mut required: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        let name = name.trim();
        if !name.is_empty() && !required.iter().any(|existing| existing == name) {
            required.push(name.to_string());
        }
    };
    for (flag, value) in &flags {
        match value {
            Some(list) => list.split(',').for_each(&mut push),
            None if flag == "--require-management" => MANAGEMENT_TOOLS.iter().for_each(|name| push(name)),
            None => {}
        }
    }
    Ok(required)
}
