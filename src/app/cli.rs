#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Resume,
    Check,
    Package,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "resume" => CliVerb::Resume,
        "check" => CliVerb::Check,
        "package" => CliVerb::Package,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Usage: relaycrew <command> [options]".to_string(),
        String::new(),
        "Commands:".to_string(),
        "  run --plan <path>                    Execute a project plan from the first incomplete step"
            .to_string(),
        "  resume --plan <path>                 Same as run; completed steps are skipped".to_string(),
        "  check [--require <tool>[,<tool>]]    Verify the tool endpoint and required tools"
            .to_string(),
        "        [--require-management]         Also require the workflow management tools"
            .to_string(),
        "  package [--project <name>]           Zip a project's deliverables".to_string(),
        "          [--output <path>]".to_string(),
        "  help                                 Show this help".to_string(),
        String::new(),
        "Environment:".to_string(),
        "  RELAYCREW_HOME                       Workspace root (default: current directory)"
            .to_string(),
        "  RELAYCREW_PROVIDER, RELAYCREW_MODEL  Agent provider (anthropic|openai) and model"
            .to_string(),
        "  RELAYCREW_TOOLS_URL, RELAYCREW_TOOLS_TOKEN, RELAYCREW_TOOLS_MODE, RELAYCREW_TOOLS_FIXTURES"
            .to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
