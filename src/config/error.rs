#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("project plan validation failed: {0}")]
    Plan(String),
    #[error("settings validation failed: {0}")]
    Settings(String),
    #[error("workflow validation failed: {0}")]
    Workflow(String),
    #[error("no prompt found for agent(s): {}", agents.join(", "))]
    UnknownAgents { agents: Vec<String> },
    #[error("failed to resolve current directory for workspace root: {0}")]
    WorkspaceRootUnavailable(#[source] std::io::Error),
}
