use crate::config::ConfigError;
use crate::provider::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("agent `{agent}` failed: {source}")]
    Agent {
        agent: String,
        #[source]
        source: ProviderError,
    },
    #[error("human review failed: {0}")]
    Review(String),
    #[error("state key `{key}` is reserved")]
    ReservedStateKey { key: String },
    #[error("plan configuration: {0}")]
    Config(String),
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ConfigError> for OrchestratorError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
