//! Agent invocation boundary: turns an agent's system prompt plus an assembled
//! context into text by running a provider CLI as a subprocess.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod agent;
pub mod invocation;
pub mod model_map;
pub mod output_parse;
pub mod prompt_files;
pub mod registry;
pub mod runner;

pub use agent::{format_human_message, AgentContext, AgentInvoker, ProviderAgentInvoker, ToolResults};
pub use invocation::build_invocation;
pub use model_map::resolve_anthropic_model;
pub use output_parse::parse_openai_jsonl;
pub use prompt_files::{read_prompt, write_prompt_files};
pub use registry::AgentRegistry;
pub use runner::{run_provider, RunnerBinaries};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unsupported anthropic model `{0}`")]
    UnsupportedAnthropicModel(String),
    #[error("prompt file for agent `{agent}` not found")]
    MissingResource { agent: String },
    #[error("provider binary missing for {provider}: {binary}")]
    MissingBinary {
        provider: ProviderKind,
        binary: String,
        log: Box<InvocationLog>,
    },
    #[error("{provider} exited with code {exit_code}: {stderr}")]
    NonZeroExit {
        provider: ProviderKind,
        exit_code: i32,
        stderr: String,
        log: Box<InvocationLog>,
    },
    #[error("{provider} did not finish within {timeout_ms}ms")]
    Timeout {
        provider: ProviderKind,
        timeout_ms: u64,
        log: Box<InvocationLog>,
    },
    #[error("could not read {provider} output: {reason}")]
    ParseFailure {
        provider: ProviderKind,
        reason: String,
        log: Option<Box<InvocationLog>>,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<crate::config::ConfigProviderKind> for ProviderKind {
    fn from(value: crate::config::ConfigProviderKind) -> Self {
        match value {
            crate::config::ConfigProviderKind::Anthropic => Self::Anthropic,
            crate::config::ConfigProviderKind::OpenAi => Self::OpenAi,
        }
    }
}

/// The two files a delegation hands to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFiles {
    pub system_prompt: PathBuf,
    pub context: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub agent: String,
    pub provider: ProviderKind,
    pub model: String,
    pub work_dir: PathBuf,
    /// Short instruction passed on the command line; points at `prompt_files`.
    pub instruction: String,
    pub prompt_files: PromptFiles,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct InvocationSpec {
    pub binary: String,
    pub args: Vec<String>,
    pub resolved_model: String,
}

impl InvocationSpec {
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What ran and how it ended; attached to every result and failure.
#[derive(Debug, Clone)]
pub struct InvocationLog {
    pub agent: String,
    pub provider: ProviderKind,
    pub model: String,
    pub command_line: String,
    pub work_dir: PathBuf,
    pub prompt_files: PromptFiles,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub message: String,
    pub log: InvocationLog,
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> ProviderError {
    ProviderError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request(provider: ProviderKind, model: &str, work_dir: &Path) -> ProviderRequest {
        ProviderRequest {
            agent: "Writer".to_string(),
            provider,
            model: model.to_string(),
            work_dir: work_dir.to_path_buf(),
            instruction: "read the files".to_string(),
            prompt_files: write_prompt_files(work_dir, "req-1", "system", "context")
                .expect("prompt files"),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn anthropic_invocation_is_a_fresh_print_session() {
        let dir = tempdir().expect("tempdir");
        let spec = build_invocation(
            &request(ProviderKind::Anthropic, "haiku", dir.path()),
            &RunnerBinaries::default(),
        )
        .expect("build");
        assert_eq!(spec.resolved_model, "claude-haiku-4-5");
        assert_eq!(
            spec.command_line(),
            "claude --dangerously-skip-permissions --model claude-haiku-4-5 -p read the files"
        );
    }

    #[test]
    fn openai_invocation_uses_exec_json_stream() {
        let dir = tempdir().expect("tempdir");
        let spec = build_invocation(
            &request(ProviderKind::OpenAi, "gpt-5.2", dir.path()),
            &RunnerBinaries::default(),
        )
        .expect("build");
        assert_eq!(spec.binary, "codex");
        assert_eq!(spec.args.first().map(String::as_str), Some("exec"));
        assert_eq!(spec.args.last().map(String::as_str), Some("read the files"));
        assert!(spec.args.iter().any(|arg| arg == "--json"));
    }

    #[test]
    fn unknown_anthropic_alias_fails_before_spawning() {
        let dir = tempdir().expect("tempdir");
        let err = build_invocation(
            &request(ProviderKind::Anthropic, "claude-3-nope", dir.path()),
            &RunnerBinaries::default(),
        )
        .expect_err("unsupported");
        assert!(matches!(err, ProviderError::UnsupportedAnthropicModel(_)));
    }

    #[test]
    fn provider_kind_follows_configured_provider() {
        assert_eq!(
            ProviderKind::from(crate::config::ConfigProviderKind::OpenAi),
            ProviderKind::OpenAi
        );
        assert_eq!(ProviderKind::Anthropic.to_string(), "anthropic");
    }
}
