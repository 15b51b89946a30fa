use super::paths::{
    DEFAULT_DELIVERABLES_DIR, DEFAULT_PROMPT_DIRS, DEFAULT_STATE_DIR, DEFAULT_WORKFLOWS_DIR,
    SETTINGS_FILE_NAME, WORKSPACE_ROOT_ENV,
};
use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigProviderKind {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ConfigProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            _ => Err("provider must be one of: anthropic, openai".to_string()),
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "sonnet",
            Self::OpenAi => "gpt-5.2",
        }
    }
}

impl std::fmt::Display for ConfigProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Real,
    Simulation,
}

impl ToolMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Simulation => "simulation",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "simulation" => Ok(Self::Simulation),
            _ => Err("tool mode must be one of: real, simulation".to_string()),
        }
    }
}

impl std::fmt::Display for ToolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_agent_timeout_seconds() -> u64 {
    900
}

fn default_tool_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub provider: ConfigProviderKind,
    pub model: Option<String>,
    pub anthropic_binary: String,
    pub openai_binary: String,
    #[serde(default = "default_agent_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: ConfigProviderKind::Anthropic,
            model: None,
            anthropic_binary: "claude".to_string(),
            openai_binary: "codex".to_string(),
            timeout_seconds: default_agent_timeout_seconds(),
        }
    }
}

impl ProviderSettings {
    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolEndpointSettings {
    pub url: Option<String>,
    pub token: Option<String>,
    pub mode: ToolMode,
    pub fixtures: Option<PathBuf>,
    #[serde(default = "default_tool_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ToolEndpointSettings {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            mode: ToolMode::Real,
            fixtures: None,
            timeout_seconds: default_tool_timeout_seconds(),
        }
    }
}

impl ToolEndpointSettings {
    pub fn is_configured(&self) -> bool {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
        };
        present(&self.url) && present(&self.token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip)]
    pub workspace_root: PathBuf,
    pub workflows_dir: PathBuf,
    pub deliverables_dir: PathBuf,
    pub state_dir: PathBuf,
    pub prompt_dirs: Vec<PathBuf>,
    pub provider: ProviderSettings,
    pub tools: ToolEndpointSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            workflows_dir: PathBuf::from(DEFAULT_WORKFLOWS_DIR),
            deliverables_dir: PathBuf::from(DEFAULT_DELIVERABLES_DIR),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            prompt_dirs: DEFAULT_PROMPT_DIRS.iter().map(PathBuf::from).collect(),
            provider: ProviderSettings::default(),
            tools: ToolEndpointSettings::default(),
        }
    }
}

impl Settings {
    pub fn for_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            ..Self::default()
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reads `relaycrew.yaml` from the workspace root when present, then applies
    /// `RELAYCREW_*` environment overrides.
    pub fn load(workspace_root: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(workspace_root, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(workspace_root: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = workspace_root.join(SETTINGS_FILE_NAME);
        let mut settings = if path.is_file() {
            Self::from_path(&path)?
        } else {
            Self::default()
        };
        settings.workspace_root = workspace_root.to_path_buf();
        settings.apply_env(env)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        if let Some(raw) = read("RELAYCREW_PROVIDER") {
            self.provider.provider = ConfigProviderKind::parse(&raw).map_err(ConfigError::Settings)?;
        }
        if let Some(model) = read("RELAYCREW_MODEL") {
            self.provider.model = Some(model);
        }
        if let Some(binary) = read("RELAYCREW_PROVIDER_BIN_ANTHROPIC") {
            self.provider.anthropic_binary = binary;
        }
        if let Some(binary) = read("RELAYCREW_PROVIDER_BIN_OPENAI") {
            self.provider.openai_binary = binary;
        }
        if let Some(raw) = read("RELAYCREW_AGENT_TIMEOUT_SECONDS") {
            self.provider.timeout_seconds = parse_seconds("RELAYCREW_AGENT_TIMEOUT_SECONDS", &raw)?;
        }

        if let Some(url) = read("RELAYCREW_TOOLS_URL") {
            self.tools.url = Some(url);
        }
        if let Some(token) = read("RELAYCREW_TOOLS_TOKEN") {
            self.tools.token = Some(token);
        }
        if let Some(raw) = read("RELAYCREW_TOOLS_MODE") {
            self.tools.mode = ToolMode::parse(&raw).map_err(ConfigError::Settings)?;
        }
        if let Some(raw) = read("RELAYCREW_TOOLS_FIXTURES") {
            self.tools.fixtures = Some(expand_home(&raw, &env));
        }
        if let Some(raw) = read("RELAYCREW_TOOLS_TIMEOUT_SECONDS") {
            self.tools.timeout_seconds = parse_seconds("RELAYCREW_TOOLS_TIMEOUT_SECONDS", &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prompt_dirs.is_empty() {
            return Err(ConfigError::Settings(
                "`prompt_dirs` must be non-empty".to_string(),
            ));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "`provider.timeout_seconds` must be >= 1".to_string(),
            ));
        }
        if self.tools.timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "`tools.timeout_seconds` must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    pub fn workflows_root(&self) -> PathBuf {
        self.resolve(&self.workflows_dir)
    }

    pub fn deliverables_root(&self) -> PathBuf {
        self.resolve(&self.deliverables_dir)
    }

    pub fn state_root(&self) -> PathBuf {
        self.resolve(&self.state_dir)
    }

    pub fn prompt_roots(&self) -> Vec<PathBuf> {
        self.prompt_dirs.iter().map(|dir| self.resolve(dir)).collect()
    }

    pub fn fixtures_path(&self) -> Option<PathBuf> {
        self.tools.fixtures.as_deref().map(|path| self.resolve(path))
    }
}

pub fn default_workspace_root() -> Result<PathBuf, ConfigError> {
    if let Some(root) = std::env::var_os(WORKSPACE_ROOT_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    std::env::current_dir().map_err(ConfigError::WorkspaceRootUnavailable)
}

fn parse_seconds(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Settings(format!("`{key}` must be a whole number of seconds")))
}

fn expand_home<F>(raw: &str, env: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = env("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}
