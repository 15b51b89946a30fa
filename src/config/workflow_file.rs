use super::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Reserved agent identifier for the blocking approval gate.
pub const HUMAN_REVIEW_AGENT: &str = "HumanReview";
pub const DEFAULT_REVIEW_PROMPT: &str = "Do you approve to proceed?";
pub const RESERVED_STATE_KEYS: [&str; 2] = ["history", "completed"];

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct WorkflowDefinition {
    #[serde(default)]
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Phase {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowStep {
    pub agent: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub mcp_tools: Vec<ToolInvocationRequest>,
}

impl WorkflowStep {
    pub fn is_human_review(&self) -> bool {
        self.agent == HUMAN_REVIEW_AGENT
    }

    pub fn review_prompt(&self) -> &str {
        self.prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
            .unwrap_or(DEFAULT_REVIEW_PROMPT)
    }

    pub fn output_key(&self) -> Option<&str> {
        self.output.as_deref().filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolInvocationRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ToolInvocationRequest {
    /// Key the tool result is exposed under in the agent context.
    pub fn result_key(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

impl WorkflowDefinition {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn step_count(&self) -> usize {
        self.phases.iter().map(|phase| phase.steps.len()).sum()
    }

    /// Distinct delegated agent names in declaration order.
    pub fn delegated_agents(&self) -> Vec<&str> {
        let mut agents: Vec<&str> = Vec::new();
        for step in self.phases.iter().flat_map(|phase| phase.steps.iter()) {
            if step.is_human_review() || agents.contains(&step.agent.as_str()) {
                continue;
            }
            agents.push(step.agent.as_str());
        }
        agents
    }
}
