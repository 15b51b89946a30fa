use super::paths::UNNAMED_PROJECT;
use super::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Project plan: names the project, seeds its state and points at a workflow definition.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlanConfig {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub workflow_definition: Option<String>,
    #[serde(default)]
    pub brief: Option<Value>,
    #[serde(default)]
    pub mission: Option<Value>,
    #[serde(default)]
    pub audience: Option<Value>,
    #[serde(default)]
    pub deliverables: Option<Value>,
}

fn default_project_name() -> String {
    UNNAMED_PROJECT.to_string()
}

impl PlanConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let plan: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::shared::ids::validate_identifier_value("project_name", &self.project_name)
            .map_err(ConfigError::Plan)?;
        self.workflow_file()?;
        Ok(())
    }

    pub fn workflow_file(&self) -> Result<&str, ConfigError> {
        self.workflow_definition
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                ConfigError::Plan("workflow definition not specified in project plan".to_string())
            })
    }
}
