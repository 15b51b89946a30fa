use super::{validate_workflow, ConfigError, PlanConfig, Settings, WorkflowDefinition};
use crate::provider::AgentRegistry;
use std::path::{Path, PathBuf};

/// Everything a run needs that is read from disk before the first step.
#[derive(Debug, Clone)]
pub struct PlanBundle {
    pub plan: PlanConfig,
    pub workflow: WorkflowDefinition,
    pub workflow_path: PathBuf,
    pub registry: AgentRegistry,
}

pub fn load_plan_bundle(settings: &Settings, plan_path: &Path) -> Result<PlanBundle, ConfigError> {
    let plan = PlanConfig::from_path(plan_path)?;
    let workflow_path = settings.workflows_root().join(plan.workflow_file()?);
    let workflow = WorkflowDefinition::from_path(&workflow_path)?;
    let registry = AgentRegistry::discover(&settings.prompt_roots());
    validate_workflow(&workflow, &registry)?;
    Ok(PlanBundle {
        plan,
        workflow,
        workflow_path,
        registry,
    })
}
