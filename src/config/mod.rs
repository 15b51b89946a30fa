pub mod error;
pub mod load;
pub mod paths;
pub mod plan;
pub mod settings;
pub mod validate;
pub mod workflow_file;

pub use error::ConfigError;
pub use load::{load_plan_bundle, PlanBundle};
pub use paths::{
    checkpoint_path, deliverables_path, SETTINGS_FILE_NAME, UNNAMED_PROJECT,
    WORKSPACE_ROOT_ENV,
};
pub use plan::PlanConfig;
pub use settings::{
    default_workspace_root, ConfigProviderKind, ProviderSettings, Settings, ToolEndpointSettings,
    ToolMode,
};
pub use validate::validate_workflow;
pub use workflow_file::{
    Phase, ToolInvocationRequest, WorkflowDefinition, WorkflowStep, DEFAULT_REVIEW_PROMPT,
    HUMAN_REVIEW_AGENT, RESERVED_STATE_KEYS,
};
