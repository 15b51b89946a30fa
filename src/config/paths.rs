use std::path::{Path, PathBuf};

pub const WORKSPACE_ROOT_ENV: &str = "RELAYCREW_HOME";
pub const SETTINGS_FILE_NAME: &str = "relaycrew.yaml";
pub const UNNAMED_PROJECT: &str = "unnamed_project";

pub const DEFAULT_WORKFLOWS_DIR: &str = "workflows";
pub const DEFAULT_DELIVERABLES_DIR: &str = "deliverables";
pub const DEFAULT_STATE_DIR: &str = "state";
pub const DEFAULT_PROMPT_DIRS: [&str; 3] = ["agents/fused", "agents/core", "agents/tools"];

pub fn deliverables_path(deliverables_root: &Path, project_name: &str) -> PathBuf {
    deliverables_root.join(project_name)
}

pub fn checkpoint_path(state_root: &Path, project_name: &str) -> PathBuf {
    state_root.join(format!("{project_name}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_paths_are_keyed_by_project_name() {
        let root = Path::new("/work");
        assert_eq!(
            deliverables_path(&root.join("deliverables"), "demo"),
            PathBuf::from("/work/deliverables/demo")
        );
        assert_eq!(
            checkpoint_path(&root.join("state"), "demo"),
            PathBuf::from("/work/state/demo.json")
        );
    }
}
