use crate::config::{checkpoint_path, deliverables_path, PlanConfig, RESERVED_STATE_KEYS};
use crate::log_fields;
use crate::orchestration::error::OrchestratorError;
use crate::orchestration::review_gate::ReviewDecision;
use crate::orchestration::step_id::StepId;
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::logging::EventLog;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DELIVERABLE_EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub agent: String,
    #[serde(default)]
    pub task: String,
    pub result: String,
}

/// Accumulated project state. `history` and `completed` are structural; every other
/// key is a seed field or a step output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub completed: BTreeSet<String>,
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl ProjectState {
    pub fn initialize(plan: &PlanConfig) -> Self {
        let mut values = Map::new();
        values.insert(
            "project_name".to_string(),
            Value::String(plan.project_name.clone()),
        );
        for (key, value) in [
            ("brief", &plan.brief),
            ("mission", &plan.mission),
            ("audience", &plan.audience),
            ("deliverables_list", &plan.deliverables),
        ] {
            values.insert(key.to_string(), value.clone().unwrap_or(Value::Null));
        }
        Self {
            history: Vec::new(),
            completed: BTreeSet::new(),
            values,
        }
    }

    pub fn project_name(&self) -> Option<&str> {
        self.values.get("project_name").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn set(&mut self, key: &str, value: Value) -> Result<(), OrchestratorError> {
        if RESERVED_STATE_KEYS.contains(&key) {
            return Err(OrchestratorError::ReservedStateKey {
                key: key.to_string(),
            });
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn is_completed(&self, step_id: &StepId) -> bool {
        self.completed.contains(&step_id.token())
    }

    /// Returns false when the step was already recorded.
    pub fn insert_completed(&mut self, step_id: &StepId) -> bool {
        self.completed.insert(step_id.token())
    }

    pub fn push_history(&mut self, agent: &str, task: &str, result: &str) {
        self.history.push(HistoryEntry {
            agent: agent.to_string(),
            task: task.to_string(),
            result: result.to_string(),
        });
    }
}

#[derive(Debug)]
pub enum CheckpointLoad {
    Missing,
    Loaded(ProjectState),
    Corrupt { reason: String },
}

/// One checkpoint file per project, rewritten wholesale.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    log: EventLog,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            log: EventLog::disabled(),
        }
    }

    pub fn for_project(state_root: &Path, project_name: &str) -> Self {
        Self::new(checkpoint_path(state_root, project_name))
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inspect(&self) -> CheckpointLoad {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return CheckpointLoad::Missing,
            Err(err) => {
                return CheckpointLoad::Corrupt {
                    reason: format!("unreadable: {err}"),
                }
            }
        };
        match serde_json::from_str::<ProjectState>(&raw) {
            Ok(state) => CheckpointLoad::Loaded(state),
            Err(err) => CheckpointLoad::Corrupt {
                reason: format!("malformed: {err}"),
            },
        }
    }

    /// Absent on any failure; corruption is logged but never fatal.
    pub fn load(&self) -> Option<ProjectState> {
        let path = self.path.display().to_string();
        match self.inspect() {
            CheckpointLoad::Missing => None,
            CheckpointLoad::Loaded(state) => {
                self.log.info(
                    "checkpoint.loaded",
                    format!(
                        "Resuming from checkpoint {path} ({} completed steps)",
                        state.completed.len()
                    ),
                    log_fields!("path" => path, "completed" => state.completed.len()),
                );
                Some(state)
            }
            CheckpointLoad::Corrupt { reason } => {
                self.log.warn(
                    "checkpoint.corrupt",
                    format!("Ignoring corrupt checkpoint {path}: {reason}"),
                    log_fields!("path" => path, "reason" => reason),
                );
                None
            }
        }
    }

    pub fn persist(&self, state: &ProjectState) -> Result<(), OrchestratorError> {
        let path = self.path.display().to_string();
        let body = serde_json::to_vec_pretty(state).map_err(|source| OrchestratorError::Json {
            path: path.clone(),
            source,
        })?;
        atomic_write_file(&self.path, &body).map_err(|source| OrchestratorError::Io { path, source })
    }
}

/// Writes `<dir>/<output_key>.md` deliverables for one project.
#[derive(Debug, Clone)]
pub struct DeliverableWriter {
    dir: PathBuf,
}

impl DeliverableWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_project(deliverables_root: &Path, project_name: &str) -> Self {
        Self::new(deliverables_path(deliverables_root, project_name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, output_key: &str) -> PathBuf {
        self.dir
            .join(format!("{output_key}.{DELIVERABLE_EXTENSION}"))
    }

    pub fn write(&self, output_key: &str, content: &str) -> Result<PathBuf, OrchestratorError> {
        fs::create_dir_all(&self.dir).map_err(|source| OrchestratorError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;
        let path = self.path_for(output_key);
        fs::write(&path, content).map_err(|source| OrchestratorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }
}

/// Sole owner of the project state during a run.
#[derive(Debug)]
pub struct StateStore {
    state: ProjectState,
    checkpoints: CheckpointStore,
    deliverables: DeliverableWriter,
    log: EventLog,
}

impl StateStore {
    /// Seeds from the checkpoint when one loads, otherwise from the plan.
    pub fn open(
        plan: &PlanConfig,
        checkpoints: CheckpointStore,
        deliverables: DeliverableWriter,
        log: EventLog,
    ) -> Self {
        let checkpoints = checkpoints.with_log(log.clone());
        let state = checkpoints
            .load()
            .unwrap_or_else(|| ProjectState::initialize(plan));
        Self {
            state,
            checkpoints,
            deliverables,
            log,
        }
    }

    pub fn from_state(
        state: ProjectState,
        checkpoints: CheckpointStore,
        deliverables: DeliverableWriter,
    ) -> Self {
        Self {
            state,
            checkpoints,
            deliverables,
            log: EventLog::disabled(),
        }
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn into_state(self) -> ProjectState {
        self.state
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn deliverables(&self) -> &DeliverableWriter {
        &self.deliverables
    }

    /// Appends history, then stores the result under `output_key` and writes its
    /// deliverable when the step declares one.
    pub fn record_step_result(
        &mut self,
        agent: &str,
        task: &str,
        output_key: Option<&str>,
        result: &str,
    ) -> Result<(), OrchestratorError> {
        self.state.push_history(agent, task, result);
        let Some(key) = output_key else {
            return Ok(());
        };
        self.state.set(key, Value::String(result.to_string()))?;
        let path = self.deliverables.write(key, result)?;
        self.log.info(
            "step.output",
            format!("Stored output in state key '{key}', deliverable saved to {}", path.display()),
            log_fields!("agent" => agent, "output" => key, "path" => path.display().to_string()),
        );
        Ok(())
    }

    pub fn record_review(&mut self, agent: &str, task: &str, decision: ReviewDecision) {
        self.state.push_history(agent, task, decision.as_str());
    }

    /// Persist failures are logged and swallowed; the step then re-runs on resume.
    pub fn mark_completed(&mut self, step_id: &StepId) {
        self.state.insert_completed(step_id);
        if let Err(err) = self.checkpoints.persist(&self.state) {
            self.log.warn(
                "checkpoint.write_failed",
                format!("Checkpoint write failed after step {step_id}: {err}"),
                log_fields!("step" => step_id.token(), "error" => err.to_string()),
            );
        }
    }
}
