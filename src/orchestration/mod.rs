pub mod context;
pub mod error;
pub mod review_gate;
pub mod state_store;
pub mod step_id;
pub mod workflow_engine;

pub use error::OrchestratorError;
pub use review_gate::{ReviewDecision, ReviewGate, StreamReviewGate, TerminalReviewGate};
pub use state_store::{
    CheckpointLoad, CheckpointStore, DeliverableWriter, HistoryEntry, ProjectState, StateStore,
};
pub use step_id::StepId;
pub use workflow_engine::{Orchestrator, RunOutcome};
