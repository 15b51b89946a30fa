use crate::config::WorkflowStep;
use std::fmt;

pub const STEP_ID_SEPARATOR: char = ':';

/// Position-derived identity of a step. Identical for identical steps of an
/// unmodified workflow, which is what lets a resumed run skip completed work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId {
    pub phase_index: usize,
    pub step_index: usize,
    pub agent: String,
    pub output: Option<String>,
}

impl StepId {
    pub fn new(
        phase_index: usize,
        step_index: usize,
        agent: impl Into<String>,
        output: Option<&str>,
    ) -> Self {
        Self {
            phase_index,
            step_index,
            agent: agent.into(),
            output: output.map(str::to_string),
        }
    }

    pub fn for_step(phase_index: usize, step_index: usize, step: &WorkflowStep) -> Self {
        Self::new(phase_index, step_index, step.agent.as_str(), step.output_key())
    }

    /// Serialized form stored in the checkpoint's `completed` set. Workflow
    /// validation keeps the separator out of agent names and output keys.
    pub fn token(&self) -> String {
        format!(
            "{}{SEP}{}{SEP}{}{SEP}{}",
            self.phase_index,
            self.step_index,
            self.agent,
            self.output.as_deref().unwrap_or_default(),
            SEP = STEP_ID_SEPARATOR
        )
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(agent: &str, output: Option<&str>) -> WorkflowStep {
        WorkflowStep {
            agent: agent.to_string(),
            task: "t".to_string(),
            inputs: Vec::new(),
            output: output.map(str::to_string),
            prompt: None,
            mcp_tools: Vec::new(),
        }
    }

    #[test]
    fn tokens_encode_position_agent_and_output() {
        assert_eq!(StepId::for_step(0, 1, &step("Writer", Some("draft"))).token(), "0:1:Writer:draft");
        assert_eq!(StepId::for_step(2, 0, &step("Auditor", None)).token(), "2:0:Auditor:");
    }

    #[test]
    fn same_position_with_different_agent_is_a_different_step() {
        let first = StepId::for_step(0, 0, &step("Writer", Some("draft")));
        let second = StepId::for_step(0, 0, &step("Editor", Some("draft")));
        assert_ne!(first, second);
        assert_eq!(first, StepId::for_step(0, 0, &step("Writer", Some("draft"))));
    }
}
