use crate::orchestration::error::OrchestratorError;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewDecision::Approved => "Approved",
            ReviewDecision::Rejected => "Rejected",
        }
    }
}

/// Blocking approve-or-abort control point.
pub trait ReviewGate {
    fn request_approval(&mut self, prompt: &str) -> Result<ReviewDecision, OrchestratorError>;
}

impl<F> ReviewGate for F
where
    F: FnMut(&str) -> Result<ReviewDecision, OrchestratorError>,
{
    fn request_approval(&mut self, prompt: &str) -> Result<ReviewDecision, OrchestratorError> {
        self(prompt)
    }
}

fn review_io(err: io::Error) -> OrchestratorError {
    OrchestratorError::Review(err.to_string())
}

/// Re-prompts until the answer is `y` or `n` (any case). There is no retry cap;
/// end of input is an error rather than an implicit answer.
pub fn prompt_for_decision<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<ReviewDecision, OrchestratorError> {
    writeln!(output, "\n--- PAUSING for Human Review ---").map_err(review_io)?;
    writeln!(output, "--- Review generated deliverables in the deliverables folder. ---")
        .map_err(review_io)?;
    loop {
        write!(output, "{prompt} (y/n): ").map_err(review_io)?;
        output.flush().map_err(review_io)?;
        let mut line = String::new();
        if input.read_line(&mut line).map_err(review_io)? == 0 {
            return Err(OrchestratorError::Review(
                "review input closed before a decision was given".to_string(),
            ));
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" => {
                writeln!(output, "--- Approval received. Resuming workflow. ---").map_err(review_io)?;
                return Ok(ReviewDecision::Approved);
            }
            "n" => return Ok(ReviewDecision::Rejected),
            _ => writeln!(output, "Invalid input. Please enter 'y' or 'n'.").map_err(review_io)?,
        }
    }
}

/// Review gate over any line-oriented input and output pair.
#[derive(Debug)]
pub struct StreamReviewGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamReviewGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

pub type TerminalReviewGate = StreamReviewGate<io::StdinLock<'static>, io::Stdout>;

impl TerminalReviewGate {
    pub fn terminal() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ReviewGate for StreamReviewGate<R, W> {
    fn request_approval(&mut self, prompt: &str) -> Result<ReviewDecision, OrchestratorError> {
        prompt_for_decision(&mut self.input, &mut self.output, prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decide(script: &str) -> (Result<ReviewDecision, OrchestratorError>, String) {
        let mut gate = StreamReviewGate::new(Cursor::new(script.to_string()), Vec::new());
        let decision = gate.request_approval("Ship it?");
        let (_, output) = gate.into_parts();
        (decision, String::from_utf8(output).expect("utf8"))
    }

    #[test]
    fn invalid_answers_reprompt_until_decided() {
        let (decision, output) = decide("maybe\n\nYES\nY\n");
        assert_eq!(decision.expect("decision"), ReviewDecision::Approved);
        assert_eq!(output.matches("Ship it? (y/n): ").count(), 4);
        assert_eq!(output.matches("Invalid input. Please enter 'y' or 'n'.").count(), 3);
        assert!(output.contains("--- PAUSING for Human Review ---"));
    }

    #[test]
    fn uppercase_n_rejects() {
        let (decision, _) = decide("N\n");
        assert_eq!(decision.expect("decision"), ReviewDecision::Rejected);
    }

    #[test]
    fn end_of_input_is_not_an_answer() {
        let (decision, _) = decide("what\n");
        assert!(matches!(decision, Err(OrchestratorError::Review(_))));
    }
}
