use crate::provider::invocation::build_invocation;
use crate::provider::output_parse::parse_anthropic_output;
use crate::provider::{
    io_error, parse_openai_jsonl, InvocationLog, ProviderError, ProviderKind, ProviderRequest,
    ProviderResult,
};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct RunnerBinaries {
    pub anthropic: String,
    pub openai: String,
}

impl Default for RunnerBinaries {
    fn default() -> Self {
        Self {
            anthropic: "claude".to_string(),
            openai: "codex".to_string(),
        }
    }
}

impl RunnerBinaries {
    pub fn from_settings(settings: &crate::config::ProviderSettings) -> Self {
        Self {
            anthropic: settings.anthropic_binary.clone(),
            openai: settings.openai_binary.clone(),
        }
    }
}

fn collect_output<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_string(&mut text);
        }
        text
    })
}

/// `Ok(None)` when the deadline passed; the child has been killed and reaped.
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Runs the provider CLI to completion. Stdin is closed; stdout carries the answer.
pub fn run_provider(
    request: &ProviderRequest,
    binaries: &RunnerBinaries,
) -> Result<ProviderResult, ProviderError> {
    let spec = build_invocation(request, binaries)?;
    let mut log = InvocationLog {
        agent: request.agent.clone(),
        provider: request.provider,
        model: spec.resolved_model.clone(),
        command_line: spec.command_line(),
        work_dir: request.work_dir.clone(),
        prompt_files: request.prompt_files.clone(),
        exit_code: None,
        timed_out: false,
        elapsed: Duration::ZERO,
    };

    let started = Instant::now();
    let spawned = Command::new(&spec.binary)
        .args(&spec.args)
        .current_dir(&request.work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProviderError::MissingBinary {
                provider: request.provider,
                binary: spec.binary,
                log: Box::new(log),
            });
        }
        Err(err) => return Err(io_error(&request.work_dir, err)),
    };

    let stdout = collect_output(child.stdout.take());
    let stderr = collect_output(child.stderr.take());
    let status = wait_until(&mut child, started + request.timeout)
        .map_err(|err| io_error(&request.work_dir, err))?;
    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();
    log.elapsed = started.elapsed();

    let Some(status) = status else {
        log.timed_out = true;
        return Err(ProviderError::Timeout {
            provider: request.provider,
            timeout_ms: u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX),
            log: Box::new(log),
        });
    };
    log.exit_code = status.code();
    if !status.success() {
        return Err(ProviderError::NonZeroExit {
            provider: request.provider,
            exit_code: status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
            log: Box::new(log),
        });
    }

    let parsed = match request.provider {
        ProviderKind::Anthropic => parse_anthropic_output(&stdout),
        ProviderKind::OpenAi => parse_openai_jsonl(&stdout),
    };
    match parsed {
        Ok(message) => Ok(ProviderResult { message, log }),
        Err(ProviderError::ParseFailure {
            provider, reason, ..
        }) => Err(ProviderError::ParseFailure {
            provider,
            reason,
            log: Some(Box::new(log)),
        }),
        Err(other) => Err(other),
    }
}
