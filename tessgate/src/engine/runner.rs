//! Subprocess pipeline for the OCR engine.
//!
//! The child's stdin, stdout and stderr are all pipes with bounded kernel
//! buffers. Writing the whole image before reading any output stalls as soon
//! as the engine fills one of its output pipes while still waiting for more
//! input, so the stdin writer and both output drains each run as their own
//! task and all three are joined only after the child has exited.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, warn};

use crate::error::{Result, TessgateError};

use super::types::{EngineInvocation, EngineOutcome, RawImage};

/// Exit code reported when the child was terminated by a signal.
const SIGNALLED_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone)]
pub struct PipelineRunner {
    program: String,
    timeout: Option<Duration>,
}

impl PipelineRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Bound the time a single run may take. The child is killed when it elapses.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub async fn run(&self, invocation: EngineInvocation) -> Result<EngineOutcome> {
        let (args, input) = invocation.into_parts();

        debug!(
            program = %self.program,
            args = ?args,
            input_bytes = input.len(),
            "Spawning OCR engine"
        );

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TessgateError::Spawn(format!("{}: {e}", self.program)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TessgateError::Internal("engine stdin was not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TessgateError::Internal("engine stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TessgateError::Internal("engine stderr was not captured".into()))?;

        let mut writer = tokio::spawn(feed_stdin(stdin, input));
        let mut stdout_drain = tokio::spawn(drain(stdout));
        let mut stderr_drain = tokio::spawn(drain(stderr));

        // The drains only finish once every holder of the output pipes is gone,
        // which includes anything the engine left running in the background.
        let completion = async {
            let waited = child.wait().await;
            let tasks = tokio::join!(&mut writer, &mut stdout_drain, &mut stderr_drain);
            (waited, tasks)
        };

        let finished = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, completion).await.ok(),
            None => Some(completion.await),
        };

        let Some((waited, (written, stdout, stderr))) = finished else {
            warn!(program = %self.program, "OCR engine timed out, killing it");
            if let Ok(None) = child.try_wait() {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed out OCR engine");
                }
            }
            writer.abort();
            stdout_drain.abort();
            stderr_drain.abort();
            let limit = self.timeout.unwrap_or_default();
            return Err(TessgateError::EngineTimeout(limit.as_secs()));
        };
        let status = waited
            .map_err(|e| TessgateError::Internal(format!("Failed to wait for OCR engine: {e}")))?;

        match joined(written)? {
            Ok(()) => {}
            // The engine is free to exit without consuming its input.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("OCR engine closed stdin before reading all input");
            }
            Err(e) => warn!(error = %e, "Failed to write image to OCR engine"),
        }

        let stdout = joined(stdout)?
            .map_err(|e| TessgateError::Internal(format!("Failed to read engine stdout: {e}")))?;
        let stderr = joined(stderr)?
            .map_err(|e| TessgateError::Internal(format!("Failed to read engine stderr: {e}")))?;

        let exit_code = status.code().unwrap_or(SIGNALLED_EXIT_CODE);
        debug!(
            exit_code,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "OCR engine finished"
        );

        Ok(EngineOutcome {
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// Write the whole image and close stdin so the engine sees end-of-input.
async fn feed_stdin(mut stdin: ChildStdin, input: RawImage) -> std::io::Result<()> {
    stdin.write_all(input.as_ref()).await?;
    stdin.shutdown().await
}

async fn drain<R>(mut reader: R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}

fn joined<T>(result: std::result::Result<T, tokio::task::JoinError>) -> Result<T> {
    result.map_err(|e| TessgateError::Internal(format!("engine I/O task failed: {e}")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sh(script: &str) -> EngineInvocation {
        EngineInvocation::without_input(["-c", script])
    }

    #[tokio::test]
    async fn echo_round_trips_empty_input() {
        let runner = PipelineRunner::new("cat");
        let outcome = runner
            .run(EngineInvocation::without_input(Vec::<String>::new()))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.stdout.is_empty());
        assert!(outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn echo_round_trips_input_larger_than_a_pipe_buffer() {
        let input: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
        let runner = PipelineRunner::new("cat");
        let outcome = runner
            .run(EngineInvocation::new(
                Vec::<String>::new(),
                RawImage::from(input.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.stdout.len(), input.len());
        assert!(outcome.stdout == input);
    }

    #[tokio::test]
    async fn large_stderr_does_not_block_stdin() {
        // Copies stdin to stderr, so stderr fills while input is still arriving.
        let input = vec![b'x'; 1024 * 1024];
        let runner = PipelineRunner::new("sh");
        let outcome = runner
            .run(EngineInvocation::new(
                ["-c", "cat 1>&2"],
                RawImage::from(input.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.stdout.is_empty());
        assert_eq!(outcome.stderr.len(), input.len());
    }

    #[tokio::test]
    async fn reports_non_zero_exit_with_both_streams() {
        let runner = PipelineRunner::new("sh");
        let outcome = runner
            .run(sh("printf out; printf err 1>&2; exit 3"))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.stdout, b"out");
        assert_eq!(outcome.stderr, b"err");
    }

    #[tokio::test]
    async fn engine_ignoring_stdin_is_not_an_error() {
        let input = vec![0u8; 1024 * 1024];
        let runner = PipelineRunner::new("sh");
        let outcome = runner
            .run(EngineInvocation::new(
                ["-c", "printf done"],
                RawImage::from(input),
            ))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.stdout, b"done");
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let runner = PipelineRunner::new("/nonexistent/tessgate-engine");
        let result = runner.run(EngineInvocation::without_input(["--version"])).await;
        assert!(matches!(result, Err(TessgateError::Spawn(_))));
    }

    #[tokio::test]
    async fn timeout_covers_output_held_open_after_exit() {
        // The shell exits at once but its background child keeps stdout open.
        let runner = PipelineRunner::new("sh").with_timeout(Some(Duration::from_millis(300)));
        let started = std::time::Instant::now();
        let result = runner.run(sh("sleep 5 & printf x")).await;
        assert!(matches!(result, Err(TessgateError::EngineTimeout(_))));
        assert!(
            started.elapsed() < Duration::from_secs(3),
            "run took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn timeout_kills_a_hung_engine() {
        let runner = PipelineRunner::new("sleep").with_timeout(Some(Duration::from_millis(200)));
        let result = runner.run(EngineInvocation::without_input(["30"])).await;
        assert!(matches!(result, Err(TessgateError::EngineTimeout(_))));
    }
}
