use std::collections::HashMap;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::ExecError;

/// Default cap on captured stdout + stderr combined, in bytes.
pub const DEFAULT_MAX_OUTPUT: usize = 10 * 1024 * 1024;

/// One external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// `None` inherits the parent environment. `Some(map)` replaces it
    /// entirely; parent values are present only if the caller copied
    /// them into the map.
    pub env: Option<HashMap<String, String>>,
    /// Captured-output cap. Exceeding it fails the run with
    /// [`ExecError::OutputTooLarge`]. Defaults to [`DEFAULT_MAX_OUTPUT`].
    pub max_output: usize,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: None,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }

    /// Replace the child's environment with the given map.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }
}

/// Captured output of a successfully completed command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Which pipe a streamed line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// One line of live output from a streaming command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: StreamSource,
    pub text: String,
}

/// Abstraction over external command execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion, capturing stdout and stderr.
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ExecError>;

    /// Run a command, forwarding each output line as it arrives.
    ///
    /// Lines from stdout and stderr share one channel, each stream in
    /// arrival order; no ordering across the two streams is guaranteed.
    async fn run_streaming(
        &self,
        spec: CommandSpec,
        lines: UnboundedSender<OutputLine>,
    ) -> Result<(), ExecError>;
}

/// Real executor on tokio::process.
///
/// Children inherit the current working directory. Every output line is
/// mirrored to `tracing::trace!` as it arrives, in both modes.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ExecError> {
        let mut child = spawn(&spec)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (out, err) = tokio::join!(
            read_capped(stdout, spec.max_output, StreamSource::Stdout),
            read_capped(stderr, spec.max_output, StreamSource::Stderr),
        );
        let (out, err) = match (out, err) {
            (Ok(out), Ok(err)) => (out, err),
            (Err(e), _) | (_, Err(e)) => {
                let _ = child.kill().await;
                return Err(ExecError::OutputRead {
                    program: spec.program,
                    source: e,
                });
            }
        };
        if out.len() + err.len() > spec.max_output {
            let _ = child.kill().await;
            return Err(ExecError::OutputTooLarge {
                program: spec.program,
                limit: spec.max_output,
            });
        }

        let status = child.wait().await.map_err(|e| ExecError::OutputRead {
            program: spec.program.clone(),
            source: e,
        })?;

        let stderr = String::from_utf8_lossy(&err).into_owned();
        if status.success() {
            let stdout = String::from_utf8(out).map_err(|e| ExecError::InvalidUtf8 {
                program: spec.program,
                source: e,
            })?;
            Ok(CommandOutput { stdout, stderr })
        } else {
            Err(ExecError::CommandFailed {
                program: spec.program,
                args: spec.args,
                code: status.code(),
                stderr,
            })
        }
    }

    async fn run_streaming(
        &self,
        spec: CommandSpec,
        lines: UnboundedSender<OutputLine>,
    ) -> Result<(), ExecError> {
        let mut child = spawn(&spec)?;
        let stdout_task = spawn_line_reader(
            child.stdout.take(),
            StreamSource::Stdout,
            lines.clone(),
            false,
        );
        // stderr is kept around for the failure report
        let stderr_task = spawn_line_reader(child.stderr.take(), StreamSource::Stderr, lines, true);

        let status = child.wait().await.map_err(|e| ExecError::OutputRead {
            program: spec.program.clone(),
            source: e,
        })?;
        let _ = stdout_task.await;
        let stderr_lines = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                program: spec.program,
                args: spec.args,
                code: status.code(),
                stderr: stderr_lines.join("\n"),
            })
        }
    }
}

fn spawn(spec: &CommandSpec) -> Result<tokio::process::Child, ExecError> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(env) = &spec.env {
        command.env_clear().envs(env);
    }
    command.spawn().map_err(|e| ExecError::NotFound {
        program: spec.program.clone(),
        source: e,
    })
}

/// Read a pipe to EOF line by line, mirroring each line to `trace!`.
///
/// The reader is bounded at `limit + 1` bytes so a chatty child cannot
/// grow the buffer unchecked; the caller compares the combined total
/// against the limit once both pipes are drained.
async fn read_capped<R>(
    stream: Option<R>,
    limit: usize,
    source: StreamSource,
) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return Ok(Vec::new());
    };
    let mut reader = BufReader::new(stream.take(limit as u64 + 1));
    let mut buf = Vec::new();
    loop {
        let start = buf.len();
        let n = reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf[start..start + n]);
        tracing::trace!(stream = ?source, line = %line.trim_end());
    }
    Ok(buf)
}

/// Forward a pipe to the line channel, one event per reassembled line.
/// With `keep`, the lines are also returned for the failure report.
fn spawn_line_reader<R>(
    stream: Option<R>,
    source: StreamSource,
    lines: UnboundedSender<OutputLine>,
    keep: bool,
) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut kept = Vec::new();
        let Some(stream) = stream else {
            return kept;
        };
        let mut reader = BufReader::new(stream).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            tracing::trace!(stream = ?source, line = %line);
            if keep {
                kept.push(line.clone());
            }
            // A dropped receiver must not stop the drain; the child's
            // exit status is still awaited.
            let _ = lines.send(OutputLine { source, text: line });
        }
        kept
    })
}
