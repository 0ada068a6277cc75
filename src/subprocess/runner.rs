use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use super::error::ProcessError;

/// A fully configured subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    /// Program and arguments joined by spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Command line prefixed with the environment overrides as `NAME='value'` pairs
    pub fn command_line_with_env(&self) -> String {
        if self.env.is_empty() {
            return self.command_line();
        }

        let mut vars: Vec<_> = self.env.iter().collect();
        vars.sort();
        let vars = vars
            .into_iter()
            .map(|(name, value)| format!("{}='{}'", name, value))
            .collect::<Vec<_>>()
            .join(" ");

        format!("{} {}", vars, self.command_line())
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

pub type ProcessStreamItem = Result<String, ProcessError>;
pub type ProcessStreamFut = Pin<Box<dyn Stream<Item = ProcessStreamItem> + Send>>;
pub type ProcessStatusFut =
    Pin<Box<dyn futures::Future<Output = Result<ExitStatus, ProcessError>> + Send>>;

/// Which pipe a line of output was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Stdout,
    Stderr,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Stdout => write!(f, "out"),
            OutputKind::Stderr => write!(f, "err"),
        }
    }
}

/// Line streams of a running process plus a future resolving to its exit status
///
/// The status future only covers the direct child. Use [`drain`](Self::drain) to bound the
/// whole run, pipes included, by the command's timeout.
pub struct ProcessStream {
    pub stdout: ProcessStreamFut,
    pub stderr: ProcessStreamFut,
    pub status: ProcessStatusFut,
    /// Process group leader killed when the deadline passes
    pub pid: Option<u32>,
    pub timeout: Option<Duration>,
    pub started: tokio::time::Instant,
    pub command_line: String,
}

impl ProcessStream {
    /// Relay every line to `on_line` in arrival order and return the exit status
    ///
    /// A read error ends only the affected pipe; the other one is still drained. Output
    /// still open when the timeout elapses, e.g. held by a background grandchild, counts
    /// as a timeout and the process group is killed.
    pub async fn drain<F>(self, mut on_line: F) -> Result<ExitStatus, ProcessError>
    where
        F: FnMut(OutputKind, String) + Send,
    {
        let ProcessStream {
            stdout,
            stderr,
            status,
            pid,
            timeout,
            started,
            command_line,
        } = self;

        let stdout = stdout.map(|line| (OutputKind::Stdout, line));
        let stderr = stderr.map(|line| (OutputKind::Stderr, line));
        let mut output = futures::stream::select(stdout, stderr);

        let relay = async {
            while let Some((kind, line)) = output.next().await {
                match line {
                    Ok(line) => on_line(kind, line),
                    Err(e) => {
                        tracing::warn!("Failed to read std{} of {}: {}", kind, command_line, e)
                    }
                }
            }
        };
        let run = async { tokio::join!(relay, status).1 };

        let Some(limit) = timeout else {
            return run.await;
        };

        let result = tokio::time::timeout_at(started + limit, run).await;
        match result {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(
                    "Subprocess output still open after {:?}: {}",
                    limit,
                    command_line
                );
                TokioProcessRunner::kill_process_group(pid);
                Err(ProcessError::Timeout {
                    command: command_line,
                    timeout: limit,
                })
            }
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
    async fn run_streaming(&self, command: ProcessCommand) -> Result<ProcessStream, ProcessError>;
}

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Strip the line terminator and decode, replacing invalid UTF-8
    fn normalize_line(line: &[u8]) -> String {
        let line = match line.strip_suffix(b"\n") {
            Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
            None => line,
        };
        String::from_utf8_lossy(line).into_owned()
    }

    /// Create a line stream from a buffered reader
    fn create_line_stream<R>(reader: tokio::io::BufReader<R>) -> ProcessStreamFut
    where
        R: tokio::io::AsyncRead + Send + Unpin + 'static,
    {
        use tokio::io::AsyncBufReadExt;

        // The reader is dropped after the first error, ending the stream
        Box::pin(futures::stream::unfold(Some(reader), |reader| async move {
            let mut reader = reader?;
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => None, // EOF
                Ok(_) => Some((Ok(Self::normalize_line(&line)), Some(reader))),
                Err(e) => Some((Err(ProcessError::Io(e)), None)),
            }
        })) as ProcessStreamFut
    }

    /// Log command execution details
    fn log_command_start(command: &ProcessCommand) {
        tracing::debug!("Executing: {}", command.command_line_with_env());

        if let Some(ref dir) = command.working_dir {
            tracing::trace!("Working directory: {:?}", dir);
        }

        if let Some(timeout) = command.timeout {
            tracing::trace!("Timeout: {:?}", timeout);
        }
    }

    /// Configure the command with environment and working directory
    fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);

        // Own process group so a timeout can take down everything the tool spawned
        #[cfg(unix)]
        {
            cmd.process_group(0);
        }

        cmd.args(&command.args);

        // Overrides are layered on top of the inherited environment
        cmd.envs(&command.env);

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    /// Spawn the configured process
    fn spawn(command: &ProcessCommand) -> Result<tokio::process::Child, ProcessError> {
        Self::configure_command(command).spawn().map_err(|e| {
            tracing::error!(
                "Failed to spawn '{}': {:?} (kind: {:?})",
                command.program,
                e,
                e.kind()
            );

            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessError::CommandNotFound(command.program.clone())
            } else {
                ProcessError::SpawnFailed {
                    command: command.command_line(),
                    source: e,
                }
            }
        })
    }

    /// Kill the whole process group of a timed out child
    #[cfg(unix)]
    fn kill_process_group(pid: Option<u32>) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::debug!("killpg({}) failed: {}", pid, e);
            }
        }
    }

    #[cfg(not(unix))]
    fn kill_process_group(_pid: Option<u32>) {}

    /// Convert process exit status to our ExitStatus enum
    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    /// Parse signal status on Unix systems
    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            ExitStatus::Signal(signal)
        } else {
            ExitStatus::Error(1)
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    /// Wait for a child to exit, killing it once the timeout elapses
    async fn wait_with_deadline(
        mut child: tokio::process::Child,
        timeout: Option<Duration>,
        command_line: String,
    ) -> Result<ExitStatus, ProcessError> {
        let Some(duration) = timeout else {
            let status = child.wait().await?;
            return Ok(Self::parse_exit_status(status));
        };

        let pid = child.id();
        match tokio::time::timeout(duration, child.wait()).await {
            Ok(status) => Ok(Self::parse_exit_status(status?)),
            Err(_) => {
                tracing::warn!("Subprocess timed out after {:?}: {}", duration, command_line);
                Self::kill_process_group(pid);
                let _ = child.kill().await;
                Err(ProcessError::Timeout {
                    command: command_line,
                    timeout: duration,
                })
            }
        }
    }

    /// Log the process execution result
    fn log_result(result: &ProcessOutput, command: &ProcessCommand) {
        let command_str = command.command_line();

        match &result.status {
            ExitStatus::Success => {
                tracing::debug!(
                    "Subprocess completed successfully in {:?}: {}",
                    result.duration,
                    command_str
                );
                tracing::trace!("Stdout length: {} bytes", result.stdout.len());
            }
            ExitStatus::Error(code) => {
                tracing::debug!(
                    "Subprocess failed with exit code {} in {:?}: {}",
                    code,
                    result.duration,
                    command_str
                );
                if !result.stderr.is_empty() {
                    tracing::trace!("Stderr: {}", result.stderr);
                }
            }
            ExitStatus::Signal(signal) => {
                tracing::warn!(
                    "Subprocess terminated by signal {} in {:?}: {}",
                    signal,
                    result.duration,
                    command_str
                );
            }
        }
    }

    /// Extract a stream from a child process, converting None to error
    fn extract_stream<T>(stream: Option<T>, stream_name: &str) -> Result<T, ProcessError> {
        stream.ok_or_else(|| ProcessError::InternalError {
            message: format!("Failed to capture {}", stream_name),
        })
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let start = std::time::Instant::now();

        Self::log_command_start(&command);

        let child = Self::spawn(&command)?;
        let pid = child.id();

        let output = match command.timeout {
            Some(duration) => {
                match tokio::time::timeout(duration, child.wait_with_output()).await {
                    Ok(result) => result?,
                    Err(_) => {
                        tracing::warn!(
                            "Subprocess timed out after {:?}: {}",
                            duration,
                            command.command_line()
                        );
                        Self::kill_process_group(pid);
                        return Err(ProcessError::Timeout {
                            command: command.command_line(),
                            timeout: duration,
                        });
                    }
                }
            }
            None => child.wait_with_output().await?,
        };

        let result = ProcessOutput {
            status: Self::parse_exit_status(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration: start.elapsed(),
        };

        Self::log_result(&result, &command);

        Ok(result)
    }

    async fn run_streaming(&self, command: ProcessCommand) -> Result<ProcessStream, ProcessError> {
        use tokio::io::BufReader;

        Self::log_command_start(&command);

        let started = tokio::time::Instant::now();
        let mut child = Self::spawn(&command)?;
        let pid = child.id();

        let stdout = Self::extract_stream(child.stdout.take(), "stdout")?;
        let stderr = Self::extract_stream(child.stderr.take(), "stderr")?;

        Ok(ProcessStream {
            stdout: Self::create_line_stream(BufReader::new(stdout)),
            stderr: Self::create_line_stream(BufReader::new(stderr)),
            status: Box::pin(Self::wait_with_deadline(
                child,
                command.timeout,
                command.command_line(),
            )),
            pid,
            timeout: command.timeout,
            started,
            command_line: command.command_line(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_command() -> ProcessCommand {
        ProcessCommand {
            program: "ansible-playbook".to_string(),
            args: vec!["site.yml".to_string(), "--check".to_string()],
            env: HashMap::new(),
            working_dir: None,
            timeout: None,
        }
    }

    #[test]
    fn test_command_line() {
        assert_eq!(test_command().command_line(), "ansible-playbook site.yml --check");
    }

    #[test]
    fn test_command_line_with_env_sorted() {
        let mut command = test_command();
        command
            .env
            .insert("ANSIBLE_STDOUT_CALLBACK".to_string(), "json".to_string());
        command
            .env
            .insert("ANSIBLE_NOCOWS".to_string(), "1".to_string());

        assert_eq!(
            command.command_line_with_env(),
            "ANSIBLE_NOCOWS='1' ANSIBLE_STDOUT_CALLBACK='json' ansible-playbook site.yml --check"
        );
    }

    #[test]
    fn test_extract_stream_with_none() {
        let value: Option<i32> = None;
        let result = TokioProcessRunner::extract_stream(value, "test_stream");
        match result {
            Err(ProcessError::InternalError { message }) => {
                assert_eq!(message, "Failed to capture test_stream");
            }
            other => panic!("Expected InternalError, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_line() {
        assert_eq!(TokioProcessRunner::normalize_line(b"test\n"), "test");
        assert_eq!(TokioProcessRunner::normalize_line(b"test\r\n"), "test");
        assert_eq!(TokioProcessRunner::normalize_line(b"test"), "test");
        assert_eq!(TokioProcessRunner::normalize_line(b""), "");
        assert_eq!(TokioProcessRunner::normalize_line(b"caf\xe9\n"), "caf\u{FFFD}");
    }

    #[test]
    #[cfg(unix)]
    fn test_parse_exit_status() {
        use std::os::unix::process::ExitStatusExt;

        let status = std::process::ExitStatus::from_raw(0);
        assert_eq!(TokioProcessRunner::parse_exit_status(status), ExitStatus::Success);

        // Exit code 1
        let status = std::process::ExitStatus::from_raw(256);
        assert_eq!(TokioProcessRunner::parse_exit_status(status), ExitStatus::Error(1));

        // SIGKILL
        let status = std::process::ExitStatus::from_raw(9);
        assert_eq!(TokioProcessRunner::parse_exit_status(status), ExitStatus::Signal(9));
    }

    #[test]
    fn test_exit_status_code() {
        assert_eq!(ExitStatus::Success.code(), Some(0));
        assert_eq!(ExitStatus::Error(2).code(), Some(2));
        assert_eq!(ExitStatus::Signal(9).code(), None);
        assert!(!ExitStatus::Error(2).success());
    }
}
