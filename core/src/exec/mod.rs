use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::{DEFAULT_TIMEOUT_SECS, ExecConfig};

/// Substituted for stdout when a successful command printed nothing.
pub const NO_OUTPUT: &str = "(no output)";

/// How long to keep reading after the shell exits while descendants still
/// hold its pipes open.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd";
#[cfg(windows)]
const SHELL_FLAG: &str = "/C";
#[cfg(not(windows))]
const DEFAULT_SHELL: &str = "sh";
#[cfg(not(windows))]
const SHELL_FLAG: &str = "-c";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitState {
    Exited { code: i32 },
    TimedOut,
    SpawnFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitState,
}

impl CommandOutcome {
    fn spawn_failed(message: String) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            status: ExitState::SpawnFailed { message },
        }
    }

    pub fn success(&self) -> bool {
        self.status == ExitState::Exited { code: 0 }
    }

    pub fn timed_out(&self) -> bool {
        self.status == ExitState::TimedOut
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            ExitState::Exited { code } => Some(code),
            _ => None,
        }
    }

    pub fn stdout_or_placeholder(&self) -> &str {
        if self.stdout.is_empty() {
            NO_OUTPUT
        } else {
            &self.stdout
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

struct Chunk {
    stream: Stream,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Capture {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Capture {
    fn push(&mut self, chunk: Chunk) {
        match chunk.stream {
            Stream::Stdout => self.stdout.extend_from_slice(&chunk.bytes),
            Stream::Stderr => self.stderr.extend_from_slice(&chunk.bytes),
        }
    }

    fn finish(self, status: ExitState) -> CommandOutcome {
        CommandOutcome {
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            status,
        }
    }
}

/// Runs shell command lines with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    shell: String,
    timeout: Duration,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CommandExecutor {
    pub fn new(config: &ExecConfig) -> Self {
        Self {
            shell: config
                .shell
                .clone()
                .unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `command` through the shell. Exactly one outcome is produced:
    /// natural exit, timeout, or failure to spawn.
    pub async fn execute(&self, command: &str) -> CommandOutcome {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(SHELL_FLAG)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(shell = %self.shell, "failed to spawn command: {e}");
                return CommandOutcome::spawn_failed(e.to_string());
            }
        };
        let pid = child.id();
        tracing::debug!(pid, command, "command started");

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            forward(stdout, Stream::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward(stderr, Stream::Stderr, tx);
        }

        let mut capture = Capture::default();
        let deadline = Instant::now() + self.timeout;

        let status = loop {
            tokio::select! {
                Some(chunk) = rx.recv() => capture.push(chunk),
                status = child.wait() => break status,
                () = tokio::time::sleep_until(deadline) => {
                    kill_group(pid);
                    if let Err(e) = child.kill().await {
                        tracing::debug!("kill after timeout: {e}");
                    }
                    while let Ok(chunk) = rx.try_recv() {
                        capture.push(chunk);
                    }
                    tracing::warn!(
                        timeout_secs = self.timeout.as_secs(),
                        command,
                        "command timed out"
                    );
                    return capture.finish(ExitState::TimedOut);
                }
            }
        };

        // Descendants may still hold the pipes open after the shell exits.
        let drain_until = deadline.min(Instant::now() + DRAIN_GRACE);
        loop {
            match tokio::time::timeout_at(drain_until, rx.recv()).await {
                Ok(Some(chunk)) => capture.push(chunk),
                Ok(None) => break,
                Err(_) => {
                    tracing::debug!(pid, "output pipes still open after exit");
                    kill_group(pid);
                    break;
                }
            }
        }

        let code = match status {
            Ok(status) => exit_code(status),
            Err(e) => {
                tracing::warn!("failed to wait for command: {e}");
                -1
            }
        };
        tracing::debug!(pid, code, "command finished");

        capture.finish(ExitState::Exited { code })
    }
}

fn forward<R>(mut reader: R, stream: Stream, tx: mpsc::UnboundedSender<Chunk>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 8192];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    let chunk = Chunk {
                        stream,
                        bytes: buf[..n].to_vec(),
                    };
                    if tx.send(chunk).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(?stream, "read failed: {e}");
                    break;
                }
            }
        }
    });
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal. The group was created at spawn via
    // process_group(0), so its id equals the shell's pid.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(pgid, "killpg: {}", std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn executor() -> CommandExecutor {
        CommandExecutor::default().with_timeout(Duration::from_secs(30))
    }

    #[tokio::test]
    async fn captures_stdout() {
        let outcome = executor().execute("echo hello").await;
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "hello\n");
        assert!(outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn silent_success_uses_placeholder() {
        let outcome = executor().execute("exit 0").await;
        assert!(outcome.success());
        assert_eq!(outcome.stdout_or_placeholder(), NO_OUTPUT);
    }

    #[tokio::test]
    async fn non_zero_exit_carries_code_and_streams() {
        let outcome = executor()
            .execute("echo out; echo err >&2; exit 7")
            .await;
        assert_eq!(outcome.status, ExitState::Exited { code: 7 });
        assert_eq!(outcome.exit_code(), Some(7));
        assert_eq!(outcome.stdout, "out\n");
        assert_eq!(outcome.stderr, "err\n");
    }

    #[tokio::test]
    async fn unknown_command_is_a_shell_failure_not_spawn_error() {
        let outcome = executor().execute("skillbox-no-such-command-xyz").await;
        assert_eq!(outcome.exit_code(), Some(127));
        assert!(!outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn missing_shell_is_spawn_failure() {
        let outcome = executor()
            .with_shell("/nonexistent/skillbox-shell")
            .execute("true")
            .await;
        assert!(matches!(outcome.status, ExitState::SpawnFailed { .. }));
        assert!(!outcome.timed_out());
    }

    #[tokio::test]
    async fn timeout_keeps_partial_output() {
        let started = std::time::Instant::now();
        let outcome = CommandExecutor::default()
            .with_timeout(Duration::from_millis(500))
            .execute("echo partial; sleep 30")
            .await;

        assert!(outcome.timed_out());
        assert_eq!(outcome.stdout, "partial\n");
        assert!(outcome.exit_code().is_none());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn timeout_kills_background_descendants() {
        let started = std::time::Instant::now();
        let outcome = CommandExecutor::default()
            .with_timeout(Duration::from_millis(300))
            .execute("sleep 30 & sleep 30; wait")
            .await;

        assert!(outcome.timed_out());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn background_child_does_not_hold_result_until_deadline() {
        let started = std::time::Instant::now();
        let outcome = executor().execute("sleep 30 & echo done").await;

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "done\n");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn stdin_is_not_connected() {
        let outcome = executor().execute("cat").await;
        assert!(outcome.success());
        assert!(outcome.stdout.is_empty());
    }

    #[tokio::test]
    async fn environment_is_inherited() {
        let outcome = executor().execute("printf %s \"$PATH\"").await;
        assert_eq!(outcome.stdout, std::env::var("PATH").unwrap_or_default());
    }

    #[tokio::test]
    async fn large_output_is_not_truncated() {
        let outcome = executor().execute("seq 1 20000").await;
        assert!(outcome.success());
        assert_eq!(outcome.stdout.lines().count(), 20000);
        assert!(outcome.stdout.ends_with("20000\n"));
    }

    #[test]
    fn config_sets_shell_and_timeout() {
        let executor = CommandExecutor::new(&ExecConfig {
            timeout_secs: 3,
            shell: Some("bash".into()),
        });
        assert_eq!(executor.timeout(), Duration::from_secs(3));
        assert_eq!(executor.shell, "bash");
    }
}
