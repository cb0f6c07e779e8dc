//! The [`CommandRunner`] seam and its tokio-backed implementation.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::group::ProcessGroup;
use crate::invocation::{CommandOutput, Invocation, join_streams};

/// Runs external programs.
///
/// Implementations must return promptly once `deadline` expires or its
/// cancel token fires, terminating the process they started along with
/// everything it spawned.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation, deadline: &Deadline) -> Result<CommandOutput>;
}

/// How long to wait for a killed process and its pipes before giving up.
const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(500);

/// Runs programs as real subprocesses via `tokio::process`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    kill_grace: Duration,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self {
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

enum Ending {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation, deadline: &Deadline) -> Result<CommandOutput> {
        let program = invocation.program.clone();
        if deadline.is_cancelled() {
            return Err(Error::Cancelled {
                program,
                output: String::new(),
            });
        }
        if deadline.is_expired() {
            return Err(Error::TimedOut {
                program,
                after: deadline.timeout(),
                output: String::new(),
            });
        }

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %invocation, cwd = ?invocation.cwd, "Spawning process");
        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;
        let group = ProcessGroup::new(child.id());

        let stdout = Reader::spawn(child.stdout.take());
        let stderr = Reader::spawn(child.stderr.take());

        let ending = tokio::select! {
            status = child.wait() => Ending::Exited(status),
            _ = deadline.expired() => Ending::TimedOut,
            _ = deadline.cancelled() => Ending::Cancelled,
        };

        match ending {
            Ending::Exited(status) => {
                group.disarm();
                let status = status.map_err(|source| Error::Spawn {
                    program: program.clone(),
                    source,
                })?;
                let grace = deadline.remaining().max(self.kill_grace);
                let (stdout, stderr) = drain(stdout, stderr, grace).await;
                Ok(CommandOutput {
                    status: status.code(),
                    stdout,
                    stderr,
                })
            }
            Ending::TimedOut | Ending::Cancelled => {
                group.terminate();
                if tokio::time::timeout(self.kill_grace, child.wait()).await.is_err() {
                    if let Err(e) = child.start_kill() {
                        tracing::debug!(command = %invocation, error = %e, "Kill failed; process may have exited");
                    }
                    let _ = tokio::time::timeout(self.kill_grace, child.wait()).await;
                }
                // Grandchildren that ignored SIGTERM still hold the pipes open.
                group.kill();
                group.disarm();
                let (stdout, stderr) = drain(stdout, stderr, self.kill_grace).await;
                let output = join_streams(&stdout, &stderr);
                if matches!(ending, Ending::TimedOut) {
                    tracing::warn!(command = %invocation, timeout = ?deadline.timeout(), "Process timed out");
                    Err(Error::TimedOut {
                        program,
                        after: deadline.timeout(),
                        output,
                    })
                } else {
                    tracing::warn!(command = %invocation, "Process cancelled");
                    Err(Error::Cancelled { program, output })
                }
            }
        }
    }
}

/// Background task copying one pipe into a shared buffer.
///
/// The buffer is readable at any time, so output captured before a kill is
/// not lost when the task has to be abandoned.
struct Reader {
    buffer: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl Reader {
    fn spawn<R>(stream: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::default();
        let sink = Arc::clone(&buffer);
        let handle = tokio::spawn(async move {
            let Some(mut stream) = stream else {
                return;
            };
            let mut chunk = [0u8; 8192];
            loop {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .extend_from_slice(&chunk[..n]),
                }
            }
        });
        Self { buffer, handle }
    }

    fn snapshot(&self) -> String {
        let bytes = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

async fn drain(mut stdout: Reader, mut stderr: Reader, grace: Duration) -> (String, String) {
    let _ = tokio::time::timeout(grace, async {
        let _ = (&mut stdout.handle).await;
        let _ = (&mut stderr.handle).await;
    })
    .await;
    stdout.handle.abort();
    stderr.handle.abort();
    (stdout.snapshot(), stderr.snapshot())
}
