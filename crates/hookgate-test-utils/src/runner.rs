//! [`ScriptedRunner`]: a fake `CommandRunner` with canned replies.
//!
//! Rules match on program name plus an argument prefix and are tried in
//! registration order. Unmatched invocations behave like a missing binary.
//! Every call is recorded so tests can assert how many subprocesses a code
//! path would have started.

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hookgate_exec::{CommandOutput, CommandRunner, Deadline, Error, Invocation, Result};

/// What a matched invocation produces.
#[derive(Debug, Clone)]
pub enum Reply {
    Output(CommandOutput),
    SpawnError(io::ErrorKind),
    /// Report a timeout immediately, with the given partial output.
    TimedOut(String),
    /// Block until the deadline expires or the run is cancelled.
    Hang,
    /// Sleep, then produce the inner reply.
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Self::Output(CommandOutput::new(0, stdout, ""))
    }

    pub fn exit(code: i32, stdout: &str, stderr: &str) -> Self {
        Self::Output(CommandOutput::new(code, stdout, stderr))
    }

    pub fn not_found() -> Self {
        Self::SpawnError(io::ErrorKind::NotFound)
    }

    pub fn delayed(delay: Duration, reply: Reply) -> Self {
        Self::Delayed(delay, Box::new(reply))
    }
}

struct Rule {
    program: String,
    args_prefix: Vec<String>,
    reply: Reply,
}

impl Rule {
    fn matches(&self, invocation: &Invocation) -> bool {
        invocation.program == self.program
            && invocation.args.len() >= self.args_prefix.len()
            && invocation
                .args
                .iter()
                .zip(&self.args_prefix)
                .all(|(actual, expected)| actual == expected)
    }
}

#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Earlier rules win.
    pub fn on<I, S>(mut self, program: &str, args_prefix: I, reply: Reply) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(Rule {
            program: program.to_string(),
            args_prefix: args_prefix.into_iter().map(Into::into).collect(),
            reply,
        });
        self
    }

    /// Answer `git rev-parse --show-toplevel` with `root`.
    pub fn with_git_root(self, root: &std::path::Path) -> Self {
        let stdout = format!("{}\n", root.display());
        self.on("git", ["rev-parse", "--show-toplevel"], Reply::ok(&stdout))
    }

    /// Every invocation seen so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls to `program` whose args start with `args_prefix`.
    pub fn count(&self, program: &str, args_prefix: &[&str]) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| {
                inv.program == program
                    && inv.args.len() >= args_prefix.len()
                    && inv.args.iter().zip(args_prefix).all(|(a, e)| a == e)
            })
            .count()
    }

    async fn respond(invocation: &Invocation, reply: Reply, deadline: &Deadline) -> Result<CommandOutput> {
        let program = invocation.program.clone();
        match reply {
            Reply::Output(output) => Ok(output),
            Reply::SpawnError(kind) => Err(Error::Spawn {
                program,
                source: io::Error::from(kind),
            }),
            Reply::TimedOut(output) => Err(Error::TimedOut {
                program,
                after: deadline.timeout(),
                output,
            }),
            Reply::Hang => {
                tokio::select! {
                    _ = deadline.expired() => Err(Error::TimedOut {
                        program,
                        after: deadline.timeout(),
                        output: String::new(),
                    }),
                    _ = deadline.cancelled() => Err(Error::Cancelled {
                        program,
                        output: String::new(),
                    }),
                }
            }
            Reply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                Box::pin(Self::respond(invocation, *inner, deadline)).await
            }
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation, deadline: &Deadline) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let reply = self
            .rules
            .iter()
            .find(|rule| rule.matches(invocation))
            .map(|rule| rule.reply.clone())
            .unwrap_or_else(Reply::not_found);
        Self::respond(invocation, reply, deadline).await
    }
}
