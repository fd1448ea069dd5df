//! External command execution
//!
//! Every invocation is an argv (no shell) bounded by a timeout. A runner
//! can optionally memoize results for read-only queries; the cache lives in
//! the runner value itself, so two runners never share results.

use std::collections::HashMap;
use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::{Error, Result};

/// Default bound for a single command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default size of the parallel worker pool.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

type Cache = Arc<Mutex<HashMap<CommandSpec, CommandOutput>>>;

/// Runs external commands with timeouts and an optional result cache.
///
/// Cloning a runner shares its cache.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
    cache: Option<Cache>,
}

impl CommandRunner {
    /// A runner that memoizes results.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cache: Some(Cache::default()),
        }
    }

    /// A runner that always executes.
    pub fn uncached(timeout: Duration) -> Self {
        Self {
            timeout,
            cache: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `spec` with the default timeout, serving repeated calls from the cache.
    pub async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.lock().await.get(spec)
        {
            tracing::debug!(command = %spec, "Using cached result");
            return Ok(hit.clone());
        }

        let output = execute(spec, self.timeout).await?;

        if let Some(cache) = &self.cache {
            cache.lock().await.insert(spec.clone(), output.clone());
        }
        Ok(output)
    }

    /// Run `spec` with an explicit timeout, bypassing the cache.
    ///
    /// Used for commands that change system state, whose results must
    /// never be replayed.
    pub async fn run_fresh(&self, spec: &CommandSpec, timeout: Duration) -> Result<CommandOutput> {
        execute(spec, timeout).await
    }

    /// Run `spec` fresh and turn a non-zero exit into [`Error::CommandFailed`].
    pub async fn run_checked(&self, spec: &CommandSpec, timeout: Duration) -> Result<CommandOutput> {
        let output = self.run_fresh(spec, timeout).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(Error::CommandFailed {
                command: spec.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    /// Run every command on a pool of at most `max_workers` concurrent tasks.
    ///
    /// Results come back in input order. A failing or timed-out command
    /// yields an `Err` in its own slot and never affects its siblings.
    pub async fn run_parallel(&self, commands: Vec<CommandSpec>, max_workers: usize) -> Vec<Result<CommandOutput>> {
        let permits = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut tasks = JoinSet::new();

        for (index, spec) in commands.iter().cloned().enumerate() {
            let runner = self.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => runner.run(&spec).await,
                    Err(e) => Err(Error::TaskFailed {
                        command: spec.to_string(),
                        message: e.to_string(),
                    }),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<CommandOutput>>> = commands.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Command worker aborted"),
            }
        }

        slots
            .into_iter()
            .zip(commands)
            .map(|(slot, spec)| {
                slot.unwrap_or_else(|| {
                    Err(Error::TaskFailed {
                        command: spec.to_string(),
                        message: "worker aborted".to_string(),
                    })
                })
            })
            .collect()
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

async fn execute(spec: &CommandSpec, timeout: Duration) -> Result<CommandOutput> {
    tracing::debug!(command = %spec, ?timeout, "Executing");

    let child = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => Error::CommandNotFound {
                command: spec.to_string(),
            },
            _ => Error::Spawn {
                command: spec.to_string(),
                source,
            },
        })?;

    // Dropping the wait future on timeout drops the child, which kills it
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output.into()),
        Ok(Err(source)) => Err(Error::Spawn {
            command: spec.to_string(),
            source,
        }),
        Err(_) => {
            tracing::warn!(command = %spec, ?timeout, "Command timed out");
            Err(Error::Timeout {
                command: spec.to_string(),
                timeout,
            })
        }
    }
}
