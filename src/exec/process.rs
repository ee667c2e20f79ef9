// src/exec/process.rs

//! Leaf unit: a single external process.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::{PipejoinError, Result};
use crate::exec::abort::AbortSignal;
use crate::exec::stdio::Redirect;
use crate::exec::unit::{Executable, UnitFuture};

#[derive(Debug)]
enum ProcessState {
    Built,
    Running(Child),
    Exited,
}

/// One external process, driven through the [`Executable`] contract.
///
/// Stream bindings are held until `start`, then released as soon as the child
/// has been spawned so the parent does not keep pipe ends open on the child's
/// behalf.
#[derive(Debug)]
pub struct ProcessUnit {
    argv: Vec<String>,
    env: BTreeMap<String, String>,
    clear_env: bool,
    cwd: Option<PathBuf>,
    stdin: Redirect,
    stdout: Redirect,
    stderr: Redirect,
    abort: Option<AbortSignal>,
    state: ProcessState,
}

impl ProcessUnit {
    /// `argv[0]` is the program, looked up on `PATH` as usual.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            clear_env: false,
            cwd: None,
            stdin: Redirect::Inherit,
            stdout: Redirect::Inherit,
            stderr: Redirect::Inherit,
            abort: None,
            state: ProcessState::Built,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Start from an empty environment instead of inheriting the parent's.
    pub fn env_clear(mut self) -> Self {
        self.clear_env = true;
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }

    fn is_built(&self) -> bool {
        matches!(self.state, ProcessState::Built)
    }

    fn bind(&self, slot: &'static str, redirect: Redirect) -> Option<Redirect> {
        if self.is_built() {
            return Some(redirect);
        }
        warn!(
            program = %self.program(),
            slot,
            "ignoring stream binding on a unit that already started"
        );
        None
    }

    fn spawn(&mut self) -> Result<()> {
        if !self.is_built() {
            return Err(PipejoinError::AlreadyStarted {
                unit: self.describe(),
            });
        }

        let Some((program, args)) = self.argv.split_first() else {
            return Err(PipejoinError::Launch {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        if self.clear_env {
            cmd.env_clear();
        }
        cmd.envs(&self.env);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        // Moved out so our references die with `cmd` at the end of this call.
        let stdin = std::mem::take(&mut self.stdin);
        let stdout = std::mem::take(&mut self.stdout);
        let stderr = std::mem::take(&mut self.stderr);
        cmd.stdin(stdin.to_stdio().map_err(PipejoinError::Pipe)?)
            .stdout(stdout.to_stdio().map_err(PipejoinError::Pipe)?)
            .stderr(stderr.to_stdio().map_err(PipejoinError::Pipe)?)
            // Only fail-fast pipelines reap stages left behind by a failed start.
            .kill_on_drop(self.abort.is_some());

        let child = cmd.spawn().map_err(|source| PipejoinError::Launch {
            program: program.clone(),
            source,
        })?;

        debug!(program = %program, pid = ?child.id(), "stage process started");
        self.state = ProcessState::Running(child);
        Ok(())
    }

    async fn wait_for_exit(&mut self) -> Result<()> {
        let mut child = match std::mem::replace(&mut self.state, ProcessState::Exited) {
            ProcessState::Running(child) => child,
            ProcessState::Built => {
                self.state = ProcessState::Built;
                return Err(PipejoinError::NotStarted {
                    unit: self.describe(),
                });
            }
            ProcessState::Exited => {
                return Err(PipejoinError::AlreadyWaited {
                    unit: self.describe(),
                });
            }
        };
        let program = self.program().to_string();

        let status = match self.abort.clone() {
            None => child.wait().await?,
            Some(mut abort) => {
                tokio::select! {
                    biased;

                    status_res = child.wait() => status_res?,

                    _ = abort.triggered() => {
                        info!(program = %program, "abort requested; killing stage process");
                        if let Err(e) = child.kill().await {
                            warn!(
                                program = %program,
                                error = %e,
                                "failed to kill stage process on abort"
                            );
                        }
                        return Err(PipejoinError::Aborted { program });
                    }
                }
            }
        };

        exit_result(program, status)
    }
}

fn exit_result(program: String, status: ExitStatus) -> Result<()> {
    debug!(
        program = %program,
        exit_code = ?status.code(),
        success = status.success(),
        "stage process exited"
    );
    if status.success() {
        Ok(())
    } else {
        Err(PipejoinError::from_exit(program, status))
    }
}

impl Executable for ProcessUnit {
    fn set_stdin(&mut self, source: Redirect) {
        if let Some(source) = self.bind("stdin", source) {
            self.stdin = source;
        }
    }

    fn set_stdout(&mut self, sink: Redirect) {
        if let Some(sink) = self.bind("stdout", sink) {
            self.stdout = sink;
        }
    }

    fn set_stderr(&mut self, sink: Redirect) {
        if let Some(sink) = self.bind("stderr", sink) {
            self.stderr = sink;
        }
    }

    fn set_abort(&mut self, signal: AbortSignal) {
        self.abort = Some(signal);
    }

    fn start(&mut self) -> UnitFuture<'_> {
        Box::pin(async move { self.spawn() })
    }

    fn wait(&mut self) -> UnitFuture<'_> {
        Box::pin(async move {
            let res = self.wait_for_exit().await;
            if res.is_err() {
                if let Some(ref abort) = self.abort {
                    abort.trigger();
                }
            }
            res
        })
    }

    fn describe(&self) -> String {
        self.argv.join(" ")
    }
}
