//! Process-free units that record how they were driven.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pipejoin::errors::{ExitFailure, PipejoinError};
use pipejoin::exec::{AbortSignal, BoxedUnit, Executable, Redirect, UnitFuture};

/// Which kind of redirect a unit was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    Inherit,
    Null,
    Fd,
}

impl From<&Redirect> for RedirectKind {
    fn from(redirect: &Redirect) -> Self {
        match redirect {
            Redirect::Inherit => RedirectKind::Inherit,
            Redirect::Null => RedirectKind::Null,
            Redirect::Fd(_) => RedirectKind::Fd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitEvent {
    Stdin { unit: String, kind: RedirectKind },
    Stdout { unit: String, kind: RedirectKind },
    Stderr { unit: String, kind: RedirectKind },
    Abort { unit: String },
    Start { unit: String },
    WaitCalled { unit: String },
    WaitReturned { unit: String, ok: bool, at: Instant },
}

impl UnitEvent {
    pub fn unit(&self) -> &str {
        match self {
            UnitEvent::Stdin { unit, .. }
            | UnitEvent::Stdout { unit, .. }
            | UnitEvent::Stderr { unit, .. }
            | UnitEvent::Abort { unit }
            | UnitEvent::Start { unit }
            | UnitEvent::WaitCalled { unit }
            | UnitEvent::WaitReturned { unit, .. } => unit,
        }
    }
}

/// Shared, ordered record of unit events.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<UnitEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: UnitEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<UnitEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Events belonging to `unit`, in order.
    pub fn for_unit(&self, unit: &str) -> Vec<UnitEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.unit() == unit)
            .collect()
    }

    pub fn wait_returned_at(&self, unit: &str) -> Option<Instant> {
        self.events().into_iter().find_map(|e| match e {
            UnitEvent::WaitReturned { unit: u, at, .. } if u == unit => Some(at),
            _ => None,
        })
    }
}

/// A fake leaf whose start/wait behaviour is scripted.
///
/// Like a real process, it lets go of its stream bindings when it starts.
pub struct ScriptedUnit {
    name: String,
    log: EventLog,
    fail_start: bool,
    wait_delay: Duration,
    exit_code: Option<i32>,
    bindings: Vec<Redirect>,
}

impl ScriptedUnit {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            fail_start: false,
            wait_delay: Duration::ZERO,
            exit_code: None,
            bindings: Vec::new(),
        }
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn wait_delay(mut self, delay: Duration) -> Self {
        self.wait_delay = delay;
        self
    }

    /// Make `wait` fail as if the process exited with `code`.
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn boxed(self) -> BoxedUnit {
        Box::new(self)
    }
}

impl Executable for ScriptedUnit {
    fn set_stdin(&mut self, source: Redirect) {
        self.log.push(UnitEvent::Stdin {
            unit: self.name.clone(),
            kind: RedirectKind::from(&source),
        });
        self.bindings.push(source);
    }

    fn set_stdout(&mut self, sink: Redirect) {
        self.log.push(UnitEvent::Stdout {
            unit: self.name.clone(),
            kind: RedirectKind::from(&sink),
        });
        self.bindings.push(sink);
    }

    fn set_stderr(&mut self, sink: Redirect) {
        self.log.push(UnitEvent::Stderr {
            unit: self.name.clone(),
            kind: RedirectKind::from(&sink),
        });
        self.bindings.push(sink);
    }

    fn set_abort(&mut self, _signal: AbortSignal) {
        self.log.push(UnitEvent::Abort {
            unit: self.name.clone(),
        });
    }

    fn start(&mut self) -> UnitFuture<'_> {
        Box::pin(async move {
            self.log.push(UnitEvent::Start {
                unit: self.name.clone(),
            });
            self.bindings.clear();
            if self.fail_start {
                return Err(PipejoinError::Launch {
                    program: self.name.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "scripted launch failure",
                    ),
                });
            }
            Ok(())
        })
    }

    fn wait(&mut self) -> UnitFuture<'_> {
        Box::pin(async move {
            self.log.push(UnitEvent::WaitCalled {
                unit: self.name.clone(),
            });
            tokio::time::sleep(self.wait_delay).await;
            let res = match self.exit_code {
                None => Ok(()),
                Some(code) => Err(PipejoinError::Runtime {
                    program: self.name.clone(),
                    exit: ExitFailure {
                        code: Some(code),
                        signal: None,
                    },
                }),
            };
            self.log.push(UnitEvent::WaitReturned {
                unit: self.name.clone(),
                ok: res.is_ok(),
                at: Instant::now(),
            });
            res
        })
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Wraps any unit and records when its `wait` returns.
pub struct RecordedUnit {
    name: String,
    log: EventLog,
    inner: BoxedUnit,
}

impl RecordedUnit {
    pub fn wrap(name: &str, log: &EventLog, inner: impl Executable + 'static) -> BoxedUnit {
        Box::new(Self {
            name: name.to_string(),
            log: log.clone(),
            inner: Box::new(inner),
        })
    }
}

impl Executable for RecordedUnit {
    fn set_stdin(&mut self, source: Redirect) {
        self.inner.set_stdin(source);
    }

    fn set_stdout(&mut self, sink: Redirect) {
        self.inner.set_stdout(sink);
    }

    fn set_stderr(&mut self, sink: Redirect) {
        self.inner.set_stderr(sink);
    }

    fn set_abort(&mut self, signal: AbortSignal) {
        self.inner.set_abort(signal);
    }

    fn start(&mut self) -> UnitFuture<'_> {
        Box::pin(async move {
            self.log.push(UnitEvent::Start {
                unit: self.name.clone(),
            });
            self.inner.start().await
        })
    }

    fn wait(&mut self) -> UnitFuture<'_> {
        Box::pin(async move {
            self.log.push(UnitEvent::WaitCalled {
                unit: self.name.clone(),
            });
            let res = self.inner.wait().await;
            self.log.push(UnitEvent::WaitReturned {
                unit: self.name.clone(),
                ok: res.is_ok(),
                at: Instant::now(),
            });
            res
        })
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
