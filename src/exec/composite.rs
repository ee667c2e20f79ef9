// src/exec/composite.rs

//! Two units joined by a pipe, and the `join` builder that creates them.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use crate::errors::Result;
use crate::exec::abort::AbortSignal;
use crate::exec::pipe::Pipe;
use crate::exec::stdio::Redirect;
use crate::exec::unit::{BoxedUnit, Executable, UnitFuture};

/// `left | right`.
///
/// Built only through [`join`]. The left side's stdout and the right side's
/// stdin are wired to the pipe at construction; externally, stdin reaches the
/// leftmost leaf, stdout the rightmost leaf, and stderr every leaf.
///
/// The parent's copy of the pipe's write end lives here and nowhere else. It
/// is closed exactly once, right after the left side's `wait` returns, so the
/// right side sees EOF only after the left side has finished writing.
pub struct PipedUnits {
    left: BoxedUnit,
    right: BoxedUnit,
    writer: Option<Redirect>,
}

impl PipedUnits {
    fn connect(mut left: BoxedUnit, mut right: BoxedUnit) -> Result<Self> {
        let Pipe { reader, writer } = Pipe::new()?;

        left.set_stdout(writer.clone());
        right.set_stdin(reader);

        Ok(Self {
            left,
            right,
            writer: Some(writer),
        })
    }
}

/// Connect `left`'s stdout to `right`'s stdin.
///
/// `None` is the identity: `join(None, x)` and `join(x, None)` return `x`
/// unchanged. Must be called before either operand starts.
pub fn join(left: Option<BoxedUnit>, right: Option<BoxedUnit>) -> Result<Option<BoxedUnit>> {
    match (left, right) {
        (None, right) => Ok(right),
        (left, None) => Ok(left),
        (Some(left), Some(right)) => {
            let piped = PipedUnits::connect(left, right)?;
            debug!(unit = %piped.describe(), "joined units with a pipe");
            let unit: BoxedUnit = Box::new(piped);
            Ok(Some(unit))
        }
    }
}

/// Left fold of [`join`] over `units`: `join(join(a, b), c)` and so on.
///
/// Returns `None` for an empty iterator.
pub fn join_all<I>(units: I) -> Result<Option<BoxedUnit>>
where
    I: IntoIterator<Item = BoxedUnit>,
{
    units
        .into_iter()
        .try_fold(None, |acc, unit| join(acc, Some(unit)))
}

/// Hands out completion tickets to the two sides of a join point.
#[derive(Debug, Default)]
struct FinishOrder(AtomicUsize);

/// One side's outcome and the order in which it came back.
#[derive(Debug)]
struct Finished {
    ticket: usize,
    res: Result<()>,
}

impl FinishOrder {
    fn record(&self, res: Result<()>) -> Finished {
        Finished {
            ticket: self.0.fetch_add(1, Ordering::SeqCst),
            res,
        }
    }
}

/// Combine the outcomes of both sides of a join point.
///
/// The error that came back first wins, unless it is only the echo of a
/// fail-fast abort and the later one is a real failure. The losing error is
/// logged, never silently dropped.
fn first_error(unit: &str, a: Finished, b: Finished) -> Result<()> {
    let (earlier, later) = if a.ticket <= b.ticket {
        (a.res, b.res)
    } else {
        (b.res, a.res)
    };

    match (earlier, later) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Err(earlier), Err(later)) => {
            let (kept, dropped) = if earlier.is_aborted() && !later.is_aborted() {
                (later, earlier)
            } else {
                (earlier, later)
            };
            warn!(unit = %unit, error = %dropped, "both sides of join point failed");
            Err(kept)
        }
    }
}

impl Executable for PipedUnits {
    fn set_stdin(&mut self, source: Redirect) {
        self.left.set_stdin(source);
    }

    fn set_stdout(&mut self, sink: Redirect) {
        self.right.set_stdout(sink);
    }

    fn set_stderr(&mut self, sink: Redirect) {
        self.left.set_stderr(sink.clone());
        self.right.set_stderr(sink);
    }

    fn set_abort(&mut self, signal: AbortSignal) {
        self.left.set_abort(signal.clone());
        self.right.set_abort(signal);
    }

    fn start(&mut self) -> UnitFuture<'_> {
        Box::pin(async move {
            let unit = self.describe();
            let Self { left, right, .. } = self;

            // No ordering between the two sides; the pipe buffers whichever
            // one gets going first.
            let order = FinishOrder::default();
            let (l, r) = tokio::join!(
                async { order.record(left.start().await) },
                async { order.record(right.start().await) },
            );
            first_error(&unit, l, r)
        })
    }

    fn wait(&mut self) -> UnitFuture<'_> {
        Box::pin(async move {
            let unit = self.describe();
            let Self {
                left,
                right,
                writer,
            } = self;

            let order = FinishOrder::default();
            let drain_left = async {
                let finished = order.record(left.wait().await);
                if writer.take().is_some() {
                    debug!(unit = %unit, "left side finished; closed pipe write end");
                }
                finished
            };
            let drain_right = async { order.record(right.wait().await) };

            let (l, r) = tokio::join!(drain_left, drain_right);
            first_error(&unit, l, r)
        })
    }

    fn describe(&self) -> String {
        format!("{} | {}", self.left.describe(), self.right.describe())
    }
}

impl std::fmt::Debug for PipedUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipedUnits")
            .field("unit", &self.describe())
            .field("write_end_open", &self.writer.is_some())
            .finish()
    }
}

