// src/exec/unit.rs

//! The composable unit contract.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::exec::abort::AbortSignal;
use crate::exec::stdio::Redirect;

/// Future returned by [`Executable::start`] and [`Executable::wait`].
pub type UnitFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Owned, type-erased unit; leaves and composites are both stored this way.
pub type BoxedUnit = Box<dyn Executable>;

/// Something that can be wired up, started, and waited on like a process.
///
/// Implemented by a single process ([`ProcessUnit`]) and by two units joined
/// with a pipe ([`PipedUnits`]). Lifecycle is `Built -> Started -> Exited`:
///
/// - the `set_*` methods are only meaningful before `start`;
/// - `start` must not wait for completion;
/// - `wait` is called at most once, and only after a successful `start`.
///
/// [`ProcessUnit`]: crate::exec::ProcessUnit
/// [`PipedUnits`]: crate::exec::PipedUnits
pub trait Executable: Send {
    fn set_stdin(&mut self, source: Redirect);

    fn set_stdout(&mut self, sink: Redirect);

    fn set_stderr(&mut self, sink: Redirect);

    /// Attach the fail-fast signal to every leaf below this unit.
    fn set_abort(&mut self, signal: AbortSignal);

    /// Launch the underlying process(es).
    fn start(&mut self) -> UnitFuture<'_>;

    /// Suspend until every underlying process has exited.
    fn wait(&mut self) -> UnitFuture<'_>;

    /// Short label of the unit's topology, e.g. `gojq . | cat`.
    fn describe(&self) -> String;
}
