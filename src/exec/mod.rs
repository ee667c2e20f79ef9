// src/exec/mod.rs

//! Process composition layer.
//!
//! Everything that actually runs OS processes lives here, built on
//! `tokio::process::Command`:
//!
//! - [`unit`] defines the [`Executable`] contract shared by leaves and
//!   composites.
//! - [`process`] is the leaf: one external process.
//! - [`composite`] joins two units with a [`pipe`] and drives both sides
//!   concurrently.
//! - [`stdio`] provides [`Redirect`], the cloneable stream binding.
//! - [`abort`] holds the signal used by the fail-fast policy.

pub mod abort;
pub mod composite;
pub mod pipe;
pub mod process;
pub mod stdio;
pub mod unit;

pub use abort::AbortSignal;
pub use composite::{join, join_all, PipedUnits};
pub use pipe::Pipe;
pub use process::ProcessUnit;
pub use stdio::Redirect;
pub use unit::{BoxedUnit, Executable, UnitFuture};
