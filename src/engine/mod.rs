// src/engine/mod.rs

//! Pipeline orchestration.
//!
//! This module turns an ordered list of stages into one root unit and drives
//! it through the start-then-wait protocol:
//!
//! - [`plan`] describes stages ([`StageSpec`]) and the three-slot
//!   [`StagePlan`] (input filter, transfer, output filter).
//! - [`runner`] folds stages through [`join`](crate::exec::join), binds the
//!   pipeline's outer streams, starts, and waits.

pub mod plan;
pub mod runner;

pub use plan::{StagePlan, StageSpec};
pub use runner::{run_pipeline, run_unit};

use crate::exec::Redirect;
use crate::types::FailurePolicy;

/// Options for a single pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// What happens to running stages once one stage fails.
    pub policy: FailurePolicy,
}

/// Where the pipeline as a whole reads from and writes to.
///
/// `stdin` goes to the first stage, `stdout` comes from the last stage, and
/// every stage shares `stderr`.
#[derive(Debug, Clone, Default)]
pub struct StdStreams {
    pub stdin: Redirect,
    pub stdout: Redirect,
    pub stderr: Redirect,
}

impl StdStreams {
    /// The calling process's own stdin/stdout/stderr.
    pub fn inherit() -> Self {
        Self::default()
    }
}
