// src/engine/runner.rs

use tracing::{debug, info};

use crate::engine::{RunOptions, StageSpec, StdStreams};
use crate::errors::Result;
use crate::exec::{join_all, AbortSignal, BoxedUnit};
use crate::types::FailurePolicy;

/// Build a pipeline from `stages` (in order) and run it to completion.
///
/// An empty stage list is a successful no-op.
pub async fn run_pipeline(
    stages: Vec<StageSpec>,
    streams: StdStreams,
    options: RunOptions,
) -> Result<()> {
    let units = stages.iter().map(|stage| -> BoxedUnit { Box::new(stage.to_unit()) });
    let root = join_all(units)?;
    run_unit(root, streams, options).await
}

/// Bind `streams` to an already-joined root unit, start it, and wait for it.
///
/// `wait` is only called once `start` succeeded for the whole tree; a failed
/// start is returned as-is and whatever did launch is left to run (or, under
/// `FailFast`, killed when the tree is dropped).
pub async fn run_unit(
    root: Option<BoxedUnit>,
    streams: StdStreams,
    options: RunOptions,
) -> Result<()> {
    let Some(mut root) = root else {
        debug!("pipeline has no stages; nothing to run");
        return Ok(());
    };

    if options.policy == FailurePolicy::FailFast {
        root.set_abort(AbortSignal::new());
    }

    let StdStreams {
        stdin,
        stdout,
        stderr,
    } = streams;
    root.set_stdin(stdin);
    root.set_stdout(stdout);
    root.set_stderr(stderr);

    let unit = root.describe();
    info!(unit = %unit, policy = ?options.policy, "starting pipeline");

    if let Err(err) = root.start().await {
        debug!(unit = %unit, error = %err, "pipeline failed to start");
        return Err(err);
    }

    match root.wait().await {
        Ok(()) => {
            info!(unit = %unit, "pipeline finished");
            Ok(())
        }
        Err(err) => {
            debug!(unit = %unit, error = %err, "pipeline failed");
            Err(err)
        }
    }
}
