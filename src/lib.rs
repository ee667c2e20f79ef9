// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate};
use crate::engine::{run_pipeline, RunOptions, StagePlan, StageSpec, StdStreams};
use crate::errors::PipejoinError;
use crate::exec::Redirect;
use crate::types::FailurePolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the pipeline's outer stdin/stdout/stderr
/// - the pipeline runner
pub async fn run(args: CliArgs) -> Result<()> {
    let (plan, policy) = resolve_plan(&args)?;

    if args.dry_run {
        print_dry_run(&plan, policy);
        return Ok(());
    }

    let streams = open_streams(&args)?;
    info!(stages = plan.stages().count(), ?policy, "running pipeline");

    run_pipeline(plan.into_stages(), streams, RunOptions { policy }).await?;
    Ok(())
}

/// Work out which stages to run and under which failure policy.
///
/// The transfer stage comes either from the trailing `-- <cmd> ...` or from a
/// config file, never both. Filters given on the command line replace the
/// config file's, and `--fail-fast` overrides `[config].failure_policy`.
pub fn resolve_plan(args: &CliArgs) -> errors::Result<(StagePlan, FailurePolicy)> {
    let config_path = match (&args.config, args.transfer.is_empty()) {
        (Some(_), false) => {
            return Err(PipejoinError::ArgsError(
                "--config and a trailing transfer command are mutually exclusive".to_string(),
            ));
        }
        (Some(path), true) => Some(path.clone()),
        (None, true) => default_config_path(),
        (None, false) => None,
    };

    let (mut plan, mut policy) = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading pipeline config");
            let cfg = load_and_validate(&path)?;
            (cfg.stage_plan(), cfg.config.failure_policy)
        }
        None if !args.transfer.is_empty() => (
            StagePlan::new(StageSpec::new(args.transfer.iter().cloned())),
            FailurePolicy::default(),
        ),
        None => {
            return Err(PipejoinError::ArgsError(
                "no transfer command given; pass `-- <cmd> [args...]` or --config <PATH>"
                    .to_string(),
            ));
        }
    };

    if let Some(ref cmd) = args.input_filter {
        plan.input_filter = Some(StageSpec::parse(cmd)?);
    }
    if let Some(ref cmd) = args.output_filter {
        plan.output_filter = Some(StageSpec::parse(cmd)?);
    }
    if args.fail_fast {
        policy = FailurePolicy::FailFast;
    }

    Ok((plan, policy))
}

/// Outer streams for the pipeline: the given files, or our own stdio.
pub fn open_streams(args: &CliArgs) -> errors::Result<StdStreams> {
    let mut streams = StdStreams::inherit();
    if let Some(ref path) = args.stdin {
        streams.stdin = Redirect::open(path)?;
    }
    if let Some(ref path) = args.stdout {
        streams.stdout = Redirect::create(path)?;
    }
    if let Some(ref path) = args.stderr {
        streams.stderr = Redirect::create(path)?;
    }
    Ok(streams)
}

/// Simple dry-run output: print each stage with its argv and settings.
fn print_dry_run(plan: &StagePlan, policy: FailurePolicy) {
    println!("pipejoin dry-run");
    println!("  failure_policy = {policy:?}");
    println!();

    let slots = [
        ("input_filter", plan.input_filter.as_ref()),
        ("transfer", Some(&plan.transfer)),
        ("output_filter", plan.output_filter.as_ref()),
    ];

    println!("stages ({}):", plan.stages().count());
    for (slot, stage) in slots {
        let Some(stage) = stage else { continue };
        println!("  - {slot}");
        println!("      argv: {}", stage);
        if !stage.env.is_empty() {
            println!("      env: {:?}", stage.env);
        }
        if stage.clear_env {
            println!("      clear_env: true");
        }
        if let Some(ref cwd) = stage.cwd {
            println!("      cwd: {}", cwd.display());
        }
    }

    debug!("dry-run complete (no execution)");
}
