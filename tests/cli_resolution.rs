// tests/cli_resolution.rs
mod common;
use crate::common::TestResult;

use std::io::Write;
use std::process::{Command, Output};

use clap::Parser;
use tempfile::NamedTempFile;

use pipejoin::cli::CliArgs;
use pipejoin::config::CONFIG_ENV_VAR;
use pipejoin::engine::StageSpec;
use pipejoin::errors::PipejoinError;
use pipejoin::exec::Redirect;
use pipejoin::types::FailurePolicy;
use pipejoin::{open_streams, resolve_plan};

fn parse(args: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("pipejoin").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn trailing_command_becomes_transfer_stage() -> TestResult {
    let args = parse(&[
        "--input-filter",
        "gojq -n '{\"a\": 1}'",
        "--output-filter",
        "gojq -r .a",
        "--",
        "curl",
        "-s",
        "--json",
        "@-",
        "https://example.com",
    ]);

    let (plan, policy) = resolve_plan(&args)?;
    assert_eq!(policy, FailurePolicy::RunToCompletion);
    assert_eq!(
        plan.input_filter,
        Some(StageSpec::new(["gojq", "-n", "{\"a\": 1}"]))
    );
    assert_eq!(
        plan.transfer,
        StageSpec::new(["curl", "-s", "--json", "@-", "https://example.com"])
    );
    assert_eq!(plan.output_filter, Some(StageSpec::new(["gojq", "-r", ".a"])));
    Ok(())
}

#[test]
fn config_and_trailing_command_conflict() -> TestResult {
    let args = parse(&["--config", "pipeline.toml", "--", "cat"]);
    assert!(matches!(
        resolve_plan(&args),
        Err(PipejoinError::ArgsError(msg)) if msg.contains("mutually exclusive")
    ));
    Ok(())
}

#[test]
fn cli_filters_and_fail_fast_override_config() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[config]
failure_policy = "run_to_completion"

[input_filter]
argv = ["cat"]

[transfer]
argv = ["tr", "a-z", "A-Z"]

[output_filter]
argv = ["sort"]
"#
    )?;
    file.flush()?;
    let path = file.path().to_string_lossy().into_owned();

    let args = parse(&[
        "--config",
        path.as_str(),
        "--output-filter",
        "sort -r",
        "--fail-fast",
    ]);
    let (plan, policy) = resolve_plan(&args)?;

    assert_eq!(policy, FailurePolicy::FailFast);
    assert_eq!(plan.input_filter, Some(StageSpec::new(["cat"])));
    assert_eq!(plan.transfer, StageSpec::new(["tr", "a-z", "A-Z"]));
    assert_eq!(plan.output_filter, Some(StageSpec::new(["sort", "-r"])));
    Ok(())
}

#[test]
fn unbalanced_filter_quoting_is_an_argument_error() {
    let args = parse(&["--output-filter", "gojq '.a", "--", "cat"]);
    assert!(matches!(
        resolve_plan(&args),
        Err(PipejoinError::ArgsError(msg)) if msg.contains("unbalanced")
    ));

    let args = parse(&["--input-filter", "   ", "--", "cat"]);
    assert!(matches!(
        resolve_plan(&args),
        Err(PipejoinError::ArgsError(_))
    ));
}

#[test]
fn stream_paths_open_files() -> TestResult {
    let input = NamedTempFile::new()?;
    let dir = tempfile::tempdir()?;
    let out_path = dir.path().join("out.txt");
    let err_path = dir.path().join("err.txt");

    let args = parse(&[
        "--stdin",
        input.path().to_str().expect("utf-8 temp path"),
        "--stdout",
        out_path.to_str().expect("utf-8 temp path"),
        "--stderr",
        err_path.to_str().expect("utf-8 temp path"),
        "--",
        "cat",
    ]);
    let streams = open_streams(&args)?;

    assert!(matches!(streams.stdin, Redirect::Fd(_)));
    assert!(matches!(streams.stdout, Redirect::Fd(_)));
    assert!(matches!(streams.stderr, Redirect::Fd(_)));
    assert!(out_path.exists());
    assert!(err_path.exists());

    let defaults = open_streams(&parse(&["--", "cat"]))?;
    assert!(matches!(defaults.stdin, Redirect::Inherit));
    assert!(matches!(defaults.stdout, Redirect::Inherit));
    Ok(())
}

#[test]
fn missing_stdin_file_is_an_io_error() {
    let args = parse(&["--stdin", "/nonexistent/pipejoin/input", "--", "cat"]);
    assert!(matches!(open_streams(&args), Err(PipejoinError::IoError(_))));
}

/// Run the built binary with `PIPEJOIN_CONFIG` set, so the environment
/// fallback is exercised without touching this process's environment.
fn pipejoin_with_config_env(value: &str, args: &[&str]) -> std::io::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_pipejoin"))
        .env(CONFIG_ENV_VAR, value)
        .env_remove("PIPEJOIN_LOG")
        .args(args)
        .output()
}

#[test]
fn config_env_var_is_used_when_no_config_or_command_given() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[config]
failure_policy = "fail_fast"

[transfer]
argv = ["printf", "from-env"]
"#
    )?;
    let path = file.path().to_str().expect("utf-8 temp path");

    let out = pipejoin_with_config_env(path, &["--dry-run"])?;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.contains("failure_policy = FailFast"), "{stdout}");
    assert!(stdout.contains(r#"argv: ["printf", "from-env"]"#), "{stdout}");

    // A trailing command takes precedence over the environment.
    let out = pipejoin_with_config_env(path, &["--dry-run", "--", "cat"])?;
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.contains(r#"argv: ["cat"]"#), "{stdout}");
    assert!(stdout.contains("failure_policy = RunToCompletion"), "{stdout}");
    Ok(())
}

#[test]
fn empty_config_env_var_is_ignored() -> TestResult {
    let out = pipejoin_with_config_env("", &["--dry-run"])?;
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr)?;
    assert!(stderr.contains("no transfer command given"), "{stderr}");
    Ok(())
}
