use std::str::FromStr;
use serde::Deserialize;

/// What a pipeline does with still-running stages once one stage fails.
///
/// - `RunToCompletion`: every stage is waited on until it exits by itself.
///   A failing stage never cancels its siblings (default behaviour).
/// - `FailFast`: the first failing stage aborts the others; they are killed
///   and still reaped before the pipeline returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    RunToCompletion,
    FailFast,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::RunToCompletion
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "run_to_completion" => Ok(FailurePolicy::RunToCompletion),
            "fail_fast" => Ok(FailurePolicy::FailFast),
            other => Err(format!(
                "invalid failure_policy: {other} (expected \"run_to_completion\" or \"fail_fast\")"
            )),
        }
    }
}
