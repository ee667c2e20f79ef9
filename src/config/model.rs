// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::{StagePlan, StageSpec};
use crate::types::FailurePolicy;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// failure_policy = "fail_fast"
///
/// [input_filter]
/// argv = ["gojq", "-n", "{}"]
///
/// [transfer]
/// argv = ["curl", "-s", "--json", "@-", "https://example.com"]
///
/// [output_filter]
/// argv = ["gojq", "."]
/// ```
///
/// Only `[transfer]` is required, and that is enforced by validation rather
/// than by `serde` so the error message can say so.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub input_filter: Option<StageConfig>,

    #[serde(default)]
    pub transfer: Option<StageConfig>,

    #[serde(default)]
    pub output_filter: Option<StageConfig>,
}

/// Validated configuration.
///
/// Obtain one via [`ConfigFile::try_from`] on a [`RawConfigFile`] (or
/// [`load_and_validate`](crate::config::load_and_validate)).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub input_filter: Option<StageConfig>,
    pub transfer: StageConfig,
    pub output_filter: Option<StageConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        input_filter: Option<StageConfig>,
        transfer: StageConfig,
        output_filter: Option<StageConfig>,
    ) -> Self {
        Self {
            config,
            input_filter,
            transfer,
            output_filter,
        }
    }

    pub fn stage_plan(&self) -> StagePlan {
        StagePlan {
            input_filter: self.input_filter.as_ref().map(StageConfig::to_spec),
            transfer: self.transfer.to_spec(),
            output_filter: self.output_filter.as_ref().map(StageConfig::to_spec),
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// `"run_to_completion"` (default) or `"fail_fast"`.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// `[input_filter]`, `[transfer]` or `[output_filter]`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct StageConfig {
    /// Program followed by its arguments; no shell is involved.
    pub argv: Vec<String>,

    /// Extra environment variables for this stage.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// If true, the stage sees only `env`, not the inherited environment.
    #[serde(default)]
    pub clear_env: bool,

    /// Working directory for the stage.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl StageConfig {
    pub fn to_spec(&self) -> StageSpec {
        StageSpec {
            argv: self.argv.clone(),
            env: self.env.clone(),
            clear_env: self.clear_env,
            cwd: self.cwd.clone(),
        }
    }
}
