// src/engine/plan.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::errors::{PipejoinError, Result};
use crate::exec::ProcessUnit;

/// Everything needed to launch one stage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageSpec {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Added on top of the inherited environment (or an empty one when
    /// `clear_env` is set).
    pub env: BTreeMap<String, String>,
    pub clear_env: bool,
    pub cwd: Option<PathBuf>,
}

impl StageSpec {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Split a command string with POSIX shell word rules, e.g.
    /// `gojq -n '{"a": 1}'`.
    pub fn parse(command: &str) -> Result<Self> {
        let argv = shlex::split(command).ok_or_else(|| {
            PipejoinError::ArgsError(format!("unbalanced quoting in command: {command}"))
        })?;
        if argv.is_empty() {
            return Err(PipejoinError::ArgsError(
                "stage command must not be empty".to_string(),
            ));
        }
        Ok(Self::new(argv))
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn to_unit(&self) -> ProcessUnit {
        let mut unit = ProcessUnit::new(self.argv.iter().cloned());
        if self.clear_env {
            unit = unit.env_clear();
        }
        for (key, value) in &self.env {
            unit = unit.env(key.clone(), value.clone());
        }
        if let Some(ref cwd) = self.cwd {
            unit = unit.current_dir(cwd.clone());
        }
        unit
    }
}

impl fmt::Display for StageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.argv)
    }
}

/// Up to three stages: an optional input filter feeding a mandatory transfer
/// stage, whose output optionally passes through an output filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub input_filter: Option<StageSpec>,
    pub transfer: StageSpec,
    pub output_filter: Option<StageSpec>,
}

impl StagePlan {
    pub fn new(transfer: StageSpec) -> Self {
        Self {
            input_filter: None,
            transfer,
            output_filter: None,
        }
    }

    pub fn with_input_filter(mut self, stage: StageSpec) -> Self {
        self.input_filter = Some(stage);
        self
    }

    pub fn with_output_filter(mut self, stage: StageSpec) -> Self {
        self.output_filter = Some(stage);
        self
    }

    /// Stages in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = &StageSpec> {
        self.input_filter
            .iter()
            .chain(std::iter::once(&self.transfer))
            .chain(self.output_filter.iter())
    }

    pub fn into_stages(self) -> Vec<StageSpec> {
        self.input_filter
            .into_iter()
            .chain(std::iter::once(self.transfer))
            .chain(self.output_filter)
            .collect()
    }
}
