#![allow(dead_code)]

use pipejoin::config::{ConfigFile, ConfigSection, RawConfigFile, StageConfig};
use pipejoin::types::FailurePolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                input_filter: None,
                transfer: None,
                output_filter: None,
            },
        }
    }

    pub fn with_input_filter(mut self, stage: StageConfig) -> Self {
        self.config.input_filter = Some(stage);
        self
    }

    pub fn with_transfer(mut self, stage: StageConfig) -> Self {
        self.config.transfer = Some(stage);
        self
    }

    pub fn with_output_filter(mut self, stage: StageConfig) -> Self {
        self.config.output_filter = Some(stage);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.config.failure_policy = policy;
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `StageConfig`.
pub struct StageConfigBuilder {
    stage: StageConfig,
}

impl StageConfigBuilder {
    pub fn new(argv: &[&str]) -> Self {
        Self {
            stage: StageConfig {
                argv: argv.iter().map(|s| s.to_string()).collect(),
                ..StageConfig::default()
            },
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.stage.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn clear_env(mut self, val: bool) -> Self {
        self.stage.clear_env = val;
        self
    }

    pub fn cwd(mut self, dir: &str) -> Self {
        self.stage.cwd = Some(dir.into());
        self
    }

    pub fn build(self) -> StageConfig {
        self.stage
    }
}
