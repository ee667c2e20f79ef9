// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, StageConfig};
use crate::errors::{PipejoinError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PipejoinError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let transfer = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.config,
            raw.input_filter,
            transfer,
            raw.output_filter,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<StageConfig> {
    let transfer = ensure_has_transfer(cfg)?;
    validate_stage("transfer", transfer)?;
    if let Some(ref stage) = cfg.input_filter {
        validate_stage("input_filter", stage)?;
    }
    if let Some(ref stage) = cfg.output_filter {
        validate_stage("output_filter", stage)?;
    }
    Ok(transfer.clone())
}

fn ensure_has_transfer(cfg: &RawConfigFile) -> Result<&StageConfig> {
    cfg.transfer.as_ref().ok_or_else(|| {
        PipejoinError::ConfigError("config must contain a [transfer] section".to_string())
    })
}

fn validate_stage(section: &str, stage: &StageConfig) -> Result<()> {
    match stage.argv.first() {
        None => Err(PipejoinError::ConfigError(format!(
            "[{section}].argv must not be empty"
        ))),
        Some(program) if program.trim().is_empty() => Err(PipejoinError::ConfigError(format!(
            "[{section}].argv[0] must name a program"
        ))),
        Some(_) => {
            if let Some(ref cwd) = stage.cwd {
                if cwd.as_os_str().is_empty() {
                    return Err(PipejoinError::ConfigError(format!(
                        "[{section}].cwd must not be empty"
                    )));
                }
            }
            Ok(())
        }
    }
}
