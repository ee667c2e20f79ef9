// src/config/mod.rs

//! Pipeline definitions read from TOML.
//!
//! - `model.rs`: the `serde` data model.
//! - `loader.rs`: reading a file from disk.
//! - `validate.rs`: turning a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, load_and_validate, load_from_path, parse_str, CONFIG_ENV_VAR,
};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, StageConfig};
