//! Configuration discovery for the CLI

pub mod loader;

pub use loader::{raw_config_from_env, CliConfigLoader, RawConfig, DEFAULT_MODEL};
