//! Configuration loading and management

mod loader;
mod types;

pub use loader::LoadedConfig;
pub use types::{
    DefaultsConfig, Environment, OutputConfig, OutputFormat, StackConfig, DEFAULT_OUTPUT_DIR,
};
