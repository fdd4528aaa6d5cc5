//! Configuration module for Snowline
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Credentials never live in the file itself; the config names the environment
//! variables that hold them.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ExtractorConfig, FetchConfig, InputConfig, PipelineConfig, StoreConfig};

// Re-export parser functions
pub use parser::load_config;
