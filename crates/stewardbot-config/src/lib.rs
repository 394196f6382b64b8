//! Stewardbot configuration: YAML file format, parsing and validation.
//!
//! The file is read once at startup and turned into the immutable tables the
//! dispatcher runs on.

pub mod errors;
pub mod format_v0;
pub mod parser;

pub use format_v0::ConfigV0;
pub use parser::{parse_config_file, parse_config_str, LoadedConfig};
