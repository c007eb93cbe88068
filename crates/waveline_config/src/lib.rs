//! Parsing and validation of `waveline.toml` editor configuration.
//!
//! This crate reads the editor defaults file and produces the strongly-typed
//! [`DiagramConfig`] that every timing diagram document carries: cycle count,
//! global clock period, default slew and delay, and row/cycle layout metrics.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str};
pub use resolve::resolve_diagram_config;
pub use types::*;
