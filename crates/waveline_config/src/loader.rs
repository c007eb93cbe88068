//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::resolve_diagram_config;
use crate::types::{DiagramConfig, EditorConfig, MAX_CYCLES};
use std::path::Path;

/// Name of the editor configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "waveline.toml";

/// Loads and validates `waveline.toml` from a directory.
///
/// A missing file is not an error: the built-in defaults are returned.
pub fn load_config(dir: &Path) -> Result<DiagramConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(DiagramConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates an explicit configuration file path.
pub fn load_config_file(path: &Path) -> Result<DiagramConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates editor configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<DiagramConfig, ConfigError> {
    let editor: EditorConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let config = resolve_diagram_config(&editor)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable for layout and delay math.
pub fn validate_config(config: &DiagramConfig) -> Result<(), ConfigError> {
    if config.cycles == 0 || config.cycles > MAX_CYCLES {
        return Err(ConfigError::ValidationError(format!(
            "cycles must be between 1 and {MAX_CYCLES}, got {}",
            config.cycles
        )));
    }
    if !config.clock_period().is_positive() {
        return Err(ConfigError::ValidationError(
            "clock period must be positive".to_string(),
        ));
    }
    for (name, value) in [
        ("cycle_width", config.cycle_width),
        ("row_height", config.row_height),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be positive"
            )));
        }
    }
    if config.header_height < 0.0 || config.name_column_width < 0.0 || config.slew < 0.0 {
        return Err(ConfigError::ValidationError(
            "header height, name column width and slew must not be negative".to_string(),
        ));
    }
    if config.delay_min > config.delay_max {
        return Err(ConfigError::ValidationError(format!(
            "delay_min ({}) exceeds delay_max ({})",
            config.delay_min, config.delay_max
        )));
    }
    Ok(())
}
