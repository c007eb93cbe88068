//! Turning the editor file into the config a new document starts with.

use crate::error::ConfigError;
use crate::types::{DiagramConfig, EditorConfig};
use waveline_common::Period;

/// Builds a [`DiagramConfig`] from the `[diagram]` and `[layout]` sections.
///
/// The clock period string is parsed into magnitude and unit; delay values
/// keep the unit of the parsed period.
pub fn resolve_diagram_config(config: &EditorConfig) -> Result<DiagramConfig, ConfigError> {
    let period: Period = config
        .diagram
        .clock_period
        .parse()
        .map_err(|_| ConfigError::InvalidPeriod(config.diagram.clock_period.clone()))?;

    Ok(DiagramConfig {
        cycles: config.diagram.cycles,
        clock_period: period.value,
        clock_period_unit: period.unit,
        slew: config.diagram.slew,
        delay_min: config.diagram.delay_min,
        delay_max: config.diagram.delay_max,
        delay_color: config.diagram.delay_color.clone(),
        cycle_width: config.layout.cycle_width,
        row_height: config.layout.row_height,
        header_height: config.layout.header_height,
        name_column_width: config.layout.name_column_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveline_common::TimeUnit;

    #[test]
    fn resolves_period_and_layout() {
        let mut editor = EditorConfig::default();
        editor.diagram.clock_period = "4ps".to_string();
        editor.layout.cycle_width = 80.0;
        let c = resolve_diagram_config(&editor).unwrap();
        assert_eq!(c.clock_period, 4.0);
        assert_eq!(c.clock_period_unit, TimeUnit::Ps);
        assert_eq!(c.cycle_width, 80.0);
    }

    #[test]
    fn default_editor_matches_default_diagram() {
        let c = resolve_diagram_config(&EditorConfig::default()).unwrap();
        assert_eq!(c, DiagramConfig::default());
    }

    #[test]
    fn bad_period_errors() {
        let mut editor = EditorConfig::default();
        editor.diagram.clock_period = "soon".to_string();
        let err = resolve_diagram_config(&editor).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPeriod(p) if p == "soon"));
    }
}
