//! Configuration types: the `waveline.toml` editor file and the per-document
//! [`DiagramConfig`].

use serde::{Deserialize, Serialize};
use waveline_common::{Period, TimeUnit};

/// Default number of cycles in a new diagram.
pub const DEFAULT_CYCLES: u32 = 20;
/// Largest cycle count a diagram may be configured with.
pub const MAX_CYCLES: u32 = 1000;
/// Default width of one cycle of the global clock, in pixels.
pub const DEFAULT_CYCLE_WIDTH: f64 = 60.0;
/// Default height of one row, in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 40.0;
/// Default height of the header band above the first row, in pixels.
pub const DEFAULT_HEADER_HEIGHT: f64 = 30.0;
/// Default width of the signal-name column, in pixels.
pub const DEFAULT_NAME_COLUMN_WIDTH: f64 = 150.0;
/// Default transition slew, in pixels.
pub const DEFAULT_SLEW: f64 = 4.0;
/// Default color of delay uncertainty windows.
pub const DEFAULT_DELAY_COLOR: &str = "#0066cc";

/// The `config` object carried by every timing diagram document.
///
/// Holds the global level of the slew/delay cascade, the global clock period
/// that delay values are expressed against, and the layout metrics the
/// coordinate projector uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagramConfig {
    /// Number of cycles drawn.
    pub cycles: u32,
    /// Global clock period magnitude.
    pub clock_period: f64,
    /// Unit of `clock_period`; also the unit of every delay value.
    pub clock_period_unit: TimeUnit,
    /// Global transition slew in pixels.
    pub slew: f64,
    /// Global minimum delay in time units.
    pub delay_min: f64,
    /// Global maximum delay in time units.
    pub delay_max: f64,
    /// Global delay window color.
    pub delay_color: String,
    /// Width of one global clock cycle in pixels.
    pub cycle_width: f64,
    /// Height of one row in pixels.
    pub row_height: f64,
    /// Height of the header band above row 0 in pixels.
    pub header_height: f64,
    /// Width of the signal-name column in pixels; cycle 0 starts here.
    pub name_column_width: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            cycles: DEFAULT_CYCLES,
            clock_period: 10.0,
            clock_period_unit: TimeUnit::Ns,
            slew: DEFAULT_SLEW,
            delay_min: 0.0,
            delay_max: 0.0,
            delay_color: DEFAULT_DELAY_COLOR.to_string(),
            cycle_width: DEFAULT_CYCLE_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
            header_height: DEFAULT_HEADER_HEIGHT,
            name_column_width: DEFAULT_NAME_COLUMN_WIDTH,
        }
    }
}

impl DiagramConfig {
    /// The global clock period.
    pub fn clock_period(&self) -> Period {
        Period::new(self.clock_period, self.clock_period_unit)
    }
}

/// The top-level editor configuration parsed from `waveline.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct EditorConfig {
    /// Defaults for newly created diagrams.
    #[serde(default)]
    pub diagram: DiagramDefaults,
    /// Row and cycle geometry.
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// `[diagram]` section: defaults for new documents.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramDefaults {
    /// Number of cycles.
    pub cycles: u32,
    /// Global clock period as a string (e.g. `"10ns"`), parsed to [`Period`].
    pub clock_period: String,
    /// Transition slew in pixels.
    pub slew: f64,
    /// Minimum delay, in the unit of `clock_period`.
    pub delay_min: f64,
    /// Maximum delay, in the unit of `clock_period`.
    pub delay_max: f64,
    /// Delay window color.
    pub delay_color: String,
}

impl Default for DiagramDefaults {
    fn default() -> Self {
        Self {
            cycles: DEFAULT_CYCLES,
            clock_period: "10ns".to_string(),
            slew: DEFAULT_SLEW,
            delay_min: 0.0,
            delay_max: 0.0,
            delay_color: DEFAULT_DELAY_COLOR.to_string(),
        }
    }
}

/// `[layout]` section: pixel metrics.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of one global clock cycle.
    pub cycle_width: f64,
    /// Height of one row.
    pub row_height: f64,
    /// Height of the header band.
    pub header_height: f64,
    /// Width of the signal-name column.
    pub name_column_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cycle_width: DEFAULT_CYCLE_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
            header_height: DEFAULT_HEADER_HEIGHT,
            name_column_width: DEFAULT_NAME_COLUMN_WIDTH,
        }
    }
}
