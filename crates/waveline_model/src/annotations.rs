//! Annotation data: measures, groups, arrows and the auxiliary row kinds.
//!
//! Every reference into the waveform is an [`Anchor`]: a signal name, a cycle
//! and a clock edge. Row positions stored alongside anchors are caches that
//! the cross-reference resolver rewrites after structural edits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which edge of a cycle an anchor sits on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Start of the cycle.
    #[default]
    Rising,
    /// Middle of the cycle.
    Falling,
}

impl Edge {
    fn is_rising(&self) -> bool {
        *self == Edge::Rising
    }
}

/// A point on a signal's waveform, addressed by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    /// Signal name.
    pub signal: String,
    /// Cycle index.
    pub cycle: u32,
    /// Rising (cycle start) or falling (mid-cycle) edge.
    #[serde(default, skip_serializing_if = "Edge::is_rising")]
    pub edge: Edge,
}

impl Anchor {
    /// An anchor on the rising edge of `cycle`.
    pub fn rising(signal: impl Into<String>, cycle: u32) -> Self {
        Self {
            signal: signal.into(),
            cycle,
            edge: Edge::Rising,
        }
    }

    /// An anchor on the falling edge of `cycle`.
    pub fn falling(signal: impl Into<String>, cycle: u32) -> Self {
        Self {
            signal: signal.into(),
            cycle,
            edge: Edge::Falling,
        }
    }

    /// Decodes the signed cycle numbers of older documents, where `-(k + 1)`
    /// marks the falling edge of cycle `k`.
    pub fn from_signed(signal: impl Into<String>, cycle: i64) -> Self {
        if cycle >= 0 {
            Self::rising(signal, u32::try_from(cycle).unwrap_or(u32::MAX))
        } else {
            let k = -(cycle + 1);
            Self::falling(signal, u32::try_from(k).unwrap_or(u32::MAX))
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.edge {
            Edge::Rising => write!(f, "{}@{}", self.signal, self.cycle),
            Edge::Falling => write!(f, "{}@{}.5", self.signal, self.cycle),
        }
    }
}

/// A bracket between two anchors with a label, drawn on its own row (or on
/// its group's row).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    /// Unique auto-generated name (`M1`, `M2`, ...).
    #[serde(default)]
    pub name: String,
    /// First endpoint.
    pub from: Anchor,
    /// Second endpoint.
    pub to: Anchor,
    /// Row the bracket is drawn on; derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_row: Option<usize>,
    /// Rows of the two endpoint signals; derived.
    #[serde(skip)]
    pub anchor_rows: [Option<usize>; 2],
    /// Label.
    #[serde(default)]
    pub text: String,
    /// Label x position; centered between the endpoints when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_x: Option<f64>,
    /// Label font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_font: Option<String>,
    /// Label color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl Measure {
    /// Creates a measure with no cached positions.
    pub fn new(name: impl Into<String>, from: Anchor, to: Anchor, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            measure_row: None,
            anchor_rows: [None, None],
            text: text.into(),
            text_x: None,
            text_font: None,
            text_color: None,
        }
    }

    /// Both endpoints.
    pub fn anchors(&self) -> [&Anchor; 2] {
        [&self.from, &self.to]
    }

    /// Returns `true` if either endpoint is on `signal`.
    pub fn references(&self, signal: &str) -> bool {
        self.from.signal == signal || self.to.signal == signal
    }
}

/// Several measures drawn on a single row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Unique auto-generated name (`G1`, ...).
    #[serde(default)]
    pub name: String,
    /// Member measure names, in drawing order.
    #[serde(default)]
    pub measures: Vec<String>,
}

/// Offset of a Bézier control point from its projected endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Horizontal offset in pixels.
    pub dx: f64,
    /// Vertical offset in pixels.
    pub dy: f64,
}

/// A curved arrow overlay between two anchors. Arrows own no row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    /// Unique auto-generated name (`A1`, ...).
    #[serde(default)]
    pub name: String,
    /// Tail.
    pub from: Anchor,
    /// Head.
    pub to: Anchor,
    /// Control points relative to `from` and `to` respectively.
    #[serde(default)]
    pub ctrl: [ControlPoint; 2],
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Stroke color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Rows of the two endpoint signals; derived.
    #[serde(skip)]
    pub anchor_rows: [Option<usize>; 2],
}

impl Arrow {
    /// A straight arrow between two anchors.
    pub fn new(name: impl Into<String>, from: Anchor, to: Anchor) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            ctrl: [ControlPoint::default(); 2],
            text: None,
            color: None,
            anchor_rows: [None, None],
        }
    }

    /// Returns `true` if either endpoint is on `signal`.
    pub fn references(&self, signal: &str) -> bool {
        self.from.signal == signal || self.to.signal == signal
    }
}

/// A free text row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRow {
    /// Unique auto-generated name.
    #[serde(default)]
    pub name: String,
    /// Displayed text.
    #[serde(default)]
    pub text: String,
    /// Horizontal position; left of the cycle area when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A row of per-cycle counter labels.
///
/// Each stored entry restarts the count; later cycles show the value plus
/// the number of cycles elapsed since.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    /// Unique auto-generated name.
    #[serde(default)]
    pub name: String,
    /// Sparse cycle → start value map.
    #[serde(default)]
    pub values: BTreeMap<u32, i64>,
}

impl Counter {
    /// The label shown at `cycle`, or `None` before the first entry.
    pub fn label_at(&self, cycle: u32) -> Option<i64> {
        self.values
            .range(..=cycle)
            .next_back()
            .map(|(start, value)| value + i64::from(cycle - start))
    }
}

/// One row of an AC characteristics table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcEntry {
    /// Measure whose span provides the value.
    pub measure: String,
    /// Parameter symbol, e.g. `tSU`.
    #[serde(default)]
    pub parameter: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Specified minimum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Specified maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Unit label for `min`/`max`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A table of timing parameters derived from measures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcTable {
    /// Unique auto-generated name.
    #[serde(default)]
    pub name: String,
    /// Table rows.
    #[serde(default)]
    pub entries: Vec<AcEntry>,
}

/// A row labelling each cycle with its number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleNumbers {
    /// Unique auto-generated name.
    #[serde(default)]
    pub name: String,
    /// Number shown for cycle 0.
    #[serde(default)]
    pub first: i64,
}

impl CycleNumbers {
    /// Label for `cycle`.
    pub fn label_at(&self, cycle: u32) -> i64 {
        self.first + i64::from(cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_cycles_decode_to_edges() {
        assert_eq!(Anchor::from_signed("clk", 3), Anchor::rising("clk", 3));
        assert_eq!(Anchor::from_signed("clk", -1), Anchor::falling("clk", 0));
        assert_eq!(Anchor::from_signed("clk", -4), Anchor::falling("clk", 3));
    }

    #[test]
    fn anchor_display() {
        assert_eq!(Anchor::rising("clk", 2).to_string(), "clk@2");
        assert_eq!(Anchor::falling("clk", 2).to_string(), "clk@2.5");
    }

    #[test]
    fn rising_edge_is_omitted_from_json() {
        let json = serde_json::to_string(&Anchor::rising("d", 1)).unwrap();
        assert_eq!(json, r#"{"signal":"d","cycle":1}"#);
        let back: Anchor = serde_json::from_str(r#"{"signal":"d","cycle":1,"edge":"falling"}"#).unwrap();
        assert_eq!(back, Anchor::falling("d", 1));
    }

    #[test]
    fn counter_counts_from_last_entry() {
        let c = Counter {
            name: "C1".into(),
            values: BTreeMap::from([(2, 10), (6, 0)]),
        };
        assert_eq!(c.label_at(1), None);
        assert_eq!(c.label_at(2), Some(10));
        assert_eq!(c.label_at(5), Some(13));
        assert_eq!(c.label_at(7), Some(1));
    }

    #[test]
    fn cycle_numbers_offset() {
        let n = CycleNumbers {
            name: "N1".into(),
            first: 1,
        };
        assert_eq!(n.label_at(0), 1);
        assert_eq!(n.label_at(9), 10);
    }

    #[test]
    fn measure_serde_skips_anchor_rows() {
        let mut m = Measure::new("M1", Anchor::rising("clk", 1), Anchor::rising("data", 3), "tSU");
        m.anchor_rows = [Some(0), Some(2)];
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("anchorRows").is_none());
        let back: Measure = serde_json::from_value(json).unwrap();
        assert_eq!(back.anchor_rows, [None, None]);
        assert_eq!(back.text, "tSU");
    }
}
