//! Conformance test helpers for the Waveline editing core.
//!
//! Provides shared diagram builders so the integration tests can assert on
//! whole editing sequences (value edits, cycle shifts, row moves, reloads)
//! without repeating setup.

#![warn(missing_docs)]

use waveline_common::{Logic, Value};
use waveline_config::DiagramConfig;
use waveline_model::{Anchor, Diagram, Signal};

/// Builds a `DiagramConfig` from `waveline.toml` text.
///
/// Panics on invalid input; fixtures are expected to be well formed.
pub fn make_config(toml_str: &str) -> DiagramConfig {
    waveline_config::load_config_from_str(toml_str).unwrap()
}

/// Config with `cycles` cycles and everything else at its default.
pub fn config_with_cycles(cycles: u32) -> DiagramConfig {
    make_config(&format!(
        r#"
[diagram]
cycles = {cycles}
clock_period = "10ns"
"#
    ))
}

/// `0` → low, anything else → high.
pub fn level(v: u8) -> Value {
    Value::Logic(if v == 0 { Logic::Zero } else { Logic::One })
}

/// A bit signal holding `values`, for timeline and shift tests.
pub fn bit_signal(name: &str, values: &[(u32, u8)]) -> Signal {
    values
        .iter()
        .fold(Signal::bit(name), |s, &(cycle, v)| s.with_value(cycle, level(v)))
}

/// Diagram with one signal `a` holding `values` and nothing else.
pub fn single_bit_diagram(values: &[(u32, u8)]) -> Diagram {
    let mut d = Diagram::new(config_with_cycles(20));
    d.add_signal(bit_signal("a", values), None).unwrap();
    d
}

/// Rows: `clk`, `en`, `data`, measure `M1` (clk@1 → data@3).
pub fn clk_data_diagram() -> Diagram {
    let mut d = Diagram::new(config_with_cycles(20));
    d.add_signal(Signal::clock("clk", None), None).unwrap();
    d.add_signal(bit_signal("en", &[(0, 0), (2, 1)]), None)
        .unwrap();
    d.add_signal(
        Signal::bus("data")
            .with_value(1, Value::from("A0"))
            .with_value(3, Value::from("A1")),
        None,
    )
    .unwrap();
    d.add_measure("tPD", Anchor::rising("clk", 1), Anchor::rising("data", 3), None)
        .unwrap();
    d
}

/// Sparse cycle → value pairs of a signal, in cycle order.
pub fn entries(diagram: &Diagram, signal: &str) -> Vec<(u32, Value)> {
    diagram
        .signal_by_name(signal)
        .map(|s| s.values().iter().map(|(c, v)| (*c, v.clone())).collect())
        .unwrap_or_default()
}

/// Expected entries written as `(cycle, 0|1)` pairs.
pub fn bits(pairs: &[(u32, u8)]) -> Vec<(u32, Value)> {
    pairs.iter().map(|&(c, v)| (c, level(v))).collect()
}

/// Document in the flat layout written by older editors: a `signals` array
/// and measures addressed by index and row with signed cycles.
pub const LEGACY_DOCUMENT: &str = r#"{
    "version": "2.0",
    "config": { "cycles": 16, "clockPeriod": 20, "clockPeriodUnit": "ns", "delayMax": 2 },
    "signals": [
        { "name": "clk", "type": "clock" },
        { "name": "rst", "type": "bit", "values": [1, null, 0] },
        { "name": "q", "type": "bus", "values": { "0": "X", "3": "D0", "5": "D1" } }
    ],
    "measures": [
        { "signal1Name": "clk", "cycle1": 2, "signal2Row": 2, "cycle2": 3,
          "measureRow": 3, "text": "tCO" },
        { "signal1Index": 1, "cycle1": -1, "signal2Index": 0, "cycle2": 4,
          "text": "tREC" }
    ]
}"#;
