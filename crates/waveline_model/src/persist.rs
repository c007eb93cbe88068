//! JSON documents.
//!
//! The current layout stores `rows` plus one map per data kind. Two older
//! layouts are still read: a flat `signals` array (row order = array order)
//! and measures addressed by signal index or row with signed cycle numbers.
//! Saving always writes the current layout.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use waveline_common::{TimeUnit, Value};
use waveline_config::DiagramConfig;

use crate::annotations::{AcTable, Anchor, Arrow, Counter, CycleNumbers, Group, Measure, TextRow};
use crate::diagram::{next_name, Diagram};
use crate::error::PersistError;
use crate::rows::{RowDirectory, RowKind, RowRef};
use crate::signal::{default_value, CycleOptions, Signal, SignalKind};

/// Version written into saved documents.
pub const FORMAT_VERSION: &str = "3.0";

const MAX_MAJOR_VERSION: u32 = 3;

/// Signal as stored on disk. `name` is only present in the flat layout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "type", alias = "kind")]
    kind: SignalKind,
    /// Either a `{"cycle": value}` object or a dense array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<serde_json::Value>,
    #[serde(default, alias = "base_clock", skip_serializing_if = "Option::is_none")]
    base_clock: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    cycle_options: BTreeMap<u32, CycleOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slew: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delay_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delay_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delay_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period_unit: Option<TimeUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phase: Option<f64>,
}

/// Measure in the index/row-addressed layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMeasure {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    signal1_name: Option<String>,
    #[serde(default)]
    signal1_index: Option<usize>,
    #[serde(default)]
    signal1_row: Option<usize>,
    cycle1: i64,
    #[serde(default)]
    signal2_name: Option<String>,
    #[serde(default)]
    signal2_index: Option<usize>,
    #[serde(default)]
    signal2_row: Option<usize>,
    cycle2: i64,
    #[serde(default)]
    measure_row: Option<usize>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    text_x: Option<f64>,
    #[serde(default)]
    text_font: Option<String>,
    #[serde(default)]
    text_color: Option<String>,
}

/// Entry of a `measures` map: anchors, or the flat endpoint fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredMeasure {
    Anchored(Measure),
    Flat(LegacyMeasure),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIn {
    #[serde(default)]
    version: Option<serde_json::Value>,
    #[serde(default)]
    config: DiagramConfig,
    #[serde(default)]
    rows: Option<Vec<RowRef>>,
    #[serde(default)]
    signals: Option<serde_json::Value>,
    #[serde(default)]
    measures: Option<serde_json::Value>,
    #[serde(default)]
    groups: BTreeMap<String, Group>,
    #[serde(default)]
    arrows: BTreeMap<String, Arrow>,
    #[serde(default)]
    texts: BTreeMap<String, TextRow>,
    #[serde(default)]
    counters: BTreeMap<String, Counter>,
    #[serde(default)]
    ac_tables: BTreeMap<String, AcTable>,
    #[serde(default)]
    cycle_numbers: BTreeMap<String, CycleNumbers>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a> {
    version: &'static str,
    config: &'a DiagramConfig,
    rows: &'a [RowRef],
    signals: BTreeMap<&'a str, SignalRecord>,
    measures: &'a BTreeMap<String, Measure>,
    groups: &'a BTreeMap<String, Group>,
    arrows: &'a BTreeMap<String, Arrow>,
    texts: &'a BTreeMap<String, TextRow>,
    counters: &'a BTreeMap<String, Counter>,
    ac_tables: &'a BTreeMap<String, AcTable>,
    cycle_numbers: &'a BTreeMap<String, CycleNumbers>,
}

fn check_version(version: Option<&serde_json::Value>) -> Result<(), PersistError> {
    let text = match version {
        None => return Ok(()),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    let major = text
        .trim()
        .split('.')
        .next()
        .and_then(|m| m.parse::<u32>().ok())
        .ok_or_else(|| PersistError::Invalid(format!("unreadable version '{text}'")))?;
    if major > MAX_MAJOR_VERSION {
        return Err(PersistError::UnsupportedVersion(text));
    }
    Ok(())
}

/// Reads the sparse or dense `values` field, replacing nulls with the kind's
/// default.
fn decode_values(
    kind: SignalKind,
    raw: Option<serde_json::Value>,
) -> Result<BTreeMap<u32, Value>, PersistError> {
    let mut out = BTreeMap::new();
    let cells: Vec<(u32, Option<Value>)> = match raw {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| Ok((u32::try_from(i).unwrap_or(u32::MAX), serde_json::from_value(v)?)))
            .collect::<Result<_, serde_json::Error>>()?,
        Some(obj @ serde_json::Value::Object(_)) => {
            let map: BTreeMap<u32, Option<Value>> = serde_json::from_value(obj)?;
            map.into_iter().collect()
        }
        Some(other) => {
            return Err(PersistError::Invalid(format!(
                "signal values must be an object or array, got {other}"
            )))
        }
    };
    for (cycle, cell) in cells {
        out.insert(cycle, cell.unwrap_or_else(|| default_value(kind)));
    }
    Ok(out)
}

fn signal_from_record(name: String, record: SignalRecord) -> Result<Signal, PersistError> {
    let mut signal = Signal::new(name, record.kind);
    if record.kind == SignalKind::Clock {
        if record.values.as_ref().is_some_and(|v| !v.is_null()) {
            warn!(signal = %signal.name, "ignoring stored values on clock signal");
        }
    } else {
        signal.values.clear();
        for (cycle, value) in decode_values(record.kind, record.values)? {
            match signal.coerce(value) {
                Ok(v) => {
                    signal.values.insert(cycle, v);
                }
                Err(e) => warn!(cycle, "dropping value: {e}"),
            }
        }
        if signal.values.is_empty() {
            signal.values.insert(0, default_value(record.kind));
        }
    }
    signal.base_clock = record.base_clock;
    signal.cycle_options = record
        .cycle_options
        .into_iter()
        .filter(|(_, o)| !o.is_empty())
        .collect();
    signal.slew = record.slew;
    signal.delay_min = record.delay_min;
    signal.delay_max = record.delay_max;
    signal.delay_color = record.delay_color;
    signal.period = record.period;
    signal.period_unit = record.period_unit;
    signal.phase = record.phase;
    Ok(signal)
}

fn record_from_signal(signal: &Signal) -> Result<SignalRecord, PersistError> {
    let values = if signal.is_clock() {
        None
    } else {
        Some(serde_json::to_value(&signal.values)?)
    };
    Ok(SignalRecord {
        name: None,
        kind: signal.kind,
        values,
        base_clock: signal.base_clock.clone(),
        cycle_options: signal.cycle_options.clone(),
        slew: signal.slew,
        delay_min: signal.delay_min,
        delay_max: signal.delay_max,
        delay_color: signal.delay_color.clone(),
        period: signal.period,
        period_unit: signal.period_unit,
        phase: signal.phase,
    })
}

/// Resolves a legacy endpoint: explicit name, then row, then signal index.
fn legacy_signal(
    rows: &RowDirectory,
    name: Option<String>,
    row: Option<usize>,
    index: Option<usize>,
) -> Option<String> {
    if name.is_some() {
        return name;
    }
    if let Some(r) = row {
        if let Some(RowRef::Signal(n)) = rows.get(r) {
            return Some(n.clone());
        }
    }
    index.and_then(|i| rows.signal_names().nth(i).map(str::to_string))
}

/// Parses a document in any supported layout.
pub fn from_json(json: &str) -> Result<Diagram, PersistError> {
    let doc: DocumentIn = serde_json::from_str(json)?;
    check_version(doc.version.as_ref())?;

    let mut diagram = Diagram::new(doc.config);
    let mut legacy_rows = Vec::new();

    match doc.signals {
        None | Some(serde_json::Value::Null) => {}
        Some(serde_json::Value::Array(items)) => {
            for item in items {
                let record: SignalRecord = serde_json::from_value(item)?;
                let name = record
                    .name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| PersistError::Invalid("signal without a name".into()))?;
                if diagram.signals.contains_key(&name) {
                    return Err(PersistError::Invalid(format!("duplicate signal '{name}'")));
                }
                legacy_rows.push(RowRef::Signal(name.clone()));
                diagram
                    .signals
                    .insert(name.clone(), signal_from_record(name, record)?);
            }
        }
        Some(obj @ serde_json::Value::Object(_)) => {
            let records: BTreeMap<String, SignalRecord> = serde_json::from_value(obj)?;
            for (name, record) in records {
                diagram
                    .signals
                    .insert(name.clone(), signal_from_record(name, record)?);
            }
        }
        Some(other) => {
            return Err(PersistError::Invalid(format!(
                "signals must be an object or array, got {other}"
            )))
        }
    }

    diagram.rows = match doc.rows {
        Some(rows) => RowDirectory::from_rows(rows),
        None => RowDirectory::from_rows(legacy_rows),
    };

    for (name, mut group) in doc.groups {
        group.name = name.clone();
        diagram.groups.insert(name, group);
    }
    for (name, mut arrow) in doc.arrows {
        arrow.name = name.clone();
        diagram.arrows.insert(name, arrow);
    }
    for (name, mut text) in doc.texts {
        text.name = name.clone();
        diagram.texts.insert(name, text);
    }
    for (name, mut counter) in doc.counters {
        counter.name = name.clone();
        diagram.counters.insert(name, counter);
    }
    for (name, mut table) in doc.ac_tables {
        table.name = name.clone();
        diagram.ac_tables.insert(name, table);
    }
    for (name, mut numbers) in doc.cycle_numbers {
        numbers.name = name.clone();
        diagram.cycle_numbers.insert(name, numbers);
    }

    match doc.measures {
        None | Some(serde_json::Value::Null) => {}
        Some(serde_json::Value::Array(items)) => {
            let mut legacy: Vec<LegacyMeasure> = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<_, _>>()?;
            legacy.sort_by_key(|m| m.measure_row.unwrap_or(usize::MAX));
            for m in legacy {
                load_legacy_measure(&mut diagram, m);
            }
        }
        Some(obj @ serde_json::Value::Object(_)) => {
            let measures: BTreeMap<String, StoredMeasure> = serde_json::from_value(obj)?;
            for (name, stored) in measures {
                match stored {
                    StoredMeasure::Anchored(mut measure) => {
                        measure.name = name.clone();
                        diagram.measures.insert(name, measure);
                    }
                    StoredMeasure::Flat(mut flat) => {
                        flat.name = Some(name);
                        load_legacy_measure(&mut diagram, flat);
                    }
                }
            }
        }
        Some(other) => {
            return Err(PersistError::Invalid(format!(
                "measures must be an object or array, got {other}"
            )))
        }
    }

    normalize(&mut diagram);
    diagram.refresh_cross_references();
    debug!(
        signals = diagram.signals.len(),
        rows = diagram.rows.total_rows(),
        "loaded document"
    );
    Ok(diagram)
}

fn load_legacy_measure(diagram: &mut Diagram, m: LegacyMeasure) {
    let from = legacy_signal(&diagram.rows, m.signal1_name, m.signal1_row, m.signal1_index);
    let to = legacy_signal(&diagram.rows, m.signal2_name, m.signal2_row, m.signal2_index);
    let (Some(from), Some(to)) = (from, to) else {
        warn!(text = %m.text, "dropping measure with unresolvable endpoints");
        return;
    };
    let name = match m.name {
        Some(n) if !diagram.measures.contains_key(&n) => n,
        _ => next_name("M", &diagram.measures),
    };
    let mut measure = Measure::new(
        name.clone(),
        Anchor::from_signed(from, m.cycle1),
        Anchor::from_signed(to, m.cycle2),
        m.text,
    );
    measure.text_x = m.text_x;
    measure.text_font = m.text_font;
    measure.text_color = m.text_color;
    let at = m.measure_row.unwrap_or(diagram.rows.total_rows());
    diagram.rows.insert_row(at, RowRef::Measure(name.clone()));
    diagram.measures.insert(name, measure);
}

/// Makes rows and data maps agree.
fn normalize(diagram: &mut Diagram) {
    let rows: Vec<RowRef> = diagram.rows.iter().cloned().collect();
    for row in rows {
        if !has_data(diagram, &row) {
            warn!(%row, "dropping row without data");
            diagram.rows.remove_row_by_name(row.kind(), row.name());
        }
    }

    for group in diagram.groups.values_mut() {
        let measures = &diagram.measures;
        group.measures.retain(|m| measures.contains_key(m));
    }
    let empty: Vec<String> = diagram
        .groups
        .iter()
        .filter(|(_, g)| g.measures.is_empty())
        .map(|(n, _)| n.clone())
        .collect();
    for name in empty {
        warn!(group = %name, "dropping empty group");
        diagram.groups.remove(&name);
        diagram.rows.remove_row_by_name(RowKind::Group, &name);
    }

    let mut orphans: Vec<RowRef> = Vec::new();
    orphans.extend(diagram.signals.keys().cloned().map(RowRef::Signal));
    orphans.extend(
        diagram
            .measures
            .keys()
            .filter(|m| diagram.group_of(m).is_none())
            .cloned()
            .map(RowRef::Measure),
    );
    orphans.extend(diagram.groups.keys().cloned().map(RowRef::Group));
    orphans.extend(diagram.texts.keys().cloned().map(RowRef::Text));
    orphans.extend(diagram.counters.keys().cloned().map(RowRef::Counter));
    orphans.extend(diagram.ac_tables.keys().cloned().map(RowRef::AcTable));
    orphans.extend(diagram.cycle_numbers.keys().cloned().map(RowRef::CycleNumbers));
    for row in orphans {
        if !diagram.rows.contains(row.kind(), row.name()) {
            warn!(%row, "appending row for data without a row");
            diagram.rows.push_row(row);
        }
    }

    // grouped measures are drawn on the group row only
    let grouped: Vec<String> = diagram
        .groups
        .values()
        .flat_map(|g| g.measures.iter().cloned())
        .collect();
    for m in grouped {
        diagram.rows.remove_row_by_name(RowKind::Measure, &m);
    }

    for table in diagram.ac_tables.values_mut() {
        let measures = &diagram.measures;
        table.entries.retain(|e| measures.contains_key(&e.measure));
    }
}

fn has_data(diagram: &Diagram, row: &RowRef) -> bool {
    match row {
        RowRef::Signal(n) => diagram.signals.contains_key(n),
        RowRef::Measure(n) => diagram.measures.contains_key(n),
        RowRef::Group(n) => diagram.groups.contains_key(n),
        RowRef::Text(n) => diagram.texts.contains_key(n),
        RowRef::Counter(n) => diagram.counters.contains_key(n),
        RowRef::AcTable(n) => diagram.ac_tables.contains_key(n),
        RowRef::CycleNumbers(n) => diagram.cycle_numbers.contains_key(n),
    }
}

/// Serializes a diagram in the current layout.
pub fn to_json(diagram: &Diagram) -> Result<String, PersistError> {
    let signals = diagram
        .signals
        .iter()
        .map(|(name, s)| Ok((name.as_str(), record_from_signal(s)?)))
        .collect::<Result<BTreeMap<_, _>, PersistError>>()?;
    let doc = DocumentOut {
        version: FORMAT_VERSION,
        config: &diagram.config,
        rows: diagram.rows.as_slice(),
        signals,
        measures: &diagram.measures,
        groups: &diagram.groups,
        arrows: &diagram.arrows,
        texts: &diagram.texts,
        counters: &diagram.counters,
        ac_tables: &diagram.ac_tables,
        cycle_numbers: &diagram.cycle_numbers,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Reads a document from disk.
pub fn load_file(path: &Path) -> Result<Diagram, PersistError> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}

/// Writes a document to disk in the current layout.
pub fn save_file(diagram: &Diagram, path: &Path) -> Result<(), PersistError> {
    let json = to_json(diagram)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), "saved document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Edge;
    use waveline_common::Logic;

    const LEGACY: &str = r#"{
        "version": "2.1",
        "config": { "cycles": 12, "clockPeriod": 10, "clockPeriodUnit": "ns" },
        "signals": [
            { "name": "clk", "type": "clock" },
            { "name": "data", "type": "bus", "values": { "0": "X", "2": "A5", "4": null } },
            { "name": "en", "type": "bit", "values": [0, null, 1] }
        ],
        "measures": [
            { "signal1Index": 0, "cycle1": -2, "signal2Row": 1, "cycle2": 2,
              "measureRow": 1, "text": "tCO" }
        ]
    }"#;

    #[test]
    fn loads_flat_layout() {
        let d = from_json(LEGACY).unwrap();
        assert_eq!(d.config().cycles, 12);
        let names: Vec<_> = d.signals().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["clk", "data", "en"]);
        let data = d.signal_by_name("data").unwrap();
        assert_eq!(data.value_at(3), Value::Data("A5".into()));
        assert_eq!(data.value_at(4), Value::X);
        let en = d.signal_by_name("en").unwrap();
        assert_eq!(en.value_at(1), Value::Logic(Logic::Zero));
        assert_eq!(en.value_at(2), Value::Logic(Logic::One));
    }

    #[test]
    fn legacy_measure_gets_named_anchors() {
        let d = from_json(LEGACY).unwrap();
        let m = d.measure("M1").unwrap();
        assert_eq!(m.from.signal, "clk");
        assert_eq!(m.from.cycle, 1);
        assert_eq!(m.from.edge, Edge::Falling);
        assert_eq!(m.to, Anchor::rising("data", 2));
        assert_eq!(d.rows().get(1), Some(&RowRef::Measure("M1".into())));
        assert_eq!(m.measure_row, Some(1));
    }

    #[test]
    fn current_layout_round_trips() {
        let d = from_json(LEGACY).unwrap();
        let json = to_json(&d).unwrap();
        assert!(json.contains("\"version\": \"3.0\""));
        let again = from_json(&json).unwrap();
        assert_eq!(again, d);
    }

    #[test]
    fn newer_major_version_is_rejected() {
        let err = from_json(r#"{"version": "4.0"}"#).unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedVersion(v) if v == "4.0"));
    }

    #[test]
    fn rows_and_maps_are_reconciled() {
        let json = r#"{
            "version": "3.0",
            "rows": [
                { "type": "signal", "name": "a" },
                { "type": "measure", "name": "ghost" }
            ],
            "signals": {
                "a": { "type": "bit" },
                "b": { "type": "bit", "values": { "1": 1 } }
            }
        }"#;
        let d = from_json(json).unwrap();
        assert_eq!(
            d.rows().as_slice(),
            &[RowRef::Signal("a".into()), RowRef::Signal("b".into())]
        );
        assert_eq!(d.signal_by_name("a").unwrap().value_at(5), Value::Logic(Logic::Zero));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(from_json("{"), Err(PersistError::Json(_))));
        assert!(matches!(
            from_json(r#"{"signals": 3}"#),
            Err(PersistError::Invalid(_))
        ));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.json");
        let d = from_json(LEGACY).unwrap();
        save_file(&d, &path).unwrap();
        assert_eq!(load_file(&path).unwrap(), d);
    }
}
