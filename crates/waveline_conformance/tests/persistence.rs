//! Loading every document layout and saving the current one.

use tempfile::TempDir;
use waveline_common::{Logic, Value};
use waveline_conformance::{clk_data_diagram, LEGACY_DOCUMENT};
use waveline_model::{
    from_json, load_file, save_file, to_json, AcEntry, Anchor, ControlPoint, Edge, PersistError,
    RowKind, RowRef,
};

#[test]
fn legacy_layout_loads_with_named_anchors() {
    let d = from_json(LEGACY_DOCUMENT).unwrap();
    assert_eq!(d.config().cycles, 16);
    assert_eq!(d.config().delay_max, 2.0);

    let rows: Vec<String> = d.rows().iter().map(|r| r.to_string()).collect();
    assert_eq!(
        rows,
        [
            "signal 'clk'",
            "signal 'rst'",
            "signal 'q'",
            "measure 'M1'",
            "measure 'M2'"
        ]
    );

    let rst = d.signal_by_name("rst").unwrap();
    assert_eq!(rst.value_at(0), Value::Logic(Logic::One));
    assert_eq!(rst.value_at(1), Value::Logic(Logic::Zero));
    let q = d.signal_by_name("q").unwrap();
    assert_eq!(q.value_at(4), Value::Data("D0".into()));

    let m1 = d.measure("M1").unwrap();
    assert_eq!(m1.from, Anchor::rising("clk", 2));
    assert_eq!(m1.to, Anchor::rising("q", 3));
    let m2 = d.measure("M2").unwrap();
    assert_eq!(m2.from.signal, "rst");
    assert_eq!(m2.from.edge, Edge::Falling);
    assert_eq!(m2.from.cycle, 0);
    assert_eq!(m2.to, Anchor::rising("clk", 4));
    assert!(d.check().is_empty());
}

#[test]
fn migrated_document_reloads_identically() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("migrated.json");
    let d = from_json(LEGACY_DOCUMENT).unwrap();
    save_file(&d, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["version"], "3.0");
    assert_eq!(json["rows"][3]["type"], "measure");
    assert_eq!(json["measures"]["M2"]["from"]["edge"], "falling");

    assert_eq!(load_file(&path).unwrap(), d);
}

#[test]
fn full_session_survives_save_and_load() {
    let mut d = clk_data_diagram();
    let m2 = d
        .add_measure("tH", Anchor::rising("en", 2), Anchor::rising("clk", 3), None)
        .unwrap();
    let group = d.group_measures(&["M1", m2.as_str()]).unwrap();
    let arrow = d
        .add_arrow(Anchor::rising("clk", 2), Anchor::rising("en", 2))
        .unwrap();
    d.move_arrow_control_point(&arrow, 1, ControlPoint { dx: -10.0, dy: 15.0 })
        .unwrap();
    d.add_text("reset sequence", Some(0)).unwrap();
    d.add_counter(0, None).unwrap();
    d.add_cycle_numbers(1, Some(0)).unwrap();
    let table = d.add_ac_table(None).unwrap();
    d.add_ac_entry(
        &table,
        AcEntry {
            measure: "M1".into(),
            parameter: "tPD".into(),
            max: Some(25.0),
            unit: Some("ns".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("session.json");
    save_file(&d, &path).unwrap();
    let reloaded = load_file(&path).unwrap();
    assert_eq!(reloaded, d);

    assert!(reloaded.rows().contains(RowKind::Group, &group));
    assert!(!reloaded.rows().contains(RowKind::Measure, "M1"));
    assert_eq!(reloaded.measures().len(), 2);
    assert_eq!(reloaded.arrow(&arrow).unwrap().ctrl[1].dy, 15.0);
    let entry = &reloaded.ac_table(&table).unwrap().entries[0];
    assert_eq!(reloaded.projector().ac_entry_value(entry), Some(20.0));
    assert!(reloaded.check().is_empty());
}

#[test]
fn rows_and_data_are_reconciled_on_load() {
    let json = r#"{
        "version": "3.0",
        "rows": [
            {"type": "signal", "name": "clk"},
            {"type": "signal", "name": "ghost"},
            {"type": "text", "name": "T1"}
        ],
        "signals": {
            "clk": {"type": "clock"},
            "extra": {"type": "bit", "values": {"0": 1}}
        },
        "texts": {"T1": {"text": "note"}}
    }"#;
    let d = from_json(json).unwrap();
    assert_eq!(
        d.rows().as_slice(),
        [
            RowRef::Signal("clk".into()),
            RowRef::Text("T1".into()),
            RowRef::Signal("extra".into())
        ]
    );
    assert_eq!(d.text("T1").unwrap().text, "note");
    assert!(d.check().is_empty());
}

#[test]
fn unreadable_documents_are_errors() {
    assert!(matches!(
        from_json(r#"{"version": "7.1"}"#),
        Err(PersistError::UnsupportedVersion(_))
    ));
    assert!(matches!(from_json("{ nope"), Err(PersistError::Json(_))));
    assert!(from_json(r#"{"signals": [{"type": "bit"}]}"#).is_err());
    assert!(load_file(std::path::Path::new("/definitely/not/here.json")).is_err());
}

#[test]
fn saved_text_is_stable() {
    let d = clk_data_diagram();
    let first = to_json(&d).unwrap();
    let second = to_json(&from_json(&first).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn current_layout_accepts_endpoint_field_measures() {
    let json = r#"{
        "version": "3.0",
        "rows": [
            { "type": "signal", "name": "clk" },
            { "type": "signal", "name": "data" },
            { "type": "measure", "name": "M1" },
            { "type": "measure", "name": "M2" }
        ],
        "signals": {
            "clk": { "type": "clock" },
            "data": { "type": "bit", "baseClock": "clk" }
        },
        "measures": {
            "M1": { "signal1Name": "clk", "cycle1": 1, "signal2Name": "data", "cycle2": 3,
                    "measureRow": 2, "text": "tPD" },
            "M2": { "from": { "signal": "clk", "cycle": 2 }, "to": { "signal": "data", "cycle": 4 } }
        }
    }"#;
    let d = from_json(json).unwrap();

    let m1 = d.measure("M1").unwrap();
    assert_eq!(m1.from, Anchor::rising("clk", 1));
    assert_eq!(m1.to, Anchor::rising("data", 3));
    assert_eq!(m1.text, "tPD");
    assert_eq!(m1.measure_row, Some(2));
    assert_eq!(d.measure("M2").unwrap().to, Anchor::rising("data", 4));
    assert_eq!(d.rows().total_rows(), 4);
    assert!(d.check().is_empty());
}

#[test]
fn endpoint_field_measures_decode_signed_cycles() {
    let json = r#"{
        "rows": [ { "type": "signal", "name": "clk" } ],
        "signals": { "clk": { "type": "clock" } },
        "measures": {
            "setup": { "signal1Row": 0, "cycle1": -3, "signal2Index": 0, "cycle2": 4 }
        }
    }"#;
    let d = from_json(json).unwrap();
    let m = d.measure("setup").unwrap();
    assert_eq!(m.from, Anchor::falling("clk", 2));
    assert_eq!(m.from.edge, Edge::Falling);
    assert_eq!(m.to, Anchor::rising("clk", 4));
    assert_eq!(d.rows().as_slice().last(), Some(&RowRef::Measure("setup".into())));
}
