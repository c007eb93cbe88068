//! Hold-last-value lookup and per-kind value editing.

use waveline_common::{Logic, Value};
use waveline_conformance::{bits, entries, level, single_bit_diagram};
use waveline_model::{Diagram, EditError, Signal};

#[test]
fn value_holds_until_next_entry() {
    let d = single_bit_diagram(&[(0, 0), (3, 1)]);
    let a = d.signal_by_name("a").unwrap();
    assert_eq!(a.value_at(0), level(0));
    assert_eq!(a.value_at(2), level(0));
    assert_eq!(a.value_at(3), level(1));
    assert_eq!(a.value_at(10), level(1));
}

#[test]
fn every_cycle_resolves_to_latest_prior_entry() {
    let d = single_bit_diagram(&[(0, 1), (4, 0), (7, 1), (12, 0)]);
    let a = d.signal_by_name("a").unwrap();
    for cycle in 0..20u32 {
        let expected = a
            .values()
            .iter()
            .filter(|(c, _)| **c <= cycle)
            .last()
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(a.value_at(cycle), expected, "cycle {cycle}");
    }
}

#[test]
fn transitions_only_where_value_changes() {
    let mut d = single_bit_diagram(&[(0, 0), (2, 1), (5, 1), (8, 0)]);
    let a = d.signal_by_name("a").unwrap();
    assert!(a.is_transition(2));
    assert!(!a.is_transition(5));
    assert!(a.is_transition(8));
    assert_eq!(a.change_cycles(), vec![0, 2, 8]);

    d.clear_value("a", 8).unwrap();
    assert_eq!(d.signal_by_name("a").unwrap().value_at(9), level(1));
}

#[test]
fn toggle_flips_value_in_force() {
    let mut d = single_bit_diagram(&[(0, 0), (2, 1)]);
    assert_eq!(d.toggle_value("a", 5).unwrap(), level(0));
    assert_eq!(entries(&d, "a"), bits(&[(0, 0), (2, 1), (5, 0)]));
    d.set_value("a", 6, Value::X).unwrap();
    assert_eq!(d.toggle_value("a", 6).unwrap(), level(1));
}

#[test]
fn kinds_reject_foreign_values() {
    let mut d = Diagram::default();
    d.add_signal(Signal::clock("clk", None), None).unwrap();
    d.add_signal(Signal::bit("en"), None).unwrap();
    d.add_signal(Signal::bus("addr"), None).unwrap();

    assert!(matches!(
        d.set_value("clk", 1, level(0)),
        Err(EditError::NotEditable(_))
    ));
    assert!(matches!(
        d.set_value("en", 1, Value::from("FF")),
        Err(EditError::KindMismatch { .. })
    ));
    assert!(d.toggle_value("addr", 1).is_err());

    d.set_value("addr", 1, Value::from("FF")).unwrap();
    d.set_value("addr", 2, Value::Logic(Logic::One)).unwrap();
    let addr = d.signal_by_name("addr").unwrap();
    assert_eq!(addr.value_at(0), Value::X);
    assert_eq!(addr.value_at(1), Value::Data("FF".into()));
    assert_eq!(addr.value_at(2), Value::Data("1".into()));
}

#[test]
fn edits_outside_the_diagram_are_rejected() {
    let mut d = single_bit_diagram(&[(0, 0)]);
    let cycles = d.config().cycles;
    assert!(matches!(
        d.set_value("a", cycles, level(1)),
        Err(EditError::CycleOutOfRange { .. })
    ));
    assert!(matches!(
        d.set_value("nope", 1, level(1)),
        Err(EditError::UnknownSignal(_))
    ));
}
