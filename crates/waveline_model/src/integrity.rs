//! Consistency report for a diagram.

use crate::diagram::Diagram;
use crate::rows::{RowKind, RowRef};
use crate::xref::DanglingRef;

/// A problem found by [`Diagram::check`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityIssue {
    /// A row names an item missing from its data map.
    #[error("row {0} has no data")]
    RowWithoutData(RowRef),

    /// An item is neither listed in `rows` nor (for measures) grouped.
    #[error("{0} is not placed on any row")]
    DataWithoutRow(RowRef),

    /// A measure or arrow anchors to a missing signal.
    #[error(transparent)]
    DanglingAnchor(#[from] DanglingRef),

    /// A base clock names a missing or non-clock signal.
    #[error("signal '{signal}' has unknown base clock '{clock}'")]
    UnknownBaseClock {
        /// The clocked signal.
        signal: String,
        /// The bad clock name.
        clock: String,
    },

    /// A group without members.
    #[error("group '{0}' is empty")]
    EmptyGroup(String),

    /// An AC table entry names a missing measure.
    #[error("AC table '{table}' references missing measure '{measure}'")]
    MissingAcMeasure {
        /// Table name.
        table: String,
        /// Missing measure.
        measure: String,
    },
}

impl Diagram {
    /// Lists every inconsistency; an empty list means the diagram is sound.
    pub fn check(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        for row in &self.rows {
            let present = match row {
                RowRef::Signal(n) => self.signals.contains_key(n),
                RowRef::Measure(n) => self.measures.contains_key(n),
                RowRef::Group(n) => self.groups.contains_key(n),
                RowRef::Text(n) => self.texts.contains_key(n),
                RowRef::Counter(n) => self.counters.contains_key(n),
                RowRef::AcTable(n) => self.ac_tables.contains_key(n),
                RowRef::CycleNumbers(n) => self.cycle_numbers.contains_key(n),
            };
            if !present {
                issues.push(IntegrityIssue::RowWithoutData(row.clone()));
            }
        }

        let unplaced = |kind: RowKind, name: &str| {
            (!self.rows.contains(kind, name)).then(|| RowRef::new(kind, name))
        };
        let mut missing: Vec<RowRef> = Vec::new();
        missing.extend(self.signals.keys().filter_map(|n| unplaced(RowKind::Signal, n)));
        missing.extend(
            self.measures
                .keys()
                .filter(|n| self.group_of(n).is_none())
                .filter_map(|n| unplaced(RowKind::Measure, n)),
        );
        missing.extend(self.groups.keys().filter_map(|n| unplaced(RowKind::Group, n)));
        missing.extend(self.texts.keys().filter_map(|n| unplaced(RowKind::Text, n)));
        missing.extend(self.counters.keys().filter_map(|n| unplaced(RowKind::Counter, n)));
        missing.extend(self.ac_tables.keys().filter_map(|n| unplaced(RowKind::AcTable, n)));
        missing.extend(
            self.cycle_numbers
                .keys()
                .filter_map(|n| unplaced(RowKind::CycleNumbers, n)),
        );
        issues.extend(missing.into_iter().map(IntegrityIssue::DataWithoutRow));

        issues.extend(self.dangling_refs().into_iter().map(IntegrityIssue::from));

        for s in self.signals.values() {
            if let Some(clock) = &s.base_clock {
                if !self.signals.get(clock).is_some_and(|c| c.is_clock()) {
                    issues.push(IntegrityIssue::UnknownBaseClock {
                        signal: s.name.clone(),
                        clock: clock.clone(),
                    });
                }
            }
        }

        for g in self.groups.values() {
            if g.measures.is_empty() {
                issues.push(IntegrityIssue::EmptyGroup(g.name.clone()));
            }
        }

        for t in self.ac_tables.values() {
            for e in &t.entries {
                if !self.measures.contains_key(&e.measure) {
                    issues.push(IntegrityIssue::MissingAcMeasure {
                        table: t.name.clone(),
                        measure: e.measure.clone(),
                    });
                }
            }
        }

        issues
    }
}
