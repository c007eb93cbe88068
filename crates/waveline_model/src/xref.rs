//! Cross-reference resolution.
//!
//! Measures and arrows point at signals by name. The row numbers stored next
//! to them are caches: after any structural edit (row moves, insertions,
//! deletions, renames) they are recomputed from the names, so reordering
//! rows never detaches an annotation from its signal.

use std::fmt;

use tracing::{debug, warn};

use crate::annotations::Anchor;
use crate::diagram::Diagram;
use crate::rows::RowKind;

/// The item holding a reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefOwner {
    /// A measure endpoint.
    Measure(String),
    /// An arrow endpoint.
    Arrow(String),
    /// A direct lookup by a caller, e.g. a projector query.
    Lookup,
}

impl fmt::Display for RefOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefOwner::Measure(name) => write!(f, "measure '{name}'"),
            RefOwner::Arrow(name) => write!(f, "arrow '{name}'"),
            RefOwner::Lookup => f.write_str("lookup"),
        }
    }
}

/// A reference to a signal that no longer exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{owner} references missing signal '{signal}'")]
pub struct DanglingRef {
    /// Who holds the reference.
    pub owner: RefOwner,
    /// The missing signal name.
    pub signal: String,
}

impl DanglingRef {
    pub(crate) fn lookup(signal: &str) -> Self {
        Self {
            owner: RefOwner::Lookup,
            signal: signal.to_string(),
        }
    }
}

/// What happens to annotations anchored to a deleted signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DanglingPolicy {
    /// Leave them in place; projection falls back until they are fixed.
    #[default]
    Keep,
    /// Delete them along with the signal.
    Cascade,
}

impl Diagram {
    /// Recomputes every cached row position from names.
    pub fn refresh_cross_references(&mut self) {
        let rows: Vec<(String, Option<usize>, [Option<usize>; 2])> = self
            .measures
            .values()
            .map(|m| {
                (
                    m.name.clone(),
                    self.measure_row_index(&m.name),
                    [self.anchor_row(&m.from), self.anchor_row(&m.to)],
                )
            })
            .collect();
        for (name, measure_row, anchor_rows) in rows {
            if let Some(m) = self.measures.get_mut(&name) {
                m.measure_row = measure_row;
                m.anchor_rows = anchor_rows;
            }
        }
        let arrow_rows: Vec<(String, [Option<usize>; 2])> = self
            .arrows
            .values()
            .map(|a| (a.name.clone(), [self.anchor_row(&a.from), self.anchor_row(&a.to)]))
            .collect();
        for (name, anchor_rows) in arrow_rows {
            if let Some(a) = self.arrows.get_mut(&name) {
                a.anchor_rows = anchor_rows;
            }
        }
    }

    /// Signal rows were permuted.
    pub fn on_signals_reordered(&mut self) {
        self.refresh_cross_references();
    }

    /// A row moved from `row_index` to `new_index`.
    pub fn on_row_moved(&mut self, row_index: usize, new_index: usize) {
        debug!(from = row_index, to = new_index, "row moved");
        self.refresh_cross_references();
    }

    /// A signal was removed; returns one entry per measure or arrow that
    /// still references it.
    pub fn on_signal_deleted(&mut self, name: &str) -> Vec<DanglingRef> {
        let mut dangling = Vec::new();
        for m in self.measures.values().filter(|m| m.references(name)) {
            dangling.push(DanglingRef {
                owner: RefOwner::Measure(m.name.clone()),
                signal: name.to_string(),
            });
        }
        for a in self.arrows.values().filter(|a| a.references(name)) {
            dangling.push(DanglingRef {
                owner: RefOwner::Arrow(a.name.clone()),
                signal: name.to_string(),
            });
        }
        for r in &dangling {
            warn!("{r}");
        }
        self.refresh_cross_references();
        dangling
    }

    /// A signal was renamed; rewrites anchors and base clocks.
    pub fn on_signal_renamed(&mut self, old: &str, new: &str) {
        let rename = |anchor: &mut Anchor| {
            if anchor.signal == old {
                anchor.signal = new.to_string();
            }
        };
        for m in self.measures.values_mut() {
            rename(&mut m.from);
            rename(&mut m.to);
        }
        for a in self.arrows.values_mut() {
            rename(&mut a.from);
            rename(&mut a.to);
        }
        for s in self.signals.values_mut() {
            if s.base_clock.as_deref() == Some(old) {
                s.base_clock = Some(new.to_string());
            }
        }
        self.refresh_cross_references();
    }

    /// Row index of the signal an anchor points at.
    pub fn anchor_row(&self, anchor: &Anchor) -> Option<usize> {
        self.rows.position(RowKind::Signal, &anchor.signal)
    }

    /// Resolves an anchor to its signal's row, or reports it dangling.
    pub fn resolve_anchor(&self, anchor: &Anchor) -> Result<usize, DanglingRef> {
        self.anchor_row(anchor)
            .filter(|_| self.signals.contains_key(&anchor.signal))
            .ok_or_else(|| DanglingRef::lookup(&anchor.signal))
    }

    /// Every measure and arrow endpoint naming a missing signal.
    pub fn dangling_refs(&self) -> Vec<DanglingRef> {
        let mut out = Vec::new();
        for m in self.measures.values() {
            for anchor in m.anchors() {
                if !self.signals.contains_key(&anchor.signal) {
                    out.push(DanglingRef {
                        owner: RefOwner::Measure(m.name.clone()),
                        signal: anchor.signal.clone(),
                    });
                }
            }
        }
        for a in self.arrows.values() {
            for anchor in [&a.from, &a.to] {
                if !self.signals.contains_key(&anchor.signal) {
                    out.push(DanglingRef {
                        owner: RefOwner::Arrow(a.name.clone()),
                        signal: anchor.signal.clone(),
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    fn diagram() -> Diagram {
        let mut d = Diagram::default();
        d.add_signal(Signal::clock("clk", None), None).unwrap();
        d.add_signal(Signal::bit("valid"), None).unwrap();
        d.add_signal(Signal::bus("data"), None).unwrap();
        d
    }

    #[test]
    fn measure_follows_signal_rows() {
        let mut d = diagram();
        let m = d
            .add_measure("tCO", Anchor::rising("clk", 1), Anchor::rising("data", 2), None)
            .unwrap();
        assert_eq!(d.measure(&m).unwrap().anchor_rows, [Some(0), Some(2)]);
        assert_eq!(d.measure(&m).unwrap().measure_row, Some(3));

        d.move_row(2, 0);
        let measure = d.measure(&m).unwrap();
        assert_eq!(measure.anchor_rows, [Some(1), Some(0)]);
        assert_eq!(measure.from.signal, "clk");
        assert_eq!(measure.to.signal, "data");
    }

    #[test]
    fn arrow_rows_follow_moves() {
        let mut d = diagram();
        let a = d.add_arrow(Anchor::rising("valid", 1), Anchor::rising("data", 2)).unwrap();
        d.move_row(0, 2);
        assert_eq!(d.arrow(&a).unwrap().anchor_rows, [Some(0), Some(1)]);
    }

    #[test]
    fn deleted_signal_reports_each_owner_once() {
        let mut d = diagram();
        d.add_measure("self", Anchor::rising("data", 1), Anchor::rising("data", 3), None)
            .unwrap();
        let dangling = d.delete_signal("data", DanglingPolicy::Keep).unwrap();
        assert_eq!(
            dangling,
            vec![DanglingRef {
                owner: RefOwner::Measure("M1".into()),
                signal: "data".into(),
            }]
        );
        assert_eq!(d.measure("M1").unwrap().anchor_rows, [None, None]);
        assert_eq!(d.dangling_refs().len(), 2);
    }

    #[test]
    fn resolve_anchor_reports_missing_signal() {
        let d = diagram();
        assert_eq!(d.resolve_anchor(&Anchor::rising("valid", 0)), Ok(1));
        let err = d.resolve_anchor(&Anchor::rising("gone", 0)).unwrap_err();
        assert_eq!(err.to_string(), "lookup references missing signal 'gone'");
    }

    #[test]
    fn dangling_display() {
        let r = DanglingRef {
            owner: RefOwner::Arrow("A2".into()),
            signal: "rst".into(),
        };
        assert_eq!(r.to_string(), "arrow 'A2' references missing signal 'rst'");
    }
}
