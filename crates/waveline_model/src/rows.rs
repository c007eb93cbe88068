//! The row directory: the single source of truth for visual order.
//!
//! A [`RowDirectory`] is an ordered list of [`RowRef`]s. It owns no data;
//! every reference names an entry in one of the [`Diagram`](crate::Diagram)'s
//! typed maps. Index arguments are clamped rather than rejected, so a drag
//! whose target went stale between pointer-move and pointer-up still lands
//! somewhere sensible.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a visual row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowKind {
    /// A clock, bit or bus waveform.
    Signal,
    /// A single measurement bracket.
    Measure,
    /// Several measures merged onto one line.
    Group,
    /// Free text.
    Text,
    /// A per-cycle counter.
    Counter,
    /// An AC-characteristics table.
    AcTable,
    /// Cycle index labels.
    CycleNumbers,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowKind::Signal => "signal",
            RowKind::Measure => "measure",
            RowKind::Group => "group",
            RowKind::Text => "text",
            RowKind::Counter => "counter",
            RowKind::AcTable => "ac-table",
            RowKind::CycleNumbers => "cycle-numbers",
        })
    }
}

/// A typed reference to one row's backing data.
///
/// Serialized as `{"type": "signal", "name": "clk"}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "kebab-case")]
pub enum RowRef {
    /// Names an entry of the signal map.
    Signal(String),
    /// Names an entry of the measure map.
    Measure(String),
    /// Names an entry of the group map.
    Group(String),
    /// Names an entry of the text map.
    Text(String),
    /// Names an entry of the counter map.
    Counter(String),
    /// Names an entry of the AC-table map.
    AcTable(String),
    /// Names an entry of the cycle-number map.
    CycleNumbers(String),
}

impl RowRef {
    /// Builds a reference of the given kind.
    pub fn new(kind: RowKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            RowKind::Signal => RowRef::Signal(name),
            RowKind::Measure => RowRef::Measure(name),
            RowKind::Group => RowRef::Group(name),
            RowKind::Text => RowRef::Text(name),
            RowKind::Counter => RowRef::Counter(name),
            RowKind::AcTable => RowRef::AcTable(name),
            RowKind::CycleNumbers => RowRef::CycleNumbers(name),
        }
    }

    /// The kind of row.
    pub fn kind(&self) -> RowKind {
        match self {
            RowRef::Signal(_) => RowKind::Signal,
            RowRef::Measure(_) => RowKind::Measure,
            RowRef::Group(_) => RowKind::Group,
            RowRef::Text(_) => RowKind::Text,
            RowRef::Counter(_) => RowKind::Counter,
            RowRef::AcTable(_) => RowKind::AcTable,
            RowRef::CycleNumbers(_) => RowKind::CycleNumbers,
        }
    }

    /// The referenced name.
    pub fn name(&self) -> &str {
        match self {
            RowRef::Signal(n)
            | RowRef::Measure(n)
            | RowRef::Group(n)
            | RowRef::Text(n)
            | RowRef::Counter(n)
            | RowRef::AcTable(n)
            | RowRef::CycleNumbers(n) => n,
        }
    }

    /// Returns the signal name if this is a signal row.
    pub fn as_signal(&self) -> Option<&str> {
        match self {
            RowRef::Signal(n) => Some(n),
            _ => None,
        }
    }

    fn is(&self, kind: RowKind, name: &str) -> bool {
        self.kind() == kind && self.name() == name
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.name())
    }
}

/// Result of a vertical hit test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowHit {
    /// Row index; equals the row count for the "insert at end" slot.
    pub index: usize,
    /// The row under the pointer, `None` for the end slot.
    pub row: Option<RowRef>,
}

impl RowHit {
    /// Returns `true` when the hit is the one-past-the-end sentinel.
    pub fn is_end(&self) -> bool {
        self.row.is_none()
    }
}

/// Ordered list of typed row references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowDirectory {
    rows: Vec<RowRef>,
}

impl RowDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from a list, dropping repeated `(kind, name)` pairs.
    pub fn from_rows(rows: impl IntoIterator<Item = RowRef>) -> Self {
        let mut dir = Self::new();
        for row in rows {
            dir.push_row(row);
        }
        dir
    }

    /// All rows, top to bottom.
    pub fn as_slice(&self) -> &[RowRef] {
        &self.rows
    }

    /// Iterates rows top to bottom.
    pub fn iter(&self) -> std::slice::Iter<'_, RowRef> {
        self.rows.iter()
    }

    /// Total number of rows of every kind.
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`.
    pub fn get(&self, index: usize) -> Option<&RowRef> {
        self.rows.get(index)
    }

    /// Position of the row `(kind, name)`.
    pub fn position(&self, kind: RowKind, name: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.is(kind, name))
    }

    /// Returns `true` if the row `(kind, name)` exists.
    pub fn contains(&self, kind: RowKind, name: &str) -> bool {
        self.position(kind, name).is_some()
    }

    /// Splices `row` in at `index`, clamped to `[0, len]`.
    ///
    /// Returns the index used, or `None` if an identical row already exists
    /// (the directory is left unchanged).
    pub fn insert_row(&mut self, index: usize, row: RowRef) -> Option<usize> {
        if self.contains(row.kind(), row.name()) {
            return None;
        }
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
        Some(index)
    }

    /// Appends `row` at the bottom. Returns its index, or `None` on duplicates.
    pub fn push_row(&mut self, row: RowRef) -> Option<usize> {
        self.insert_row(self.rows.len(), row)
    }

    /// Removes the reference at `index`. Backing data is untouched.
    pub fn remove_row(&mut self, index: usize) -> Option<RowRef> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// Removes the reference `(kind, name)`, returning where it was.
    pub fn remove_row_by_name(&mut self, kind: RowKind, name: &str) -> Option<usize> {
        let index = self.position(kind, name)?;
        self.rows.remove(index);
        Some(index)
    }

    /// Replaces the name of row `(kind, old)` in place.
    pub fn rename_row(&mut self, kind: RowKind, old: &str, new: &str) -> bool {
        if self.contains(kind, new) {
            return false;
        }
        match self.position(kind, old) {
            Some(index) => {
                self.rows[index] = RowRef::new(kind, new);
                true
            }
            None => false,
        }
    }

    /// Moves the row at `from` so it ends up at `to` (clamped to the last row).
    ///
    /// Returns the final index, or `None` if `from` is out of range.
    pub fn move_row(&mut self, from: usize, to: usize) -> Option<usize> {
        if from >= self.rows.len() {
            return None;
        }
        let row = self.rows.remove(from);
        let to = to.min(self.rows.len());
        self.rows.insert(to, row);
        Some(to)
    }

    /// Signal names, top to bottom.
    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(RowRef::as_signal)
    }

    /// Number of signal rows.
    pub fn signal_count(&self) -> usize {
        self.signal_names().count()
    }

    /// Converts a row index to a signal index.
    ///
    /// Counts signal rows strictly above `row_index` (clamped to the row
    /// count), which is the signal's own index when the row is a signal and the
    /// insertion slot among signals otherwise.
    pub fn row_index_to_signal_index(&self, row_index: usize) -> usize {
        let end = row_index.min(self.rows.len());
        self.rows[..end].iter().filter(|r| r.as_signal().is_some()).count()
    }

    /// Converts a signal index to the row index of that signal.
    ///
    /// Indices past the last signal map to the row count (append slot).
    pub fn signal_index_to_row_index(&self, signal_index: usize) -> usize {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.as_signal().is_some())
            .nth(signal_index)
            .map_or(self.rows.len(), |(i, _)| i)
    }

    /// Maps a vertical pixel position to a row.
    ///
    /// Positions above the first row hit row 0; positions below the last row
    /// hit the end sentinel (`index == total_rows()`, `row == None`).
    pub fn row_at_y(&self, y: f64, header_height: f64, row_height: f64) -> RowHit {
        let index = if row_height > 0.0 && y > header_height {
            ((y - header_height) / row_height).floor() as usize
        } else {
            0
        };
        let index = index.min(self.rows.len());
        RowHit {
            index,
            row: self.rows.get(index).cloned(),
        }
    }
}

impl<'a> IntoIterator for &'a RowDirectory {
    type Item = &'a RowRef;
    type IntoIter = std::slice::Iter<'a, RowRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowDirectory {
        RowDirectory::from_rows([
            RowRef::Signal("clk".into()),
            RowRef::Measure("M1".into()),
            RowRef::Signal("data".into()),
            RowRef::Text("T1".into()),
            RowRef::Signal("valid".into()),
        ])
    }

    #[test]
    fn insert_clamps_index() {
        let mut dir = sample();
        assert_eq!(dir.insert_row(99, RowRef::Counter("C1".into())), Some(5));
        assert_eq!(dir.get(5), Some(&RowRef::Counter("C1".into())));
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut dir = sample();
        assert_eq!(dir.insert_row(0, RowRef::Signal("data".into())), None);
        assert_eq!(dir.total_rows(), 5);
    }

    #[test]
    fn same_name_different_kind_is_allowed() {
        let mut dir = sample();
        assert!(dir.insert_row(0, RowRef::Text("clk".into())).is_some());
    }

    #[test]
    fn from_rows_dedups() {
        let dir = RowDirectory::from_rows([
            RowRef::Signal("a".into()),
            RowRef::Signal("a".into()),
        ]);
        assert_eq!(dir.total_rows(), 1);
    }

    #[test]
    fn remove_by_index_and_name() {
        let mut dir = sample();
        assert_eq!(dir.remove_row(1), Some(RowRef::Measure("M1".into())));
        assert_eq!(dir.remove_row(42), None);
        assert_eq!(dir.remove_row_by_name(RowKind::Text, "T1"), Some(2));
        assert_eq!(dir.remove_row_by_name(RowKind::Text, "T1"), None);
        assert_eq!(dir.total_rows(), 3);
    }

    #[test]
    fn move_row_down_and_up() {
        let mut dir = sample();
        assert_eq!(dir.move_row(0, 2), Some(2));
        assert_eq!(dir.signal_names().collect::<Vec<_>>(), ["data", "clk", "valid"]);
        assert_eq!(dir.move_row(4, 0), Some(0));
        assert_eq!(dir.signal_names().collect::<Vec<_>>(), ["valid", "data", "clk"]);
    }

    #[test]
    fn move_row_clamps_target_and_ignores_bad_source() {
        let mut dir = sample();
        assert_eq!(dir.move_row(0, 100), Some(4));
        assert_eq!(dir.get(4), Some(&RowRef::Signal("clk".into())));
        assert_eq!(dir.move_row(10, 0), None);
    }

    #[test]
    fn index_conversions() {
        let dir = sample();
        assert_eq!(dir.row_index_to_signal_index(0), 0);
        assert_eq!(dir.row_index_to_signal_index(2), 1);
        assert_eq!(dir.row_index_to_signal_index(4), 2);
        // Non-signal rows map to the insertion slot among signals.
        assert_eq!(dir.row_index_to_signal_index(3), 2);
        assert_eq!(dir.row_index_to_signal_index(50), 3);

        assert_eq!(dir.signal_index_to_row_index(0), 0);
        assert_eq!(dir.signal_index_to_row_index(1), 2);
        assert_eq!(dir.signal_index_to_row_index(2), 4);
        assert_eq!(dir.signal_index_to_row_index(3), 5);
    }

    #[test]
    fn conversions_round_trip_for_signal_rows() {
        let dir = sample();
        for (row, r) in dir.iter().enumerate() {
            if r.as_signal().is_some() {
                let sig = dir.row_index_to_signal_index(row);
                assert_eq!(dir.signal_index_to_row_index(sig), row);
            }
        }
    }

    #[test]
    fn row_at_y_hits_rows_and_sentinel() {
        let dir = sample();
        let hit = dir.row_at_y(30.0 + 45.0, 30.0, 40.0);
        assert_eq!(hit.index, 1);
        assert_eq!(hit.row, Some(RowRef::Measure("M1".into())));

        let above = dir.row_at_y(5.0, 30.0, 40.0);
        assert_eq!(above.index, 0);

        let below = dir.row_at_y(10_000.0, 30.0, 40.0);
        assert_eq!(below.index, 5);
        assert!(below.is_end());
    }

    #[test]
    fn rename_row_in_place() {
        let mut dir = sample();
        assert!(dir.rename_row(RowKind::Signal, "data", "din"));
        assert_eq!(dir.position(RowKind::Signal, "din"), Some(2));
        assert!(!dir.rename_row(RowKind::Signal, "din", "clk"));
    }

    #[test]
    fn row_ref_serde_shape() {
        let json = serde_json::to_string(&RowRef::AcTable("T1".into())).unwrap();
        assert_eq!(json, r#"{"type":"ac-table","name":"T1"}"#);
        let back: RowRef = serde_json::from_str(r#"{"type":"cycle-numbers","name":"N"}"#).unwrap();
        assert_eq!(back, RowRef::CycleNumbers("N".into()));
    }
}
