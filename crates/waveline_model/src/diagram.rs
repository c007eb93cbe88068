//! The [`Diagram`] document: typed data maps plus the row directory that
//! orders them.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use waveline_common::Value;
use waveline_config::DiagramConfig;

use crate::annotations::{
    AcEntry, AcTable, Anchor, Arrow, ControlPoint, Counter, CycleNumbers, Group, Measure, TextRow,
};
use crate::error::EditError;
use crate::rows::{RowDirectory, RowHit, RowKind, RowRef};
use crate::signal::{CycleOptions, Signal, SignalKind};
use crate::xref::{DanglingPolicy, DanglingRef, RefOwner};

/// A timing diagram.
///
/// Data lives in per-kind maps keyed by name; `rows` only orders them. Every
/// mutator validates first and leaves the diagram untouched on error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagram {
    pub(crate) config: DiagramConfig,
    pub(crate) rows: RowDirectory,
    pub(crate) signals: BTreeMap<String, Signal>,
    pub(crate) measures: BTreeMap<String, Measure>,
    pub(crate) groups: BTreeMap<String, Group>,
    pub(crate) arrows: BTreeMap<String, Arrow>,
    pub(crate) texts: BTreeMap<String, TextRow>,
    pub(crate) counters: BTreeMap<String, Counter>,
    pub(crate) ac_tables: BTreeMap<String, AcTable>,
    pub(crate) cycle_numbers: BTreeMap<String, CycleNumbers>,
}

impl Diagram {
    /// An empty diagram.
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// The document configuration.
    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    /// Mutable access to layout and cascade settings.
    pub fn config_mut(&mut self) -> &mut DiagramConfig {
        &mut self.config
    }

    /// The row order.
    pub fn rows(&self) -> &RowDirectory {
        &self.rows
    }

    // ---- bulk accessors ---------------------------------------------------

    /// Signals in row order.
    pub fn signals(&self) -> Vec<&Signal> {
        self.rows
            .signal_names()
            .filter_map(|name| self.signals.get(name))
            .collect()
    }

    /// Measures in row order; grouped measures appear at their group's row
    /// in member order.
    pub fn measures(&self) -> Vec<&Measure> {
        let mut out = Vec::new();
        for row in &self.rows {
            match row {
                RowRef::Measure(name) => out.extend(self.measures.get(name)),
                RowRef::Group(name) => {
                    if let Some(group) = self.groups.get(name) {
                        out.extend(group.measures.iter().filter_map(|m| self.measures.get(m)));
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Arrows by name.
    pub fn arrows(&self) -> impl Iterator<Item = &Arrow> {
        self.arrows.values()
    }

    /// Looks up a signal.
    pub fn signal_by_name(&self, name: &str) -> Option<&Signal> {
        self.signals.get(name)
    }

    /// Mutable signal access for signal-level option edits.
    pub fn signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
        self.signals.get_mut(name)
    }

    /// The `index`-th signal in row order.
    pub fn signal_by_index(&self, index: usize) -> Option<&Signal> {
        self.rows
            .signal_names()
            .nth(index)
            .and_then(|name| self.signals.get(name))
    }

    /// The `index`-th measure in row order.
    pub fn measure_by_index(&self, index: usize) -> Option<&Measure> {
        self.measures().into_iter().nth(index)
    }

    /// Looks up a measure.
    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.get(name)
    }

    /// Mutable measure access for label and style edits.
    pub fn measure_mut(&mut self, name: &str) -> Option<&mut Measure> {
        self.measures.get_mut(name)
    }

    /// Looks up a group.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Looks up an arrow.
    pub fn arrow(&self, name: &str) -> Option<&Arrow> {
        self.arrows.get(name)
    }

    /// Looks up a text row.
    pub fn text(&self, name: &str) -> Option<&TextRow> {
        self.texts.get(name)
    }

    /// Mutable text row access.
    pub fn text_mut(&mut self, name: &str) -> Option<&mut TextRow> {
        self.texts.get_mut(name)
    }

    /// Looks up a counter row.
    pub fn counter(&self, name: &str) -> Option<&Counter> {
        self.counters.get(name)
    }

    /// Mutable counter row access.
    pub fn counter_mut(&mut self, name: &str) -> Option<&mut Counter> {
        self.counters.get_mut(name)
    }

    /// Looks up an AC table.
    pub fn ac_table(&self, name: &str) -> Option<&AcTable> {
        self.ac_tables.get(name)
    }

    /// Looks up a cycle-number row.
    pub fn cycle_numbers(&self, name: &str) -> Option<&CycleNumbers> {
        self.cycle_numbers.get(name)
    }

    /// The row under a vertical pixel position.
    pub fn row_at_y(&self, y: f64) -> RowHit {
        self.rows
            .row_at_y(y, self.config.header_height, self.config.row_height)
    }

    /// Index of the signal whose row is under `y`, if that row is a signal.
    pub fn signal_index_at_y(&self, y: f64) -> Option<usize> {
        let hit = self.row_at_y(y);
        match hit.row {
            Some(RowRef::Signal(_)) => Some(self.rows.row_index_to_signal_index(hit.index)),
            _ => None,
        }
    }

    // ---- signals ----------------------------------------------------------

    /// Adds a signal at row `at` (end when `None`) and returns its row index.
    ///
    /// A bit or bus signal without a base clock is attached to the first
    /// clock in the diagram.
    pub fn add_signal(&mut self, mut signal: Signal, at: Option<usize>) -> Result<usize, EditError> {
        let name = signal.name.trim().to_string();
        if name.is_empty() {
            return Err(EditError::EmptyName);
        }
        if self.signals.contains_key(&name) {
            return Err(EditError::DuplicateName {
                kind: RowKind::Signal,
                name,
            });
        }
        match (&signal.base_clock, signal.kind) {
            (Some(clock), _) => self.require_clock(clock)?,
            (None, SignalKind::Bit | SignalKind::Bus) => {
                signal.base_clock = self.first_clock().map(|c| c.name.clone());
            }
            (None, SignalKind::Clock) => {}
        }
        signal.name = name.clone();
        let row = RowRef::Signal(name.clone());
        let index = self.insert_row_at(at, row)?;
        debug!(signal = %name, kind = %signal.kind, index, "added signal");
        self.signals.insert(name, signal);
        self.refresh_cross_references();
        Ok(index)
    }

    /// Renames a signal; anchors and base clocks follow the new name.
    pub fn rename_signal(&mut self, old: &str, new: &str) -> Result<(), EditError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(EditError::EmptyName);
        }
        if !self.signals.contains_key(old) {
            return Err(EditError::UnknownSignal(old.to_string()));
        }
        if old == new {
            return Ok(());
        }
        if self.signals.contains_key(new) {
            return Err(EditError::DuplicateName {
                kind: RowKind::Signal,
                name: new.to_string(),
            });
        }
        if let Some(mut signal) = self.signals.remove(old) {
            signal.name = new.to_string();
            self.signals.insert(new.to_string(), signal);
        }
        self.rows.rename_row(RowKind::Signal, old, new);
        self.on_signal_renamed(old, new);
        debug!(old, new, "renamed signal");
        Ok(())
    }

    /// Sets or clears the clock driving a bit or bus signal.
    pub fn set_base_clock(&mut self, signal: &str, clock: Option<&str>) -> Result<(), EditError> {
        if !self.signals.contains_key(signal) {
            return Err(EditError::UnknownSignal(signal.to_string()));
        }
        if let Some(clock) = clock {
            self.require_clock(clock)?;
        }
        if let Some(s) = self.signals.get_mut(signal) {
            s.base_clock = clock.map(str::to_string);
        }
        Ok(())
    }

    /// Deletes a signal and its row.
    ///
    /// Signals clocked by it lose their `base_clock`. Measures and arrows
    /// anchored to it are returned as dangling references; with
    /// [`DanglingPolicy::Cascade`] they are deleted as well.
    pub fn delete_signal(
        &mut self,
        name: &str,
        policy: DanglingPolicy,
    ) -> Result<Vec<DanglingRef>, EditError> {
        if self.signals.remove(name).is_none() {
            return Err(EditError::UnknownSignal(name.to_string()));
        }
        self.rows.remove_row_by_name(RowKind::Signal, name);
        for s in self.signals.values_mut() {
            if s.base_clock.as_deref() == Some(name) {
                s.base_clock = None;
            }
        }
        let dangling = self.on_signal_deleted(name);
        if policy == DanglingPolicy::Cascade {
            self.purge_dangling(&dangling);
        }
        debug!(signal = name, dangling = dangling.len(), ?policy, "deleted signal");
        Ok(dangling)
    }

    // ---- values -----------------------------------------------------------

    /// Sets the value of `signal` at `cycle`.
    pub fn set_value(&mut self, signal: &str, cycle: u32, value: Value) -> Result<(), EditError> {
        self.check_cycle(cycle)?;
        self.signal_entry(signal)?.set_value(cycle, value)
    }

    /// Removes the stored value (and option override) at `cycle`.
    pub fn clear_value(&mut self, signal: &str, cycle: u32) -> Result<Option<Value>, EditError> {
        self.check_cycle(cycle)?;
        Ok(self.signal_entry(signal)?.clear_value(cycle))
    }

    /// Flips a bit signal at `cycle` and returns the new value.
    pub fn toggle_value(&mut self, signal: &str, cycle: u32) -> Result<Value, EditError> {
        self.check_cycle(cycle)?;
        self.signal_entry(signal)?.toggle(cycle)
    }

    /// Stores per-cycle slew/delay overrides; an empty set removes them.
    pub fn set_cycle_options(
        &mut self,
        signal: &str,
        cycle: u32,
        options: CycleOptions,
    ) -> Result<(), EditError> {
        self.check_cycle(cycle)?;
        self.signal_entry(signal)?.set_cycle_options(cycle, options);
        Ok(())
    }

    // ---- measures and groups ----------------------------------------------

    /// Creates a measure between two anchors, placed at row `at` (end when
    /// `None`), and returns its generated name.
    pub fn add_measure(
        &mut self,
        text: &str,
        from: Anchor,
        to: Anchor,
        at: Option<usize>,
    ) -> Result<String, EditError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EditError::MissingLabel);
        }
        self.check_anchor(&from)?;
        self.check_anchor(&to)?;
        let name = next_name("M", &self.measures);
        self.insert_row_at(at, RowRef::Measure(name.clone()))?;
        debug!(measure = %name, %from, %to, "added measure");
        self.measures
            .insert(name.clone(), Measure::new(name.clone(), from, to, text));
        self.refresh_cross_references();
        Ok(name)
    }

    /// Deletes a measure, removing it from groups and AC tables.
    pub fn delete_measure(&mut self, name: &str) -> Result<(), EditError> {
        if !self.measures.contains_key(name) {
            return Err(EditError::UnknownItem {
                kind: RowKind::Measure,
                name: name.to_string(),
            });
        }
        self.remove_measure(name);
        self.refresh_cross_references();
        Ok(())
    }

    /// Merges measures onto one group row, placed where the first of them
    /// was drawn. Returns the group name.
    pub fn group_measures(&mut self, names: &[&str]) -> Result<String, EditError> {
        if names.is_empty() {
            return Err(EditError::EmptyName);
        }
        for name in names {
            if !self.measures.contains_key(*name) {
                return Err(EditError::UnknownItem {
                    kind: RowKind::Measure,
                    name: name.to_string(),
                });
            }
        }
        let at = names
            .iter()
            .filter_map(|m| self.measure_row_index(m))
            .min()
            .unwrap_or(self.rows.total_rows());
        for name in names {
            self.detach_measure(name);
        }
        let group_name = next_name("G", &self.groups);
        let mut members: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !members.iter().any(|m| m == name) {
                members.push(name.to_string());
            }
        }
        self.rows.insert_row(at, RowRef::Group(group_name.clone()));
        debug!(group = %group_name, members = ?members, "grouped measures");
        self.groups.insert(
            group_name.clone(),
            Group {
                name: group_name.clone(),
                measures: members,
            },
        );
        self.refresh_cross_references();
        Ok(group_name)
    }

    /// Moves a grouped measure back onto its own row, just below the group.
    /// An emptied group is removed.
    pub fn ungroup_measure(&mut self, name: &str) -> Result<(), EditError> {
        let group_name = self
            .group_of(name)
            .ok_or_else(|| EditError::UnknownItem {
                kind: RowKind::Group,
                name: name.to_string(),
            })?
            .to_string();
        let group_row = self
            .rows
            .position(RowKind::Group, &group_name)
            .unwrap_or(self.rows.total_rows());
        self.detach_measure(name);
        let at = if self.groups.contains_key(&group_name) {
            group_row + 1
        } else {
            group_row
        };
        self.rows.insert_row(at, RowRef::Measure(name.to_string()));
        self.refresh_cross_references();
        Ok(())
    }

    // ---- arrows -----------------------------------------------------------

    /// Creates an arrow overlay and returns its generated name.
    pub fn add_arrow(&mut self, from: Anchor, to: Anchor) -> Result<String, EditError> {
        self.check_anchor(&from)?;
        self.check_anchor(&to)?;
        let name = next_name("A", &self.arrows);
        debug!(arrow = %name, %from, %to, "added arrow");
        self.arrows
            .insert(name.clone(), Arrow::new(name.clone(), from, to));
        self.refresh_cross_references();
        Ok(name)
    }

    /// Deletes an arrow.
    pub fn delete_arrow(&mut self, name: &str) -> Result<(), EditError> {
        self.arrows
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EditError::UnknownArrow(name.to_string()))
    }

    /// Moves control point `index` (0 or 1) of an arrow.
    pub fn move_arrow_control_point(
        &mut self,
        name: &str,
        index: usize,
        point: ControlPoint,
    ) -> Result<(), EditError> {
        if index > 1 {
            return Err(EditError::NoSuchControlPoint(index));
        }
        let arrow = self
            .arrows
            .get_mut(name)
            .ok_or_else(|| EditError::UnknownArrow(name.to_string()))?;
        arrow.ctrl[index] = point;
        Ok(())
    }

    // ---- auxiliary rows ---------------------------------------------------

    /// Adds a text row and returns its name.
    pub fn add_text(&mut self, text: &str, at: Option<usize>) -> Result<String, EditError> {
        let name = next_name("T", &self.texts);
        self.insert_row_at(at, RowRef::Text(name.clone()))?;
        self.texts.insert(
            name.clone(),
            TextRow {
                name: name.clone(),
                text: text.to_string(),
                ..Default::default()
            },
        );
        self.refresh_cross_references();
        Ok(name)
    }

    /// Adds a counter row counting from `start` at cycle 0.
    pub fn add_counter(&mut self, start: i64, at: Option<usize>) -> Result<String, EditError> {
        let name = next_name("C", &self.counters);
        self.insert_row_at(at, RowRef::Counter(name.clone()))?;
        self.counters.insert(
            name.clone(),
            Counter {
                name: name.clone(),
                values: BTreeMap::from([(0, start)]),
            },
        );
        self.refresh_cross_references();
        Ok(name)
    }

    /// Adds an empty AC table row.
    pub fn add_ac_table(&mut self, at: Option<usize>) -> Result<String, EditError> {
        let name = next_name("AC", &self.ac_tables);
        self.insert_row_at(at, RowRef::AcTable(name.clone()))?;
        self.ac_tables.insert(
            name.clone(),
            AcTable {
                name: name.clone(),
                entries: Vec::new(),
            },
        );
        self.refresh_cross_references();
        Ok(name)
    }

    /// Appends an entry to an AC table. The entry's measure must exist.
    pub fn add_ac_entry(&mut self, table: &str, entry: AcEntry) -> Result<(), EditError> {
        if !self.measures.contains_key(&entry.measure) {
            return Err(EditError::UnknownItem {
                kind: RowKind::Measure,
                name: entry.measure,
            });
        }
        let t = self
            .ac_tables
            .get_mut(table)
            .ok_or_else(|| EditError::UnknownItem {
                kind: RowKind::AcTable,
                name: table.to_string(),
            })?;
        t.entries.push(entry);
        Ok(())
    }

    /// Adds a cycle-number row starting at `first`.
    pub fn add_cycle_numbers(&mut self, first: i64, at: Option<usize>) -> Result<String, EditError> {
        let name = next_name("N", &self.cycle_numbers);
        self.insert_row_at(at, RowRef::CycleNumbers(name.clone()))?;
        self.cycle_numbers.insert(
            name.clone(),
            CycleNumbers {
                name: name.clone(),
                first,
            },
        );
        self.refresh_cross_references();
        Ok(name)
    }

    // ---- rows -------------------------------------------------------------

    /// Deletes the row at `index` together with its data. Signals are
    /// deleted with [`DanglingPolicy::Cascade`]; a group row takes its
    /// measures with it.
    pub fn delete_row(&mut self, index: usize) -> Option<RowRef> {
        let row = self.rows.get(index)?.clone();
        match &row {
            RowRef::Signal(name) => {
                if let Err(e) = self.delete_signal(name, DanglingPolicy::Cascade) {
                    warn!("{e}; removing the row only");
                    self.rows.remove_row(index);
                }
            }
            RowRef::Measure(name) => {
                self.remove_measure(name);
            }
            RowRef::Group(name) => {
                let members = self
                    .groups
                    .get(name)
                    .map(|g| g.measures.clone())
                    .unwrap_or_default();
                for m in &members {
                    self.remove_measure(m);
                }
                self.groups.remove(name);
                self.rows.remove_row_by_name(RowKind::Group, name);
            }
            RowRef::Text(name) => {
                self.texts.remove(name);
                self.rows.remove_row(index);
            }
            RowRef::Counter(name) => {
                self.counters.remove(name);
                self.rows.remove_row(index);
            }
            RowRef::AcTable(name) => {
                self.ac_tables.remove(name);
                self.rows.remove_row(index);
            }
            RowRef::CycleNumbers(name) => {
                self.cycle_numbers.remove(name);
                self.rows.remove_row(index);
            }
        }
        debug!(%row, index, "deleted row");
        self.refresh_cross_references();
        Some(row)
    }

    /// Moves a row; returns the index it landed on.
    pub fn move_row(&mut self, from: usize, to: usize) -> Option<usize> {
        let landed = self.rows.move_row(from, to)?;
        self.on_row_moved(from, landed);
        Some(landed)
    }

    // ---- internals --------------------------------------------------------

    pub(crate) fn first_clock(&self) -> Option<&Signal> {
        self.signals().into_iter().find(|s| s.is_clock())
    }

    /// Row index a measure is drawn on: its own row or its group's.
    pub(crate) fn measure_row_index(&self, measure: &str) -> Option<usize> {
        self.rows
            .position(RowKind::Measure, measure)
            .or_else(|| {
                self.group_of(measure)
                    .and_then(|g| self.rows.position(RowKind::Group, g))
            })
    }

    pub(crate) fn group_of(&self, measure: &str) -> Option<&str> {
        self.groups
            .values()
            .find(|g| g.measures.iter().any(|m| m == measure))
            .map(|g| g.name.as_str())
    }

    /// Removes a measure's own row and group memberships, pruning groups
    /// left empty. Returns the names of removed groups.
    pub(crate) fn detach_measure(&mut self, measure: &str) -> Vec<String> {
        self.rows.remove_row_by_name(RowKind::Measure, measure);
        let mut emptied = Vec::new();
        for group in self.groups.values_mut() {
            group.measures.retain(|m| m != measure);
            if group.measures.is_empty() {
                emptied.push(group.name.clone());
            }
        }
        for name in &emptied {
            self.groups.remove(name);
            self.rows.remove_row_by_name(RowKind::Group, name);
            debug!(group = %name, "removed empty group");
        }
        emptied
    }

    /// Deletes a measure and everything that only existed for it.
    pub(crate) fn remove_measure(&mut self, measure: &str) -> Vec<String> {
        self.measures.remove(measure);
        let emptied = self.detach_measure(measure);
        for table in self.ac_tables.values_mut() {
            table.entries.retain(|e| e.measure != measure);
        }
        debug!(measure, "removed measure");
        emptied
    }

    fn purge_dangling(&mut self, dangling: &[DanglingRef]) {
        for r in dangling {
            match &r.owner {
                RefOwner::Measure(m) => {
                    self.remove_measure(m);
                }
                RefOwner::Arrow(a) => {
                    self.arrows.remove(a);
                }
                RefOwner::Lookup => {}
            }
        }
        self.refresh_cross_references();
    }

    fn insert_row_at(&mut self, at: Option<usize>, row: RowRef) -> Result<usize, EditError> {
        let index = at.unwrap_or(self.rows.total_rows());
        let kind = row.kind();
        let name = row.name().to_string();
        self.rows
            .insert_row(index, row)
            .ok_or(EditError::DuplicateName { kind, name })
    }

    fn signal_entry(&mut self, name: &str) -> Result<&mut Signal, EditError> {
        self.signals
            .get_mut(name)
            .ok_or_else(|| EditError::UnknownSignal(name.to_string()))
    }

    fn require_clock(&self, name: &str) -> Result<(), EditError> {
        match self.signals.get(name) {
            Some(s) if s.is_clock() => Ok(()),
            _ => Err(EditError::NotAClock(name.to_string())),
        }
    }

    pub(crate) fn check_cycle(&self, cycle: u32) -> Result<(), EditError> {
        if cycle >= self.config.cycles {
            return Err(EditError::CycleOutOfRange {
                cycle,
                cycles: self.config.cycles,
            });
        }
        Ok(())
    }

    fn check_anchor(&self, anchor: &Anchor) -> Result<(), EditError> {
        if !self.signals.contains_key(&anchor.signal) {
            return Err(EditError::UnknownSignal(anchor.signal.clone()));
        }
        self.check_cycle(anchor.cycle)
    }
}

/// First `{prefix}{n}` (n from 1) not used as a key.
pub(crate) fn next_name<V>(prefix: &str, existing: &BTreeMap<String, V>) -> String {
    (1..)
        .map(|n| format!("{prefix}{n}"))
        .find(|name| !existing.contains_key(name))
        .unwrap_or_else(|| prefix.to_string())
}
