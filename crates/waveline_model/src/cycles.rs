//! Cycle insertion and deletion.
//!
//! Inserting `n` cycles at `start` keeps keys `<= start` and moves later
//! keys up by `n`, so the inserted cycles hold the value in force at
//! `start`. Deleting `n` cycles at `start` drops keys in `[start, start+n)`
//! and moves later keys down by `n`. The same rule applies to value maps,
//! per-cycle options, annotation anchors and (for global edits) counters.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::annotations::Anchor;
use crate::diagram::Diagram;
use crate::error::EditError;

/// Largest number of cycles a single insert or delete may touch.
pub const MAX_CYCLE_EDIT: u32 = 50;

/// Which signals a cycle edit applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleScope {
    /// Every signal, annotation and counter.
    Global,
    /// One signal and the anchors on it.
    Signal(String),
}

impl CycleScope {
    fn includes(&self, signal: &str) -> bool {
        match self {
            CycleScope::Global => true,
            CycleScope::Signal(name) => name == signal,
        }
    }
}

/// Items removed as a side effect of deleting cycles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleEdit {
    /// Measures with an endpoint inside the deleted range.
    pub purged_measures: Vec<String>,
    /// Arrows with an endpoint inside the deleted range.
    pub purged_arrows: Vec<String>,
    /// Groups emptied by the purge.
    pub removed_groups: Vec<String>,
}

impl CycleEdit {
    /// Returns `true` if nothing was purged.
    pub fn is_empty(&self) -> bool {
        self.purged_measures.is_empty() && self.purged_arrows.is_empty()
    }
}

/// Checks a cycle count against `[1, MAX_CYCLE_EDIT]`.
pub fn validate_cycle_count(n: u32) -> Result<u32, EditError> {
    if (1..=MAX_CYCLE_EDIT).contains(&n) {
        Ok(n)
    } else {
        Err(EditError::InvalidCycleCount(n.to_string()))
    }
}

/// Parses a user-entered cycle count; fractions and non-numbers are rejected.
pub fn parse_cycle_count(input: &str) -> Result<u32, EditError> {
    let trimmed = input.trim();
    let n: u32 = trimmed
        .parse()
        .map_err(|_| EditError::InvalidCycleCount(trimmed.to_string()))?;
    validate_cycle_count(n)
}

/// Moves keys `> start` up by `n`.
pub fn shift_for_insert<V>(map: &mut BTreeMap<u32, V>, start: u32, n: u32) {
    let tail = map.split_off(&start.saturating_add(1));
    for (k, v) in tail {
        map.insert(k.saturating_add(n), v);
    }
}

/// Drops keys in `[start, start + n)` and moves later keys down by `n`.
pub fn shift_for_delete<V>(map: &mut BTreeMap<u32, V>, start: u32, n: u32) {
    let mut tail = map.split_off(&start);
    let keep = tail.split_off(&start.saturating_add(n));
    for (k, v) in keep {
        map.insert(k - n, v);
    }
}

fn insert_anchor(anchor: &mut Anchor, scope: &CycleScope, start: u32, n: u32) {
    if scope.includes(&anchor.signal) && anchor.cycle > start {
        anchor.cycle = anchor.cycle.saturating_add(n);
    }
}

/// Shifts an anchor for a deletion; `false` when it falls inside the range.
fn delete_anchor(anchor: &mut Anchor, scope: &CycleScope, start: u32, n: u32) -> bool {
    if !scope.includes(&anchor.signal) || anchor.cycle < start {
        return true;
    }
    if anchor.cycle < start.saturating_add(n) {
        return false;
    }
    anchor.cycle -= n;
    true
}

impl Diagram {
    fn check_cycle_edit(&self, scope: &CycleScope, start: u32, n: u32) -> Result<(), EditError> {
        validate_cycle_count(n)?;
        self.check_cycle(start)?;
        if let CycleScope::Signal(name) = scope {
            if !self.signals.contains_key(name) {
                return Err(EditError::UnknownSignal(name.clone()));
            }
        }
        Ok(())
    }

    /// Inserts `n` cycles after `start` and grows the diagram by `n`.
    pub fn insert_cycles(&mut self, scope: &CycleScope, start: u32, n: u32) -> Result<(), EditError> {
        self.check_cycle_edit(scope, start, n)?;
        for signal in self.signals.values_mut() {
            if scope.includes(&signal.name) {
                shift_for_insert(&mut signal.values, start, n);
                shift_for_insert(&mut signal.cycle_options, start, n);
            }
        }
        for m in self.measures.values_mut() {
            insert_anchor(&mut m.from, scope, start, n);
            insert_anchor(&mut m.to, scope, start, n);
        }
        for a in self.arrows.values_mut() {
            insert_anchor(&mut a.from, scope, start, n);
            insert_anchor(&mut a.to, scope, start, n);
        }
        if *scope == CycleScope::Global {
            for c in self.counters.values_mut() {
                shift_for_insert(&mut c.values, start, n);
            }
        }
        self.config.cycles = self.config.cycles.saturating_add(n);
        debug!(?scope, start, n, cycles = self.config.cycles, "inserted cycles");
        self.refresh_cross_references();
        Ok(())
    }

    /// Deletes `n` cycles starting at `start`.
    ///
    /// Annotations anchored inside the range are removed with their rows;
    /// the diagram's cycle count is left unchanged.
    pub fn delete_cycles(
        &mut self,
        scope: &CycleScope,
        start: u32,
        n: u32,
    ) -> Result<CycleEdit, EditError> {
        self.check_cycle_edit(scope, start, n)?;
        for signal in self.signals.values_mut() {
            if scope.includes(&signal.name) {
                shift_for_delete(&mut signal.values, start, n);
                shift_for_delete(&mut signal.cycle_options, start, n);
            }
        }
        let mut edit = CycleEdit::default();
        for m in self.measures.values_mut() {
            let keep_from = delete_anchor(&mut m.from, scope, start, n);
            let keep_to = delete_anchor(&mut m.to, scope, start, n);
            if !(keep_from && keep_to) {
                edit.purged_measures.push(m.name.clone());
            }
        }
        for a in self.arrows.values_mut() {
            let keep_from = delete_anchor(&mut a.from, scope, start, n);
            let keep_to = delete_anchor(&mut a.to, scope, start, n);
            if !(keep_from && keep_to) {
                edit.purged_arrows.push(a.name.clone());
            }
        }
        for name in &edit.purged_measures {
            warn!(measure = %name, "measure anchored in deleted cycles removed");
            let emptied = self.remove_measure(name);
            edit.removed_groups.extend(emptied);
        }
        for name in &edit.purged_arrows {
            warn!(arrow = %name, "arrow anchored in deleted cycles removed");
            self.arrows.remove(name);
        }
        if *scope == CycleScope::Global {
            for c in self.counters.values_mut() {
                shift_for_delete(&mut c.values, start, n);
            }
        }
        debug!(
            ?scope,
            start,
            n,
            purged = edit.purged_measures.len() + edit.purged_arrows.len(),
            "deleted cycles"
        );
        self.refresh_cross_references();
        Ok(edit)
    }
}
