//! Value timelines: sparse cycle maps with hold-last-value lookup.
//!
//! A signal stores a value only at the cycles where the user set one. The
//! value in force at any cycle is the entry at the greatest key not after it,
//! so inserted cycles automatically continue the previous state.

use waveline_common::{Logic, Value};

use crate::error::EditError;
use crate::signal::{default_value, Signal, SignalKind};

impl Signal {
    /// Value in force before the first entry: `0` for bits, `X` for buses.
    pub fn default_value(&self) -> Value {
        default_value(self.kind)
    }

    /// Returns the value in force at `cycle`.
    ///
    /// Clocks report `1`, the level just after the rising edge that starts
    /// every cycle.
    pub fn value_at(&self, cycle: u32) -> Value {
        if self.kind == SignalKind::Clock {
            return Value::Logic(Logic::One);
        }
        self.values
            .range(..=cycle)
            .next_back()
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_value())
    }

    /// Overwrites the entry at `cycle`.
    ///
    /// Bit signals accept logic levels (and the labels `"0"`/`"1"`); bus
    /// signals accept labels and `X`/`Z`, with `0`/`1` stored as labels.
    pub fn set_value(&mut self, cycle: u32, value: Value) -> Result<(), EditError> {
        let value = self.coerce(value)?;
        self.values.insert(cycle, value);
        Ok(())
    }

    /// Deletes the entry at `cycle` together with any option override there.
    pub fn clear_value(&mut self, cycle: u32) -> Option<Value> {
        self.cycle_options.remove(&cycle);
        self.values.remove(&cycle)
    }

    /// Flips the bit in force at `cycle` and stores the result there.
    pub fn toggle(&mut self, cycle: u32) -> Result<Value, EditError> {
        match self.kind {
            SignalKind::Bit => {
                let current = self.value_at(cycle).as_logic().unwrap_or(Logic::Zero);
                let next = Value::Logic(current.toggled());
                self.values.insert(cycle, next.clone());
                Ok(next)
            }
            SignalKind::Clock => Err(EditError::NotEditable(self.name.clone())),
            SignalKind::Bus => Err(EditError::KindMismatch {
                signal: self.name.clone(),
                value: "toggle".to_string(),
            }),
        }
    }

    /// Returns `true` when a real transition starts at `cycle`: the value
    /// differs from the previous cycle and neither side is `X` or `Z`.
    ///
    /// Every clock cycle starts with a transition.
    pub fn is_transition(&self, cycle: u32) -> bool {
        if self.kind == SignalKind::Clock {
            return true;
        }
        if cycle == 0 {
            return false;
        }
        let prev = self.value_at(cycle - 1);
        let cur = self.value_at(cycle);
        prev != cur && !prev.is_unknown() && !cur.is_unknown()
    }

    /// Cycles (ascending) where the drawn value changes, including unknowns.
    pub fn change_cycles(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut prev: Option<&Value> = None;
        for (cycle, value) in &self.values {
            if prev != Some(value) {
                out.push(*cycle);
            }
            prev = Some(value);
        }
        out
    }

    /// Normalizes a value to this signal's kind or rejects it.
    pub(crate) fn coerce(&self, value: Value) -> Result<Value, EditError> {
        let mismatch = |v: &Value| EditError::KindMismatch {
            signal: self.name.clone(),
            value: v.to_string(),
        };
        match (self.kind, value) {
            (SignalKind::Clock, _) => Err(EditError::NotEditable(self.name.clone())),
            (SignalKind::Bit, Value::Logic(l)) => Ok(Value::Logic(l)),
            (SignalKind::Bit, Value::Data(s)) => Logic::from_str_exact(s.trim())
                .map(Value::Logic)
                .ok_or_else(|| mismatch(&Value::Data(s))),
            (SignalKind::Bus, Value::Logic(l)) if l.is_unknown() => Ok(Value::Logic(l)),
            (SignalKind::Bus, Value::Logic(l)) => Ok(Value::Data(l.to_string())),
            (SignalKind::Bus, Value::Data(s)) => Ok(Value::from(s.as_str())),
        }
    }
}
