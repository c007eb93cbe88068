//! Signals: clocks, bits and buses, with their per-signal and per-cycle
//! drawing options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use waveline_common::{Logic, Period, TimeUnit, Value};

/// What a signal row draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// A free-running clock; edges come from period and phase.
    Clock,
    /// A single-bit waveform.
    Bit,
    /// A multi-bit bus drawn as labelled segments.
    Bus,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalKind::Clock => "clock",
            SignalKind::Bit => "bit",
            SignalKind::Bus => "bus",
        })
    }
}

/// Per-cycle overrides of the slew/delay cascade.
///
/// Each attribute overrides independently: setting only `delay_max` leaves
/// `delay_min` and `delay_color` to the signal or global level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOptions {
    /// Transition slew in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slew: Option<f64>,
    /// Minimum delay in time units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_min: Option<f64>,
    /// Maximum delay in time units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_max: Option<f64>,
    /// Delay window color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_color: Option<String>,
}

impl CycleOptions {
    /// Returns `true` when no attribute is overridden.
    pub fn is_empty(&self) -> bool {
        self.slew.is_none()
            && self.delay_min.is_none()
            && self.delay_max.is_none()
            && self.delay_color.is_none()
    }
}

/// One waveform.
///
/// `name` and `kind` are fixed once the signal is in a diagram; renames go
/// through [`Diagram::rename_signal`](crate::Diagram::rename_signal) so that
/// anchors follow.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    pub(crate) name: String,
    pub(crate) kind: SignalKind,
    /// Sparse cycle → value map; empty for clocks.
    pub(crate) values: BTreeMap<u32, Value>,
    /// Clock driving this bit/bus signal.
    pub base_clock: Option<String>,
    /// Per-cycle option overrides.
    pub(crate) cycle_options: BTreeMap<u32, CycleOptions>,
    /// Signal-level slew override (pixels).
    pub slew: Option<f64>,
    /// Signal-level minimum delay override (time units).
    pub delay_min: Option<f64>,
    /// Signal-level maximum delay override (time units).
    pub delay_max: Option<f64>,
    /// Signal-level delay color override.
    pub delay_color: Option<String>,
    /// Clock period magnitude (clocks only).
    pub period: Option<f64>,
    /// Unit of `period`; the diagram's unit when absent.
    pub period_unit: Option<TimeUnit>,
    /// Clock phase as a fraction of the period, in `[0, 1]` (clocks only).
    pub phase: Option<f64>,
}

impl Signal {
    /// Creates a signal. Bit and bus signals are seeded with their default
    /// value at cycle 0.
    pub fn new(name: impl Into<String>, kind: SignalKind) -> Self {
        let mut values = BTreeMap::new();
        if kind != SignalKind::Clock {
            values.insert(0, default_value(kind));
        }
        Self {
            name: name.into(),
            kind,
            values,
            base_clock: None,
            cycle_options: BTreeMap::new(),
            slew: None,
            delay_min: None,
            delay_max: None,
            delay_color: None,
            period: None,
            period_unit: None,
            phase: None,
        }
    }

    /// A clock with an explicit period.
    pub fn clock(name: impl Into<String>, period: Option<Period>) -> Self {
        let mut s = Self::new(name, SignalKind::Clock);
        if let Some(p) = period {
            s.period = Some(p.value);
            s.period_unit = Some(p.unit);
        }
        s
    }

    /// A bit signal starting at `0`.
    pub fn bit(name: impl Into<String>) -> Self {
        Self::new(name, SignalKind::Bit)
    }

    /// A bus signal starting at `X`.
    pub fn bus(name: impl Into<String>) -> Self {
        Self::new(name, SignalKind::Bus)
    }

    /// Builder form of [`Signal::set_value`] for constructing fixtures;
    /// values that do not fit the kind are ignored.
    pub fn with_value(mut self, cycle: u32, value: impl Into<Value>) -> Self {
        let _ = self.set_value(cycle, value.into());
        self
    }

    /// Builder form setting `base_clock`.
    pub fn with_base_clock(mut self, clock: impl Into<String>) -> Self {
        self.base_clock = Some(clock.into());
        self
    }

    /// The unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clock, bit or bus.
    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Returns `true` for clocks.
    pub fn is_clock(&self) -> bool {
        self.kind == SignalKind::Clock
    }

    /// The stored sparse values.
    pub fn values(&self) -> &BTreeMap<u32, Value> {
        &self.values
    }

    /// The stored per-cycle overrides.
    pub fn cycle_options(&self) -> &BTreeMap<u32, CycleOptions> {
        &self.cycle_options
    }

    /// The override stored at `cycle`, if any.
    pub fn cycle_option(&self, cycle: u32) -> Option<&CycleOptions> {
        self.cycle_options.get(&cycle)
    }

    /// Stores an override at `cycle`; an empty override removes the entry.
    pub fn set_cycle_options(&mut self, cycle: u32, options: CycleOptions) {
        if options.is_empty() {
            self.cycle_options.remove(&cycle);
        } else {
            self.cycle_options.insert(cycle, options);
        }
    }

    /// Removes the override at `cycle`.
    pub fn clear_cycle_options(&mut self, cycle: u32) -> Option<CycleOptions> {
        self.cycle_options.remove(&cycle)
    }

    /// The clock period, falling back to `unit` when only a magnitude is set.
    pub fn period_in(&self, default_unit: TimeUnit) -> Option<Period> {
        self.period
            .map(|v| Period::new(v, self.period_unit.unwrap_or(default_unit)))
    }

    /// Clock phase clamped to `[0, 1]`; `0` when unset or not finite.
    pub fn phase_fraction(&self) -> f64 {
        match self.phase {
            Some(p) if p.is_finite() => p.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Value in force before the first stored entry: `0` for bits, `X` for buses.
pub(crate) fn default_value(kind: SignalKind) -> Value {
    match kind {
        SignalKind::Bus => Value::X,
        SignalKind::Bit | SignalKind::Clock => Value::Logic(Logic::Zero),
    }
}
