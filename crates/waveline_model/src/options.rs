//! Slew and delay resolution.
//!
//! Each attribute resolves independently through three levels: the cycle
//! override on the signal, the signal's own setting, then the diagram
//! config. Delays are stored in units of the global clock period's unit and
//! projected to pixels with the global cycle width.

use waveline_common::TimeUnit;

use crate::diagram::Diagram;
use crate::signal::Signal;

/// A resolved delay window in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Delay {
    /// Earliest shift of the transition.
    pub min: f64,
    /// Latest shift of the transition.
    pub max: f64,
    /// Window color.
    pub color: String,
}

/// A resolved delay window in time units, before projection.
#[derive(Clone, Debug, PartialEq)]
pub struct DelayTime {
    /// Minimum delay.
    pub min: f64,
    /// Maximum delay.
    pub max: f64,
    /// Unit of `min` and `max`.
    pub unit: TimeUnit,
    /// Window color.
    pub color: String,
}

impl Diagram {
    /// The clock whose timebase `signal` lives in.
    ///
    /// A clock is its own domain. Bit and bus signals use their base clock,
    /// or the first clock in row order when none is set or it is stale.
    pub fn domain_clock<'a>(&'a self, signal: &'a Signal) -> Option<&'a Signal> {
        if signal.is_clock() {
            return Some(signal);
        }
        signal
            .base_clock
            .as_deref()
            .and_then(|name| self.signals.get(name))
            .filter(|s| s.is_clock())
            .or_else(|| self.first_clock())
    }

    /// Period of a signal's clock domain in the global unit; the global
    /// period when the domain clock has none.
    pub fn domain_period(&self, signal: &Signal) -> f64 {
        let unit = self.config.clock_period_unit;
        self.domain_clock(signal)
            .and_then(|clock| clock.period_in(unit))
            .filter(|p| p.is_positive())
            .map(|p| p.in_unit(unit))
            .unwrap_or(self.config.clock_period)
    }

    /// Pixel width of one cycle in a signal's clock domain.
    pub fn cycle_width_for(&self, signal: Option<&Signal>) -> f64 {
        let global = self.config.clock_period;
        match signal {
            Some(s) if global > 0.0 => self.config.cycle_width * self.domain_period(s) / global,
            _ => self.config.cycle_width,
        }
    }

    /// Transition slew in pixels: cycle override, then signal, then global.
    /// An absent signal has no slew.
    pub fn effective_slew(&self, signal: Option<&Signal>, cycle: u32) -> f64 {
        let Some(s) = signal else {
            return 0.0;
        };
        s.cycle_option(cycle)
            .and_then(|o| o.slew)
            .or(s.slew)
            .unwrap_or(self.config.slew)
    }

    /// Delay window in time units.
    ///
    /// Bit and bus signals additionally inherit the phase offset of their
    /// domain clock.
    pub fn effective_delay_in_time(&self, signal: Option<&Signal>, cycle: u32) -> DelayTime {
        let unit = self.config.clock_period_unit;
        let Some(s) = signal else {
            return DelayTime {
                min: 0.0,
                max: 0.0,
                unit,
                color: self.config.delay_color.clone(),
            };
        };
        let cycle_opt = s.cycle_option(cycle);
        let mut min = cycle_opt
            .and_then(|o| o.delay_min)
            .or(s.delay_min)
            .unwrap_or(self.config.delay_min);
        let mut max = cycle_opt
            .and_then(|o| o.delay_max)
            .or(s.delay_max)
            .unwrap_or(self.config.delay_max);
        let color = cycle_opt
            .and_then(|o| o.delay_color.clone())
            .or_else(|| s.delay_color.clone())
            .unwrap_or_else(|| self.config.delay_color.clone());
        if !s.is_clock() {
            if let Some(clock) = self.domain_clock(s) {
                let phase = clock.phase_fraction() * self.domain_period(s);
                min += phase;
                max += phase;
            }
        }
        DelayTime {
            min,
            max,
            unit,
            color,
        }
    }

    /// Delay window in pixels: `value / clock_period * cycle_width`.
    pub fn effective_delay(&self, signal: Option<&Signal>, cycle: u32) -> Delay {
        let time = self.effective_delay_in_time(signal, cycle);
        let period = self.config.clock_period;
        if period <= 0.0 {
            return Delay {
                min: 0.0,
                max: 0.0,
                color: time.color,
            };
        }
        let scale = self.config.cycle_width / period;
        Delay {
            min: time.min * scale,
            max: time.max * scale,
            color: time.color,
        }
    }
}
