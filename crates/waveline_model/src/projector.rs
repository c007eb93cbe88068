//! Pixel geometry for the renderer.
//!
//! x grows with cycles from the right edge of the name column; y grows with
//! rows from the bottom of the header. Points on a signal are placed at the
//! vertical center of its row.

use glam::DVec2;
use tracing::warn;

use crate::annotations::{AcEntry, Anchor, Edge};
use crate::diagram::Diagram;
use crate::rows::RowKind;
use crate::signal::Signal;
use crate::xref::DanglingRef;

/// Projected endpoints of a measure and the row it is drawn on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasureGeometry {
    /// First endpoint.
    pub from: DVec2,
    /// Second endpoint.
    pub to: DVec2,
    /// Vertical center of the measure's row.
    pub row_y: f64,
    /// Horizontal position of the label.
    pub text_x: f64,
}

/// Projected endpoints and absolute control points of an arrow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowGeometry {
    /// Tail.
    pub from: DVec2,
    /// Head.
    pub to: DVec2,
    /// Control points, absolute.
    pub ctrl: [DVec2; 2],
}

/// Read-only view computing pixel coordinates for a diagram.
#[derive(Clone, Copy, Debug)]
pub struct Projector<'a> {
    diagram: &'a Diagram,
}

impl Diagram {
    /// A projector over this diagram.
    pub fn projector(&self) -> Projector<'_> {
        Projector { diagram: self }
    }
}

impl<'a> Projector<'a> {
    /// Wraps a diagram.
    pub fn new(diagram: &'a Diagram) -> Self {
        Self { diagram }
    }

    fn signal(&self, name: &str) -> Result<&'a Signal, DanglingRef> {
        self.diagram
            .signal_by_name(name)
            .ok_or_else(|| DanglingRef::lookup(name))
    }

    /// Cycle width of a signal's clock domain; the global width for unknown
    /// names.
    pub fn cycle_width_for(&self, signal: &str) -> f64 {
        self.diagram
            .cycle_width_for(self.diagram.signal_by_name(signal))
    }

    /// Unshifted x of the start of `cycle` on the global grid.
    pub fn grid_x(&self, cycle: u32) -> f64 {
        let config = self.diagram.config();
        config.name_column_width + f64::from(cycle) * config.cycle_width
    }

    /// x of a signal's transition at `cycle`, falling back to the global
    /// grid when the signal does not exist.
    pub fn x_for_transition(&self, signal: &str, cycle: u32, edge: Edge) -> f64 {
        self.try_x_for_transition(signal, cycle, edge)
            .unwrap_or_else(|err| {
                warn!("{err}");
                self.grid_x(cycle)
            })
    }

    /// x of a signal's transition at `cycle`.
    ///
    /// Starts from the cycle boundary in the signal's domain width, then
    /// adds the clock phase (clocks), half a cycle (falling edges), the
    /// resolved minimum delay, and half the slew when a transition actually
    /// happens there.
    pub fn try_x_for_transition(
        &self,
        signal: &str,
        cycle: u32,
        edge: Edge,
    ) -> Result<f64, DanglingRef> {
        let s = self.signal(signal)?;
        let d = self.diagram;
        let width = d.cycle_width_for(Some(s));
        let mut x = d.config().name_column_width + f64::from(cycle) * width;
        if s.is_clock() {
            x += s.phase_fraction() * width;
        }
        if edge == Edge::Falling {
            x += width / 2.0;
        }
        x += d.effective_delay(Some(s), cycle).min;
        let transition = match edge {
            Edge::Rising => s.is_transition(cycle),
            Edge::Falling => s.is_clock(),
        };
        if transition {
            x += d.effective_slew(Some(s), cycle) / 2.0;
        }
        Ok(x)
    }

    /// Vertical center of row `row`.
    pub fn y_for_row(&self, row: usize) -> f64 {
        let config = self.diagram.config();
        config.header_height + row as f64 * config.row_height + config.row_height / 2.0
    }

    /// Vertical center of a signal's row, row 0 when it does not exist.
    pub fn y_for_signal(&self, signal: &str) -> f64 {
        self.try_y_for_signal(signal).unwrap_or_else(|err| {
            warn!("{err}");
            self.y_for_row(0)
        })
    }

    /// Vertical center of a signal's row.
    pub fn try_y_for_signal(&self, signal: &str) -> Result<f64, DanglingRef> {
        let row = self
            .diagram
            .rows()
            .position(RowKind::Signal, signal)
            .ok_or_else(|| DanglingRef::lookup(signal))?;
        Ok(self.y_for_row(row))
    }

    /// The point an anchor sits on.
    pub fn point_for(&self, anchor: &Anchor) -> DVec2 {
        DVec2::new(
            self.x_for_transition(&anchor.signal, anchor.cycle, anchor.edge),
            self.y_for_signal(&anchor.signal),
        )
    }

    /// The point an anchor sits on, or why it cannot be resolved.
    pub fn try_point_for(&self, anchor: &Anchor) -> Result<DVec2, DanglingRef> {
        Ok(DVec2::new(
            self.try_x_for_transition(&anchor.signal, anchor.cycle, anchor.edge)?,
            self.try_y_for_signal(&anchor.signal)?,
        ))
    }

    /// Geometry of a measure, `None` for unknown names.
    pub fn measure_geometry(&self, name: &str) -> Option<MeasureGeometry> {
        let m = self.diagram.measure(name)?;
        let from = self.point_for(&m.from);
        let to = self.point_for(&m.to);
        let row = m
            .measure_row
            .or_else(|| self.diagram.measure_row_index(name))
            .unwrap_or(0);
        Some(MeasureGeometry {
            from,
            to,
            row_y: self.y_for_row(row),
            text_x: m.text_x.unwrap_or((from.x + to.x) / 2.0),
        })
    }

    /// Geometry of an arrow, `None` for unknown names.
    pub fn arrow_geometry(&self, name: &str) -> Option<ArrowGeometry> {
        let a = self.diagram.arrow(name)?;
        let from = self.point_for(&a.from);
        let to = self.point_for(&a.to);
        let [c0, c1] = a.ctrl;
        Some(ArrowGeometry {
            from,
            to,
            ctrl: [from + DVec2::new(c0.dx, c0.dy), to + DVec2::new(c1.dx, c1.dy)],
        })
    }

    /// Time of an anchor after the start of cycle 0, in the global period
    /// unit: the cycle boundary in the signal's domain, the clock phase, half
    /// a period for falling edges and the resolved minimum delay. Slew is a
    /// drawing width and does not count.
    pub fn time_for(&self, anchor: &Anchor) -> f64 {
        let d = self.diagram;
        let Ok(s) = self.signal(&anchor.signal) else {
            return f64::from(anchor.cycle) * d.config().clock_period;
        };
        let period = d.domain_period(s);
        let mut t = f64::from(anchor.cycle) * period;
        if s.is_clock() {
            t += s.phase_fraction() * period;
        }
        if anchor.edge == Edge::Falling {
            t += period / 2.0;
        }
        t + d.effective_delay_in_time(Some(s), anchor.cycle).min
    }

    /// Time between a measure's endpoints in the global period unit.
    pub fn measure_duration(&self, name: &str) -> Option<f64> {
        let m = self.diagram.measure(name)?;
        Some((self.time_for(&m.to) - self.time_for(&m.from)).abs())
    }

    /// Derived value of an AC table entry.
    pub fn ac_entry_value(&self, entry: &AcEntry) -> Option<f64> {
        self.measure_duration(&entry.measure)
    }
}
