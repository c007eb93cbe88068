//! Multi-step pointer gestures.
//!
//! A gesture collects clicks until it has everything it needs, then commits
//! one edit to the diagram. Intermediate steps and [`Gesture::cancel`] never
//! touch the diagram.

use tracing::debug;

use crate::annotations::Anchor;
use crate::diagram::Diagram;
use crate::error::EditError;

/// The current gesture.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Placing a measure: two endpoints, then a row.
    PlacingMeasure {
        /// Label entered before the first click.
        text: String,
        /// First endpoint once picked.
        first: Option<Anchor>,
        /// Second endpoint once picked.
        second: Option<Anchor>,
    },
    /// Placing an arrow: tail, then head.
    PlacingArrow {
        /// Tail once picked.
        first: Option<Anchor>,
    },
    /// Dragging a row to a new position.
    Dragging {
        /// Row being dragged.
        row: usize,
    },
}

/// Outcome of feeding a step to a gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureStep {
    /// More input is needed.
    Pending,
    /// The edit was applied; carries the name of the created or moved item.
    Committed(String),
}

impl Gesture {
    /// Returns `true` when no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        *self == Gesture::Idle
    }

    /// Starts placing a measure. The label is required up front.
    pub fn begin_measure(&mut self, text: &str) -> Result<(), EditError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EditError::MissingLabel);
        }
        *self = Gesture::PlacingMeasure {
            text: text.to_string(),
            first: None,
            second: None,
        };
        Ok(())
    }

    /// Starts placing an arrow.
    pub fn begin_arrow(&mut self) {
        *self = Gesture::PlacingArrow { first: None };
    }

    /// Starts dragging row `row`.
    pub fn begin_drag(&mut self, row: usize) {
        *self = Gesture::Dragging { row };
    }

    /// Abandons the gesture.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!("gesture cancelled");
        }
        *self = Gesture::Idle;
    }

    /// Feeds a clicked waveform point.
    ///
    /// The second arrow point commits the arrow. Measures wait for a row.
    pub fn pick_point(
        &mut self,
        diagram: &mut Diagram,
        anchor: Anchor,
    ) -> Result<GestureStep, EditError> {
        match self {
            Gesture::PlacingMeasure { first, second, .. } => {
                if first.is_none() {
                    *first = Some(anchor);
                } else if second.is_none() {
                    *second = Some(anchor);
                } else {
                    return Err(EditError::UnexpectedGesture("pick a row for the measure"));
                }
                Ok(GestureStep::Pending)
            }
            Gesture::PlacingArrow { first } => match first.take() {
                None => {
                    *first = Some(anchor);
                    Ok(GestureStep::Pending)
                }
                Some(tail) => match diagram.add_arrow(tail.clone(), anchor) {
                    Ok(name) => {
                        *self = Gesture::Idle;
                        Ok(GestureStep::Committed(name))
                    }
                    Err(e) => {
                        *first = Some(tail);
                        Err(e)
                    }
                },
            },
            Gesture::Idle | Gesture::Dragging { .. } => {
                Err(EditError::UnexpectedGesture("no point placement in progress"))
            }
        }
    }

    /// Feeds the row a measure is placed on, committing it.
    pub fn pick_row(&mut self, diagram: &mut Diagram, row: usize) -> Result<GestureStep, EditError> {
        let Gesture::PlacingMeasure {
            text,
            first: Some(first),
            second: Some(second),
        } = self
        else {
            return Err(EditError::UnexpectedGesture(
                "a measure needs two points before a row",
            ));
        };
        let name = diagram.add_measure(text, first.clone(), second.clone(), Some(row))?;
        *self = Gesture::Idle;
        Ok(GestureStep::Committed(name))
    }

    /// Drops a dragged row at `to`, committing the move. A stale source row
    /// ends the gesture with an error.
    pub fn drop_at(&mut self, diagram: &mut Diagram, to: usize) -> Result<GestureStep, EditError> {
        let Gesture::Dragging { row } = *self else {
            return Err(EditError::UnexpectedGesture("no row is being dragged"));
        };
        *self = Gesture::Idle;
        match diagram.move_row(row, to) {
            Some(landed) => {
                let name = diagram
                    .rows()
                    .get(landed)
                    .map(|r| r.name().to_string())
                    .unwrap_or_default();
                Ok(GestureStep::Committed(name))
            }
            None => Err(EditError::RowOutOfRange {
                row,
                rows: diagram.rows().total_rows(),
            }),
        }
    }
}
