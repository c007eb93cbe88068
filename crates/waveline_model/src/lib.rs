//! The editing core of the Waveline timing-diagram editor.
//!
//! A [`Diagram`] owns signals and annotation data in typed maps keyed by
//! stable names, while a [`RowDirectory`] records only their visual order.
//! Measures and arrows anchor to signal names plus cycle numbers, so rows can
//! be reordered, inserted and deleted freely; the cached row positions are
//! re-derived after every structural change.
//!
//! # Layers
//!
//! - **Value timeline** ([`timeline`]): sparse, hold-last-value cycle maps
//! - **Option cascade** ([`options`]): slew and delay, cycle > signal > global
//! - **Row directory** ([`rows`]): ordered typed row references
//! - **Cross references** ([`xref`]): name-anchored measures and arrows
//! - **Cycle engine** ([`cycles`]): insert/delete cycles, shifting everything
//! - **Projector** ([`projector`]): pixel geometry for the renderer
//! - **Gestures** ([`gesture`]): multi-click placement and drag state machine
//! - **Persistence** ([`persist`]): JSON documents, including legacy layouts

#![warn(missing_docs)]

pub mod annotations;
pub mod cycles;
pub mod diagram;
pub mod error;
pub mod gesture;
pub mod integrity;
pub mod options;
pub mod persist;
pub mod projector;
pub mod rows;
pub mod signal;
pub mod timeline;
pub mod xref;

pub use annotations::{
    AcEntry, AcTable, Anchor, Arrow, ControlPoint, Counter, CycleNumbers, Edge, Group, Measure,
    TextRow,
};
pub use cycles::{parse_cycle_count, validate_cycle_count, CycleEdit, CycleScope, MAX_CYCLE_EDIT};
pub use diagram::Diagram;
pub use error::{EditError, PersistError};
pub use gesture::{Gesture, GestureStep};
pub use integrity::IntegrityIssue;
pub use options::{Delay, DelayTime};
pub use persist::{from_json, load_file, save_file, to_json, FORMAT_VERSION};
pub use projector::{ArrowGeometry, MeasureGeometry, Projector};
pub use rows::{RowDirectory, RowHit, RowKind, RowRef};
pub use signal::{CycleOptions, Signal, SignalKind};
pub use xref::{DanglingPolicy, DanglingRef, RefOwner};

pub use waveline_common::{Logic, Period, TimeUnit, Value};
pub use waveline_config::DiagramConfig;
