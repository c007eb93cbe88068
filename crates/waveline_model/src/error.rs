//! Error types for diagram editing and document persistence.
//!
//! [`EditError`] covers user input that is rejected before any mutation takes
//! place; the calling dialog shows the message and stays open. Stale
//! references are not errors here: they degrade to fallbacks (see
//! [`crate::xref::DanglingRef`]).

use std::io;

use crate::rows::RowKind;

/// A rejected edit. The diagram is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// A signal or row name was empty or whitespace.
    #[error("name must not be empty")]
    EmptyName,

    /// Another item of the same kind already uses the name.
    #[error("a {kind} named '{name}' already exists")]
    DuplicateName {
        /// Kind of the clashing item.
        kind: RowKind,
        /// The clashing name.
        name: String,
    },

    /// No signal with this name exists.
    #[error("unknown signal '{0}'")]
    UnknownSignal(String),

    /// No item of this kind with this name exists.
    #[error("unknown {kind} '{name}'")]
    UnknownItem {
        /// Kind of the missing item.
        kind: RowKind,
        /// The missing name.
        name: String,
    },

    /// No arrow with this name exists.
    #[error("unknown arrow '{0}'")]
    UnknownArrow(String),

    /// Cycle counts for insert/delete must be whole numbers in `[1, 50]`.
    #[error("cycle count must be a whole number between 1 and 50, got {0}")]
    InvalidCycleCount(String),

    /// A cycle index outside `[0, cycles)`.
    #[error("cycle {cycle} is outside the diagram (0..{cycles})")]
    CycleOutOfRange {
        /// The offending cycle.
        cycle: u32,
        /// The diagram's cycle count.
        cycles: u32,
    },

    /// Measures need a label.
    #[error("measure label must not be empty")]
    MissingLabel,

    /// Clock waveforms are computed from period and phase, not edited.
    #[error("clock signal '{0}' has no editable values")]
    NotEditable(String),

    /// The value does not fit the signal kind (e.g. a bus label on a bit).
    #[error("value '{value}' is not valid for signal '{signal}'")]
    KindMismatch {
        /// Target signal.
        signal: String,
        /// The rejected value, as displayed.
        value: String,
    },

    /// `base_clock` must name a clock signal.
    #[error("'{0}' is not a clock signal")]
    NotAClock(String),

    /// A row index past the end of the directory.
    #[error("row {row} does not exist ({rows} rows)")]
    RowOutOfRange {
        /// The offending index.
        row: usize,
        /// Number of rows.
        rows: usize,
    },

    /// Control point index other than 0 or 1.
    #[error("arrow control point {0} does not exist")]
    NoSuchControlPoint(usize),

    /// A gesture step arrived in a state that does not accept it.
    #[error("{0}")]
    UnexpectedGesture(&'static str),
}

/// Errors raised while reading or writing diagram documents.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing the document file failed.
    #[error("document I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document is not valid JSON or does not match any known layout.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document was written by a newer format version.
    #[error("unsupported document version '{0}'")]
    UnsupportedVersion(String),

    /// The document parsed but its content is inconsistent.
    #[error("invalid document: {0}")]
    Invalid(String),
}
