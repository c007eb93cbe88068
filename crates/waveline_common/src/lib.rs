//! Shared foundational types used across the Waveline timing-diagram editor.
//!
//! This crate provides 4-state logic values, the per-cycle cell value stored in
//! signal timelines, and time units with period parsing.

#![warn(missing_docs)]

pub mod logic;
pub mod time;
pub mod value;

pub use logic::Logic;
pub use time::{ParsePeriodError, Period, TimeUnit};
pub use value::Value;
