//! Reporting utilities: run summaries, forecast tables, components text.

pub mod format;

pub use format::*;
