//! Terminal plotting for non-interactive runs.

pub mod ascii;

pub use ascii::*;
