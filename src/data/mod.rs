//! Built-in datasets: the canonical sample fixture and synthetic generation.

pub mod sample;

pub use sample::*;
