//! Forecast fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate Fourier-order grids per model structure
//! - evaluate each candidate order tuple (parallel)
//! - select the best structure using BIC + guardrails
//! - expose the `Forecaster`/`FittedModel` capability seam

pub mod fitter;
pub mod forecaster;
pub mod order_grid;
pub mod selection;

pub use fitter::*;
pub use forecaster::*;
pub use order_grid::*;
pub use selection::*;
