//! Per-session forecast state.
//!
//! One interactive session holds at most one completed forecast (the result
//! rows plus the fitted model that produced them). The components view reads
//! this state instead of refitting; reading before any successful forecast is
//! a workflow error (`NoModelAvailable`), rendered as a warning that sends
//! the user back to the forecast step.
//!
//! A new forecast overwrites the previous one wholesale, so the state can
//! never hold a forecast and a model from different fits.

use crate::domain::Forecast;
use crate::error::{AppError, ErrorKind};
use crate::fit::FittedModel;

/// A completed forecast and the model that produced it.
#[derive(Debug, Clone)]
pub struct ForecastOutcome<M> {
    pub forecast: Forecast,
    pub model: M,
}

/// Session-scoped store for the latest forecast outcome.
#[derive(Debug, Clone)]
pub struct SessionState<M> {
    outcome: Option<ForecastOutcome<M>>,
}

impl<M> Default for SessionState<M> {
    fn default() -> Self {
        Self { outcome: None }
    }
}

impl<M: FittedModel> SessionState<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful forecast, replacing any previous one.
    pub fn store(&mut self, forecast: Forecast, model: M) {
        self.outcome = Some(ForecastOutcome { forecast, model });
    }

    /// Whether a successful forecast exists in this session.
    pub fn has_forecast(&self) -> bool {
        self.outcome.is_some()
    }

    /// The latest outcome, or `NoModelAvailable` when none exists yet.
    pub fn get(&self) -> Result<&ForecastOutcome<M>, AppError> {
        self.outcome.as_ref().ok_or_else(|| {
            AppError::new(
                ErrorKind::NoModelAvailable,
                "No forecast available yet. Generate a forecast first from the Forecast view.",
            )
        })
    }
}
