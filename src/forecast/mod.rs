//! Closed-loop forecast rollout.
//!
//! A predictor maps a window of the last K scaled values to the next scaled
//! value. The rollout feeds every scaled prediction back into the window,
//! so later steps are conditioned on earlier predictions and errors
//! compound over the horizon.

use thiserror::Error;

use crate::data::model::Observation;
use crate::error::DashboardError;

pub mod model;
pub mod scaler;

pub use model::{load_artifacts, ModelArtifact};
pub use scaler::{IdentityScaler, MinMaxScaler, Scaler};

/// Illustrative GDP path (billion USD) shown when no model can be loaded.
pub const FALLBACK_GDP_BILLIONS: [f64; 10] = [
    465.8, 485.2, 506.1, 528.4, 552.0, 577.1, 603.7, 631.9, 661.8, 693.5,
];

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("need at least {needed} history values, got {got}")]
    InsufficientHistory { needed: usize, got: usize },
    #[error("model window length must be positive")]
    EmptyWindow,
    #[error("prediction at step {step} is not a finite number")]
    NonFinite { step: usize },
}

/// Anything that can predict the next scaled value from a scaled window.
pub trait Predictor {
    /// K, the number of values the model expects.
    fn window_len(&self) -> usize;
    fn predict_one(&self, window: &[f64]) -> f64;
}

// ---------------------------------------------------------------------------
// Rollout
// ---------------------------------------------------------------------------

/// Produce `steps` user-facing predictions from the last `window_len`
/// values of `history`.
///
/// The window lives in scaled space: history is forward-transformed once,
/// each prediction is inverse-transformed for the output, and the scaled
/// prediction (not the inverse one) is pushed into the window.
pub fn rollout<S, F>(
    history: &[f64],
    window_len: usize,
    steps: usize,
    scaler: &S,
    mut predict_one: F,
) -> Result<Vec<f64>, ForecastError>
where
    S: Scaler + ?Sized,
    F: FnMut(&[f64]) -> f64,
{
    if window_len == 0 {
        return Err(ForecastError::EmptyWindow);
    }
    if history.len() < window_len {
        return Err(ForecastError::InsufficientHistory {
            needed: window_len,
            got: history.len(),
        });
    }

    let mut window: Vec<f64> = history[history.len() - window_len..]
        .iter()
        .map(|&v| scaler.transform(v))
        .collect();
    let mut out = Vec::with_capacity(steps);

    for step in 0..steps {
        let next_scaled = predict_one(&window);
        if !next_scaled.is_finite() {
            return Err(ForecastError::NonFinite { step });
        }
        out.push(scaler.inverse_transform(next_scaled));

        window.remove(0);
        window.push(next_scaled);
    }
    Ok(out)
}

/// [`rollout`] driven by a [`Predictor`] implementation.
pub fn rollout_with<P, S>(
    history: &[f64],
    steps: usize,
    predictor: &P,
    scaler: &S,
) -> Result<Vec<f64>, ForecastError>
where
    P: Predictor + ?Sized,
    S: Scaler + ?Sized,
{
    rollout(history, predictor.window_len(), steps, scaler, |w| {
        predictor.predict_one(w)
    })
}

// ---------------------------------------------------------------------------
// Forecast with degraded-mode fallback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub year: i32,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastSource {
    /// Predictions came from the loaded model.
    Live,
    /// The fixed illustrative sequence; `reason` says why.
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    pub points: Vec<ForecastPoint>,
    pub source: ForecastSource,
}

impl ForecastOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ForecastSource::Fallback { .. })
    }
}

/// Uniform `value × (1 ± fraction)` band. Not a statistical interval.
pub fn with_band(first_year: i32, values: &[f64], fraction: f64) -> Vec<ForecastPoint> {
    values
        .iter()
        .zip(first_year..)
        .map(|(&value, year)| ForecastPoint {
            year,
            value,
            lower: value * (1.0 - fraction),
            upper: value * (1.0 + fraction),
        })
        .collect()
}

/// The fallback sequence in USD, truncated to `steps`.
pub fn fallback_values(steps: usize) -> Vec<f64> {
    FALLBACK_GDP_BILLIONS
        .iter()
        .take(steps)
        .map(|b| b * 1e9)
        .collect()
}

/// Forecast `steps` years after the last historical observation.
///
/// `load` produces the predictor and scaler. When it fails, or the rollout
/// cannot run on the given history, the fallback sequence is returned and
/// flagged; this function never fails.
pub fn forecast_or_fallback<L>(
    history: &[Observation],
    steps: usize,
    band_fraction: f64,
    load: L,
) -> ForecastOutcome
where
    L: FnOnce() -> Result<(Box<dyn Predictor>, Box<dyn Scaler>), DashboardError>,
{
    let first_year = history.iter().map(|o| o.year).max().map_or(0, |y| y + 1);
    let values: Vec<f64> = history.iter().map(|o| o.value).collect();

    let live = load().map_err(|e| e.to_string()).and_then(|(predictor, scaler)| {
        rollout_with(&values, steps, predictor.as_ref(), scaler.as_ref()).map_err(|e| e.to_string())
    });

    match live {
        Ok(predictions) => {
            log::info!("forecast of {} steps from live model", predictions.len());
            ForecastOutcome {
                points: with_band(first_year, &predictions, band_fraction),
                source: ForecastSource::Live,
            }
        }
        Err(reason) => {
            log::warn!("forecast falling back to sample sequence: {reason}");
            ForecastOutcome {
                points: with_band(first_year, &fallback_values(steps), band_fraction),
                source: ForecastSource::Fallback { reason },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn worked_example_shifts_window_each_step() {
        let seen = RefCell::new(Vec::new());
        let out = rollout(&[483.0, 501.0, 519.0], 3, 3, &IdentityScaler, |w| {
            seen.borrow_mut().push(w.to_vec());
            w[w.len() - 1] + 18.0
        })
        .unwrap();

        assert_eq!(out, vec![537.0, 555.0, 573.0]);
        assert_eq!(
            seen.into_inner(),
            vec![
                vec![483.0, 501.0, 519.0],
                vec![501.0, 519.0, 537.0],
                vec![519.0, 537.0, 555.0],
            ]
        );
    }

    #[test]
    fn scaled_prediction_is_fed_back() {
        // [0, 1000] → [0, 1]
        let scaler = MinMaxScaler::new(0.0, 1000.0);
        let seen = RefCell::new(Vec::new());
        let out = rollout(&[100.0, 200.0, 300.0, 400.0], 3, 2, &scaler, |w| {
            seen.borrow_mut().push(w.to_vec());
            0.5
        })
        .unwrap();

        assert_eq!(out, vec![500.0, 500.0]);
        let seen = seen.into_inner();
        // uses the last three values only
        assert_eq!(seen[0], vec![0.2, 0.3, 0.4]);
        // [b, c, p1] with p1 in scaled space, not 500
        assert_eq!(seen[1], vec![0.3, 0.4, 0.5]);
    }

    #[test]
    fn short_history_is_rejected() {
        let err = rollout(&[1.0, 2.0], 3, 1, &IdentityScaler, |_| 0.0).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientHistory { needed: 3, got: 2 });
        assert_eq!(
            rollout(&[1.0], 0, 1, &IdentityScaler, |_| 0.0).unwrap_err(),
            ForecastError::EmptyWindow
        );
    }

    #[test]
    fn non_finite_prediction_stops_rollout() {
        let err = rollout(&[1.0], 1, 3, &IdentityScaler, |_| f64::NAN).unwrap_err();
        assert_eq!(err, ForecastError::NonFinite { step: 0 });
    }

    #[test]
    fn zero_steps_is_empty() {
        let out = rollout(&[1.0, 2.0], 2, 0, &IdentityScaler, |_| unreachable!()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn band_is_five_percent_each_side() {
        let points = with_band(2026, &[100.0, 200.0], 0.05);
        assert_eq!(points[0].year, 2026);
        assert_eq!(points[1].year, 2027);
        assert!((points[1].lower - 190.0).abs() < 1e-9);
        assert!((points[1].upper - 210.0).abs() < 1e-9);
    }

    fn history() -> Vec<Observation> {
        vec![
            Observation::new(2023, 483.0),
            Observation::new(2024, 501.0),
            Observation::new(2025, 519.0),
        ]
    }

    struct PlusEighteen;

    impl Predictor for PlusEighteen {
        fn window_len(&self) -> usize {
            3
        }
        fn predict_one(&self, window: &[f64]) -> f64 {
            window[2] + 18.0
        }
    }

    fn plus_eighteen() -> Result<(Box<dyn Predictor>, Box<dyn Scaler>), DashboardError> {
        Ok((Box::new(PlusEighteen), Box::new(IdentityScaler)))
    }

    #[test]
    fn failed_artifact_load_returns_flagged_fallback() {
        let outcome = forecast_or_fallback(&history(), 10, 0.05, || {
            Err(DashboardError::ModelArtifactUnavailable {
                path: PathBuf::from("models/gdp_model.json"),
                reason: "missing".into(),
            })
        });

        assert!(outcome.is_fallback());
        assert_eq!(outcome.points.len(), 10);
        assert_eq!(outcome.points[0].year, 2026);
        assert_eq!(outcome.points[9].year, 2035);
        assert!((outcome.points[0].value - 465.8e9).abs() < 1.0);
        match outcome.source {
            ForecastSource::Fallback { reason } => assert!(reason.contains("missing")),
            ForecastSource::Live => unreachable!(),
        }
    }

    #[test]
    fn live_model_is_flagged_live() {
        let outcome = forecast_or_fallback(&history(), 3, 0.05, plus_eighteen);
        assert_eq!(outcome.source, ForecastSource::Live);
        let values: Vec<f64> = outcome.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![537.0, 555.0, 573.0]);
    }

    #[test]
    fn history_too_short_for_model_falls_back() {
        let outcome = forecast_or_fallback(&history()[..2], 4, 0.05, plus_eighteen);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.points.len(), 4);
        assert_eq!(outcome.points[0].year, 2025);
    }
}
