use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

use super::scaler::{MinMaxScaler, Scaler};
use super::Predictor;

// ---------------------------------------------------------------------------
// Model artifacts
// ---------------------------------------------------------------------------

/// Trained sequence model as exported by the offline training step.
///
/// ```json
/// { "kind": "linear_window", "weights": [0.1, 0.3, 0.6], "bias": 0.02 }
/// { "kind": "recurrent", "window": 3, "input_weights": [...], ... }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearWindow(LinearWindow),
    Recurrent(RecurrentCell),
}

impl ModelArtifact {
    /// Check the shapes are consistent before the model is used.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ModelArtifact::LinearWindow(m) => {
                if m.weights.is_empty() {
                    return Err("linear model has no weights".into());
                }
                Ok(())
            }
            ModelArtifact::Recurrent(m) => m.validate(),
        }
    }
}

impl Predictor for ModelArtifact {
    fn window_len(&self) -> usize {
        match self {
            ModelArtifact::LinearWindow(m) => m.weights.len(),
            ModelArtifact::Recurrent(m) => m.window,
        }
    }

    fn predict_one(&self, window: &[f64]) -> f64 {
        match self {
            ModelArtifact::LinearWindow(m) => m.predict(window),
            ModelArtifact::Recurrent(m) => m.predict(window),
        }
    }
}

/// `y = w · window + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWindow {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

impl LinearWindow {
    fn predict(&self, window: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(window)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }
}

/// Single-layer Elman cell over a univariate sequence with a dense output:
///
/// `h_t = tanh(w_in · x_t + W_rec · h_{t-1} + b_h)`, `y = w_out · h_K + b_out`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrentCell {
    pub window: usize,
    /// One weight per hidden unit.
    pub input_weights: Vec<f64>,
    /// Hidden × hidden, row-major by target unit.
    pub recurrent_weights: Vec<Vec<f64>>,
    pub hidden_bias: Vec<f64>,
    pub output_weights: Vec<f64>,
    #[serde(default)]
    pub output_bias: f64,
}

impl RecurrentCell {
    fn hidden(&self) -> usize {
        self.input_weights.len()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let h = self.hidden();
        if self.window == 0 || h == 0 {
            return Err("recurrent model needs a window and at least one hidden unit".into());
        }
        if self.hidden_bias.len() != h || self.output_weights.len() != h {
            return Err(format!("recurrent model: bias/output sizes do not match {h} hidden units"));
        }
        if self.recurrent_weights.len() != h || self.recurrent_weights.iter().any(|r| r.len() != h) {
            return Err(format!("recurrent model: recurrent weights must be {h}x{h}"));
        }
        Ok(())
    }

    fn predict(&self, window: &[f64]) -> f64 {
        let h = self.hidden();
        let mut state = vec![0.0; h];
        for &x in window {
            state = (0..h)
                .map(|j| {
                    let rec: f64 = self.recurrent_weights[j]
                        .iter()
                        .zip(&state)
                        .map(|(w, s)| w * s)
                        .sum();
                    (self.input_weights[j] * x + rec + self.hidden_bias[j]).tanh()
                })
                .collect();
        }
        self.output_weights
            .iter()
            .zip(&state)
            .map(|(w, s)| w * s)
            .sum::<f64>()
            + self.output_bias
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let unavailable = |reason: String| DashboardError::ModelArtifactUnavailable {
        path: path.to_path_buf(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| unavailable(format!("incompatible format: {e}")))
}

/// Load the predictor and its scaler. Any problem with either file is a
/// `ModelArtifactUnavailable`.
pub fn load_artifacts(model_path: &Path, scaler_path: &Path) -> Result<(Box<dyn Predictor>, Box<dyn Scaler>)> {
    let model: ModelArtifact = read_artifact(model_path)?;
    model
        .validate()
        .map_err(|reason| DashboardError::ModelArtifactUnavailable {
            path: model_path.to_path_buf(),
            reason,
        })?;

    let scaler: MinMaxScaler = read_artifact(scaler_path)?;
    if !scaler.is_valid() {
        return Err(DashboardError::ModelArtifactUnavailable {
            path: scaler_path.to_path_buf(),
            reason: "scaler range is empty or inverted".into(),
        });
    }

    log::info!(
        "Loaded forecast model (window {}) from {}",
        model.window_len(),
        model_path.display()
    );
    Ok((Box::new(model), Box::new(scaler)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_window_is_a_dot_product() {
        let m: ModelArtifact =
            serde_json::from_str(r#"{"kind": "linear_window", "weights": [0.2, 0.3, 0.5], "bias": 0.1}"#)
                .unwrap();
        assert_eq!(m.window_len(), 3);
        let y = m.predict_one(&[1.0, 2.0, 3.0]);
        assert!((y - (0.2 + 0.6 + 1.5 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn recurrent_cell_runs_over_the_window() {
        let cell = RecurrentCell {
            window: 2,
            input_weights: vec![1.0],
            recurrent_weights: vec![vec![0.5]],
            hidden_bias: vec![0.0],
            output_weights: vec![2.0],
            output_bias: 0.25,
        };
        let m = ModelArtifact::Recurrent(cell);
        m.validate().unwrap();

        let h1 = 0.4_f64.tanh();
        let h2 = (0.6 + 0.5 * h1).tanh();
        let y = m.predict_one(&[0.4, 0.6]);
        assert!((y - (2.0 * h2 + 0.25)).abs() < 1e-12);
    }

    #[test]
    fn mis_shaped_recurrent_cell_is_rejected() {
        let m = ModelArtifact::Recurrent(RecurrentCell {
            window: 3,
            input_weights: vec![1.0, 1.0],
            recurrent_weights: vec![vec![0.0, 0.0]],
            hidden_bias: vec![0.0, 0.0],
            output_weights: vec![1.0, 1.0],
            output_bias: 0.0,
        });
        assert!(m.validate().is_err());
    }

    #[test]
    fn missing_or_incompatible_files_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("gdp_model.json");
        let scaler = dir.path().join("gdp_scaler.json");

        let err = load_artifacts(&model, &scaler).err().unwrap();
        assert!(matches!(err, DashboardError::ModelArtifactUnavailable { .. }));

        std::fs::write(&model, r#"{"kind": "transformer", "layers": 12}"#).unwrap();
        let err = load_artifacts(&model, &scaler).err().unwrap();
        match err {
            DashboardError::ModelArtifactUnavailable { reason, .. } => {
                assert!(reason.contains("incompatible"))
            }
            other => panic!("unexpected {other:?}"),
        }

        std::fs::write(&model, r#"{"kind": "linear_window", "weights": [0.0, 0.0, 1.0]}"#).unwrap();
        std::fs::write(&scaler, r#"{"data_min": 10, "data_max": 1}"#).unwrap();
        assert!(load_artifacts(&model, &scaler).is_err());

        std::fs::write(&scaler, r#"{"data_min": 1, "data_max": 10}"#).unwrap();
        let (predictor, scaler) = load_artifacts(&model, &scaler).unwrap();
        assert_eq!(predictor.window_len(), 3);
        assert_eq!(scaler.transform(10.0), 1.0);
    }
}
