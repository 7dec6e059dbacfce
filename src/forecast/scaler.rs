use serde::{Deserialize, Serialize};

/// Forward/inverse transform between raw values and model space.
pub trait Scaler {
    fn transform(&self, value: f64) -> f64;
    fn inverse_transform(&self, value: f64) -> f64;
}

/// Leaves values untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScaler;

impl Scaler for IdentityScaler {
    fn transform(&self, value: f64) -> f64 {
        value
    }

    fn inverse_transform(&self, value: f64) -> f64 {
        value
    }
}

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Min-max scaler fitted on the training series.
///
/// Artifact layout: `{ "data_min": .., "data_max": .., "feature_range": [0, 1] }`
/// (`feature_range` optional).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: f64,
    pub data_max: f64,
    #[serde(default = "default_feature_range")]
    pub feature_range: [f64; 2],
}

impl MinMaxScaler {
    pub fn new(data_min: f64, data_max: f64) -> Self {
        Self {
            data_min,
            data_max,
            feature_range: default_feature_range(),
        }
    }

    /// Fit on observed values. `None` for an empty or non-finite input.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min.is_finite() && max.is_finite()).then(|| Self::new(min, max))
    }

    fn data_span(&self) -> f64 {
        let span = self.data_max - self.data_min;
        // constant training data: behave like a shift
        if span.abs() < f64::EPSILON {
            1.0
        } else {
            span
        }
    }

    fn feature_span(&self) -> f64 {
        self.feature_range[1] - self.feature_range[0]
    }

    pub fn is_valid(&self) -> bool {
        self.data_min.is_finite()
            && self.data_max.is_finite()
            && self.data_max >= self.data_min
            && self.feature_span() > 0.0
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, value: f64) -> f64 {
        (value - self.data_min) / self.data_span() * self.feature_span() + self.feature_range[0]
    }

    fn inverse_transform(&self, value: f64) -> f64 {
        (value - self.feature_range[0]) / self.feature_span() * self.data_span() + self.data_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_and_inverse_agree() {
        let s = MinMaxScaler::new(62.9e9, 374.7e9);
        for v in [62.9e9, 100.0e9, 374.7e9, 500.0e9] {
            let back = s.inverse_transform(s.transform(v));
            assert!((back - v).abs() / v < 1e-12);
        }
        assert_eq!(s.transform(62.9e9), 0.0);
        assert!((s.transform(374.7e9) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn custom_feature_range() {
        let s: MinMaxScaler =
            serde_json::from_str(r#"{"data_min": 0, "data_max": 10, "feature_range": [-1, 1]}"#)
                .unwrap();
        assert_eq!(s.transform(0.0), -1.0);
        assert_eq!(s.transform(10.0), 1.0);
        assert_eq!(s.inverse_transform(0.0), 5.0);
    }

    #[test]
    fn fit_and_validity() {
        let s = MinMaxScaler::fit(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!((s.data_min, s.data_max), (1.0, 3.0));
        assert!(s.is_valid());
        assert!(MinMaxScaler::fit(&[]).is_none());
        assert!(!MinMaxScaler::new(5.0, 1.0).is_valid());
    }

    #[test]
    fn constant_training_data_does_not_divide_by_zero() {
        let s = MinMaxScaler::new(4.0, 4.0);
        assert_eq!(s.transform(5.0), 1.0);
        assert_eq!(s.inverse_transform(1.0), 5.0);
    }
}
