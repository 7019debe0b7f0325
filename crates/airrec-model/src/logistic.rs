use serde::{Deserialize, Serialize};

use crate::error::{ModelLoadError, Result};
use crate::FEATURE_COUNT;

/// Lineares Modell: `margin = intercept + w · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticModel {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ModelLoadError::InvalidModel(format!(
                "logistic model has {} weights, expected {FEATURE_COUNT}",
                self.weights.len()
            )));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelLoadError::InvalidModel(
                "logistic model contains non-finite coefficients".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn margin(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(x.iter())
                .map(|(w, v)| w * v)
                .sum::<f64>()
    }

    /// `true`, wenn alle Gewichte null sind und das Modell konstant antwortet.
    pub(crate) fn is_constant(&self) -> bool {
        self.weights.iter().all(|w| *w == 0.0)
    }
}
