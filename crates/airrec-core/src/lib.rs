#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Core types of the airline recommendation predictor.
//!
//! A [`FeatureRecord`] goes into a [`PredictionOracle`]; [`predict`] turns the
//! oracle's raw answer into a [`Verdict`].

pub mod error;
pub mod features;
mod service;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use error::{
    InvalidRatingError, OracleError, OraclePredictionError, Result, ServiceError,
};
pub use features::{build, Column, FeatureRecord, Rating, RawRatings};
pub use service::{Prediction, RecommendationService};

/// Allowed deviation of `p0 + p1` from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    NotRecommended,
    Recommended,
}

impl Label {
    /// Maps the oracle's class index. Only 0 and 1 exist.
    #[must_use]
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(Label::NotRecommended),
            1 => Some(Label::Recommended),
            _ => None,
        }
    }

    #[must_use]
    pub fn class_index(self) -> usize {
        match self {
            Label::NotRecommended => 0,
            Label::Recommended => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Label::NotRecommended => "Not Recommended",
            Label::Recommended => "Recommended",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// Probability the oracle assigned to `label`.
    pub confidence: f64,
}

/// A pre-trained binary classifier, loaded once and never mutated.
pub trait PredictionOracle: Send + Sync {
    /// Short name of the model family, e.g. for health output.
    fn kind(&self) -> &str {
        "oracle"
    }
    /// Hard class: 0 = not recommended, 1 = recommended.
    fn classify(&self, record: &FeatureRecord) -> Result<usize, OracleError>;
    /// Distribution `[p0, p1]` over both classes.
    fn class_probabilities(&self, record: &FeatureRecord) -> Result<[f64; 2], OracleError>;
}

/// Checks that `p` is a probability distribution over two classes.
#[must_use]
pub fn is_distribution(p: &[f64; 2]) -> bool {
    p.iter().all(|x| x.is_finite() && (0.0..=1.0).contains(x))
        && ((p[0] + p[1]) - 1.0).abs() <= PROBABILITY_TOLERANCE
}

/// Asks the oracle once for class and distribution and reports the
/// probability of the predicted class.
pub fn predict<O: PredictionOracle + ?Sized>(
    oracle: &O,
    record: &FeatureRecord,
) -> Result<Verdict, OraclePredictionError> {
    let class = oracle.classify(record)?;
    let label = Label::from_class(class).ok_or(OraclePredictionError::UnknownClass(class))?;
    let probabilities = oracle.class_probabilities(record)?;
    if !is_distribution(&probabilities) {
        return Err(OraclePredictionError::InvalidDistribution(
            probabilities[0],
            probabilities[1],
        ));
    }
    Ok(Verdict {
        label,
        confidence: probabilities[label.class_index()],
    })
}
