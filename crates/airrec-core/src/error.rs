use thiserror::Error;

use crate::features::Column;

/// A rating that cannot enter a [`FeatureRecord`](crate::FeatureRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidRatingError {
    #[error("rating '{column}' is missing")]
    Missing { column: Column },
    #[error("rating '{column}' = {value} is outside {min}..={max}", min = crate::Rating::MIN, max = crate::Rating::MAX)]
    OutOfRange { column: Column, value: i64 },
}

impl InvalidRatingError {
    #[must_use]
    pub fn column(&self) -> Column {
        match self {
            Self::Missing { column } | Self::OutOfRange { column, .. } => *column,
        }
    }
}

/// Failure raised by a [`PredictionOracle`](crate::PredictionOracle) implementation.
///
/// The adapter passes it on unchanged inside [`OraclePredictionError::Oracle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OracleError {
    message: String,
}

impl OracleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OraclePredictionError {
    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),
    #[error("oracle returned unknown class index {0}")]
    UnknownClass(usize),
    #[error("oracle returned an invalid class distribution [{0}, {1}]")]
    InvalidDistribution(f64, f64),
}

/// Everything that can go wrong while serving a single request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidRating(#[from] InvalidRatingError),
    #[error(transparent)]
    Prediction(#[from] OraclePredictionError),
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
