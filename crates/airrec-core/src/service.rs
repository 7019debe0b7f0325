use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::{OraclePredictionError, ServiceError};
use crate::features::{build, Column, FeatureRecord, RawRatings};
use crate::{predict, PredictionOracle, Verdict};

const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// Verdict plus the input it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub input: FeatureRecord,
    /// Highest-rated columns of `input`.
    pub highlighted: Vec<Column>,
    pub ts: String,
}

/// Holds the loaded oracle for the lifetime of the process.
///
/// Cloning shares the same oracle; there is no way to swap or mutate it.
#[derive(Clone)]
pub struct RecommendationService {
    oracle: Arc<dyn PredictionOracle>,
}

impl RecommendationService {
    pub fn new(oracle: Arc<dyn PredictionOracle>) -> Self {
        Self { oracle }
    }

    pub fn from_oracle<O: PredictionOracle + 'static>(oracle: O) -> Self {
        Self::new(Arc::new(oracle))
    }

    #[must_use]
    pub fn oracle_kind(&self) -> &str {
        self.oracle.kind()
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<Verdict, OraclePredictionError> {
        predict(self.oracle.as_ref(), record)
    }

    /// Validates `raw` and predicts. Invalid input never reaches the oracle.
    pub fn evaluate(&self, raw: &RawRatings) -> Result<Prediction, ServiceError> {
        let input = build(raw)?;
        let verdict = self.predict(&input)?;
        Ok(Prediction {
            verdict,
            input,
            highlighted: input.highlighted(),
            ts: iso8601_now(),
        })
    }
}

impl fmt::Debug for RecommendationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationService")
            .field("oracle", &self.oracle.kind())
            .finish()
    }
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}
