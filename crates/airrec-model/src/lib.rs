#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Laden des Modellartefakts und Inferenz.
//!
//! Das Artefakt ist eine JSON-Datei, die einmal beim Start gelesen und danach
//! nur noch gelesen wird. [`LoadedModel`] implementiert
//! [`PredictionOracle`](airrec_core::PredictionOracle) und kann damit direkt in
//! einen [`RecommendationService`](airrec_core::RecommendationService) gesteckt
//! werden.
//!
//! ```json
//! {
//!   "format": "airrec-model",
//!   "version": 1,
//!   "feature_names": ["seat_comfort", "food_bev", "cabin_service", "entertainment", "ground_service"],
//!   "model": { "kind": "logistic", "weights": [0.4, 0.3, 0.4, 0.2, 0.3], "intercept": -4.8 }
//! }
//! ```

pub mod error;
mod logistic;
mod tree;

use airrec_core::{FeatureRecord, OracleError, PredictionOracle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub use error::{ModelLoadError, Result};
pub use logistic::LogisticModel;
pub use tree::{Node, Tree, TreeEnsemble};

/// Formatkennung im Artefakt.
pub const FORMAT: &str = "airrec-model";
/// Höchste unterstützte Artefaktversion.
pub const FORMAT_VERSION: u32 = 1;
pub const FEATURE_COUNT: usize = FeatureRecord::COLUMNS.len();
/// Schwelle, ab der Klasse 1 vorhergesagt wird.
const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub version: u32,
    /// Spaltennamen in der Reihenfolge, auf die das Modell trainiert wurde.
    pub feature_names: Vec<String>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    TreeEnsemble(TreeEnsemble),
    Logistic(LogisticModel),
}

impl ModelSpec {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::TreeEnsemble(_) => "tree_ensemble",
            ModelSpec::Logistic(_) => "logistic",
        }
    }
}

/// Ein geprüftes, geladenes Modell.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    artifact: ModelArtifact,
}

impl LoadedModel {
    /// Liest und prüft das Artefakt unter `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ModelLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let model = Self::from_json_str(&raw)?;
        #[cfg(feature = "telemetry")]
        tracing::info!(
            path = %path.display(),
            kind = model.kind(),
            "model artifact loaded"
        );
        Ok(model)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        if artifact.format != FORMAT || artifact.version == 0 || artifact.version > FORMAT_VERSION
        {
            return Err(ModelLoadError::UnsupportedFormat {
                format: artifact.format,
                version: artifact.version,
            });
        }
        if artifact.feature_names != FeatureRecord::COLUMNS {
            return Err(ModelLoadError::SchemaMismatch {
                expected: FeatureRecord::COLUMNS.map(String::from).to_vec(),
                found: artifact.feature_names,
            });
        }
        match &artifact.model {
            ModelSpec::TreeEnsemble(ens) => {
                ens.validate()?;
                for f in ens.unused_features() {
                    warn(&format!(
                        "feature '{}' is never used by the tree ensemble",
                        FeatureRecord::COLUMNS[f]
                    ));
                }
            }
            ModelSpec::Logistic(lin) => {
                lin.validate()?;
                if lin.is_constant() {
                    warn("logistic model has only zero weights; every prediction is identical");
                }
            }
        }
        Ok(Self { artifact })
    }

    #[must_use]
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Kurzbeschreibung für die `inspect`-Ausgabe.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.artifact.model {
            ModelSpec::TreeEnsemble(ens) => format!(
                "tree_ensemble: {} trees, {} nodes, base_score {}",
                ens.trees.len(),
                ens.trees.iter().map(|t| t.nodes.len()).sum::<usize>(),
                ens.base_score
            ),
            ModelSpec::Logistic(lin) => format!(
                "logistic: weights {:?}, intercept {}",
                lin.weights, lin.intercept
            ),
        }
    }

    fn margin(&self, record: &FeatureRecord) -> std::result::Result<f64, OracleError> {
        let x = record.values();
        match &self.artifact.model {
            ModelSpec::TreeEnsemble(ens) => ens.margin(&x),
            ModelSpec::Logistic(lin) => Ok(lin.margin(&x)),
        }
    }

    fn positive_probability(&self, record: &FeatureRecord) -> std::result::Result<f64, OracleError> {
        let p = sigmoid(self.margin(record)?);
        if p.is_finite() {
            Ok(p)
        } else {
            Err(OracleError::new("model produced a non-finite probability"))
        }
    }
}

impl PredictionOracle for LoadedModel {
    fn kind(&self) -> &str {
        self.artifact.model.kind()
    }

    fn classify(&self, record: &FeatureRecord) -> std::result::Result<usize, OracleError> {
        let p = self.positive_probability(record)?;
        Ok(usize::from(p > DECISION_THRESHOLD))
    }

    fn class_probabilities(
        &self,
        record: &FeatureRecord,
    ) -> std::result::Result<[f64; 2], OracleError> {
        let p = self.positive_probability(record)?;
        Ok([1.0 - p, p])
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(feature = "telemetry")]
fn warn(msg: &str) {
    tracing::warn!("{msg}");
}

#[cfg(not(feature = "telemetry"))]
fn warn(msg: &str) {
    eprintln!("[airrec-model] warning: {msg}");
}
