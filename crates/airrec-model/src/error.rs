use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file not found: '{}' (place the model artifact there or pass --model)", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read model file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported model format '{format}' version {version}")]
    UnsupportedFormat { format: String, version: u32 },
    #[error("feature schema mismatch: model expects {found:?}, records provide {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

pub type Result<T> = std::result::Result<T, ModelLoadError>;
