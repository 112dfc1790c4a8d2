use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ProfileError {
    #[error("Storage error: {0}")]
    Storage(String),

    /// A row for this natural key already exists. Inserts racing across
    /// concurrent callbacks surface here, distinctly from not-found, so the
    /// caller can re-read and reuse the winning row.
    #[error("Duplicate profile for {provider}/{identifier}")]
    Duplicate {
        provider: String,
        identifier: String,
    },

    #[error("Serde error: {0}")]
    Serde(String),
}
