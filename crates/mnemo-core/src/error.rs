use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document name: {0}")]
    InvalidDocumentName(String),

    #[error("Memory root not found (set MNEMO_HOME or HOME)")]
    NoMemoryRoot,
}
