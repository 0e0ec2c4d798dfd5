use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] mnemo_core::CoreError),

    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    #[error("Sync repository has no working directory")]
    NoWorkdir,
}
