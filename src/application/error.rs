use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete input. The operation is rejected and state is
    /// left untouched.
    #[error("Invalid transaction: {0}")]
    Validation(String),

    /// Blob store read/write failure. Persistence is best-effort: the
    /// in-memory result stands.
    #[error("Storage error: {0}")]
    Persistence(#[from] anyhow::Error),
}
