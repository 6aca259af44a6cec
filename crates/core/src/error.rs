#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No reservation in session")]
    SessionMissing,

    #[error("Conflict: {0}")]
    Conflict(String),
}
