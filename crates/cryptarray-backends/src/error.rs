//! Error types for backend operations

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur inside a homomorphic backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Invalid payload handle
    #[error("invalid payload handle: {0}")]
    InvalidPayloadHandle(u64),

    /// Invalid evaluation key handle
    #[error("invalid key handle: {0}")]
    InvalidKeyHandle(u64),

    /// Invalid public key handle
    #[error("invalid public key handle: {0}")]
    InvalidPublicKey(u64),

    /// Invalid secret key handle
    #[error("invalid secret key handle: {0}")]
    InvalidSecretKey(u64),

    /// A key handle was presented to an evaluation call it was not generated for
    #[error("key mismatch: expected {expected}, got {actual}")]
    KeyMismatch { expected: String, actual: String },

    /// Encoded value count does not match the scheme's slot count
    #[error("slot count mismatch: expected {expected}, got {actual}")]
    SlotCountMismatch { expected: usize, actual: usize },

    /// Evaluation parameters are incompatible with the scheme's slot count
    #[error("invalid evaluation parameters: {0}")]
    InvalidParameters(String),
}
