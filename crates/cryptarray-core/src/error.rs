//! Error types for cryptarray-core operations

/// Result type for cryptarray-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cryptarray-core operations
///
/// Every error is local and synchronous: it is scoped to the failing call,
/// leaves previously constructed tensors untouched, and is not retryable by
/// this layer. Recovery means the caller supplies correct parameters or
/// generates the missing key and re-invokes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid block size or packing configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Data does not fit the slot budget under the chosen mode
    #[error("Array does not fit the available slots: {0}")]
    Capacity(String),

    /// Operand shape or ncols disagreement
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Incompatible row-major/col-major combination for the requested op
    #[error("Encoding order mismatch: {0}")]
    OrderMismatch(String),

    /// Required rotation-key capability absent from the tensor's cache
    #[error("Missing rotation key: {capability} is not cached; generate it first with {hint}")]
    MissingKey { capability: String, hint: String },

    /// Axis outside the supported set for this operand
    #[error("Unsupported axis: {0}")]
    UnsupportedAxis(String),

    /// Backend failure, passed through unchanged
    #[error(transparent)]
    Backend(#[from] cryptarray_backends::BackendError),
}
