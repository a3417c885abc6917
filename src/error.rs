//! Error types with actionable diagnostics
//!
//! Every variant carries enough context to resolve the problem without
//! digging through the training code.

use thiserror::Error;

/// Result type alias for adversario operations.
pub type Result<T> = std::result::Result<T, AdversarioError>;

/// Errors that can occur while building or driving a training run.
#[derive(Error, Debug)]
pub enum AdversarioError {
    /// A dimension that must be positive was zero.
    #[error("invalid {name}: {value}\n  → {name} must be positive")]
    InvalidDimension { name: &'static str, value: usize },

    /// Input length does not match `batch_size × input_width`.
    #[error("input shape mismatch: got {actual} values, expected {expected}\n  → check the loader output against the encoder's input width")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The two batch sources disagree on batch size.
    #[error("batch size mismatch between sources: labeled={labeled}, unlabeled={unlabeled}\n  → both loaders must yield equally sized batches")]
    BatchSizeMismatch { labeled: usize, unlabeled: usize },

    /// Batches within one source differ in size.
    #[error("ragged batch source: first batch has {first} examples, a later one has {offending}\n  → every batch in a source must have the same size")]
    RaggedSource { first: usize, offending: usize },

    /// Neither source yielded a single paired batch.
    #[error("epoch produced no paired batches\n  → both sources must yield at least one batch")]
    EmptyEpoch,

    /// A configuration value fails validation.
    #[error("invalid configuration value for '{field}': {message}")]
    ConfigValue { field: &'static str, message: String },
}
