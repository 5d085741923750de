//! Library error type.

/// Everything that can go wrong between raw JSON text and generated code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The top-level value is not an object or an array of objects.
    #[error("Input must be an object or an array of objects")]
    InvalidShape,
    /// The input is not valid JSON. `path` points at the offending node.
    #[error("invalid JSON at {path}: {source}")]
    JsonDecode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A generation setting is out of range.
    #[error("{0}")]
    InvalidConfiguration(String),
    /// Input nesting exceeded the configured limit.
    #[error("maximum nesting depth of {0} exceeded")]
    DepthLimit(usize),
    /// Internal type-container invariant broken. Reaching this is a bug in
    /// the inference pass, not bad input.
    #[error("{0}")]
    ConstraintViolation(String),
}
