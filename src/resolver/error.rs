use thiserror::Error;

/// Errors raised by a [`ResolverContainer`](super::container::ResolverContainer).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    /// The entry's script failed; `message` is its first timeline message.
    #[error("entry '{name}' could not be resolved: {message}")]
    EvaluationFailed { name: String, message: String },

    #[error("no entry named '{0}'")]
    UnknownEntry(String),

    #[error("expected a JSON object of entries, got {0}")]
    NotAnObject(String),
}
