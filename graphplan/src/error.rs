use thiserror::Error;

/// Errors surfaced by the core. All four kinds are programmer errors: the
/// caller held an invariant the core relies on (a well-formed state id, an
/// applicable action, a freshly constructed graph, same-kind mutex operands)
/// and failed to. None of them represent a recoverable runtime condition;
/// there is no retry path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphplanError {
    #[error("state invariant violated: {0}")]
    StateInvariant(String),

    #[error("precondition violated: action {action} is not applicable in the given state")]
    PreconditionViolated { action: String },

    #[error("planning graph misuse: {0}")]
    GraphMisuse(String),

    #[error("type mismatch: attempted to mutex two nodes of different kinds")]
    TypeMismatch,
}

pub type Result<T> = std::result::Result<T, GraphplanError>;
