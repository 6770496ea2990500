use drover_core::QueryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError<E: std::error::Error + 'static> {
    #[error("failed to initialize workload: {0}")]
    Init(#[source] E),

    #[error("failed to terminate workload: {0}")]
    Terminate(#[source] E),

    #[error("run cancelled before any execution was admitted")]
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("admission cancelled")]
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("empty template")]
    EmptyTemplate,

    #[error("unknown template field: {0}")]
    UnknownField(String),

    #[error("unclosed placeholder in template")]
    UnclosedPlaceholder,

    #[error("failed to query results: {0}")]
    Query(#[from] QueryError),
}
