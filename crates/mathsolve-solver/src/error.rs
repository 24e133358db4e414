use mathsolve_core::UnsupportedKind;
use mathsolve_engine::EngineError;
use thiserror::Error;

/// Why a problem could not be answered. Every variant is reported to the
/// client as `400 { "error": <message> }`.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedKind),
    /// The expression or sub type does not fit the problem kind.
    #[error("{0}")]
    Malformed(String),
    #[error("{context}: {source}")]
    Engine {
        context: &'static str,
        #[source]
        source: EngineError,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SolveError {
    pub fn malformed(message: impl Into<String>) -> Self {
        SolveError::Malformed(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        SolveError::Internal(message.into())
    }

    /// Adapter for `map_err` that labels an engine failure.
    pub fn engine(context: &'static str) -> impl FnOnce(EngineError) -> SolveError {
        move |source| SolveError::Engine { context, source }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::UnsupportedType(_) => "unsupported_type",
            SolveError::Malformed(_) => "malformed",
            SolveError::Engine { .. } => "engine",
            SolveError::Internal(_) => "internal",
        }
    }
}
