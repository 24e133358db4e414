use thiserror::Error;

/// Errors produced by the symbolic engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The input text does not follow the expression grammar.
    #[error("parse error at position {position}: {message}")]
    Parse { message: String, position: usize },
    /// An identifier outside the closed variable set.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    /// A call to a function that is not whitelisted.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    /// The engine has no rule for the requested operation.
    #[error("{0}")]
    Unsupported(String),
    #[error("division by zero")]
    DivisionByZero,
    /// A value outside the real domain of an operation.
    #[error("{0}")]
    Domain(String),
}

impl EngineError {
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        EngineError::Parse {
            message: message.into(),
            position,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        EngineError::Unsupported(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
