use thiserror::Error;

/// Classes of guest exception the boundary distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong number of arguments.
    Arity,
    /// Wrong value kind, including malformed callback results.
    Type,
    /// Value outside its domain.
    Value,
    /// Source failed to parse.
    Syntax,
    /// Any other raised exception.
    Runtime,
}

impl ErrorKind {
    /// Guest exception class raised for this kind.
    pub fn exception_name(&self) -> &'static str {
        match self {
            ErrorKind::Arity => "ArgumentException",
            ErrorKind::Type => "TypeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Runtime => "Exception",
        }
    }
}

/// Failure detected on the native side of a call. Always delivered to the
/// guest as an exception, never to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("{0}")]
    Arity(String),
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Value(String),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Arity(_) => ErrorKind::Arity,
            BridgeError::Type(_) => ErrorKind::Type,
            BridgeError::Value(_) => ErrorKind::Value,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BridgeError::Arity(message)
            | BridgeError::Type(message)
            | BridgeError::Value(message) => message.as_str(),
        }
    }
}
