use std::fmt;

use strum::{Display, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Error kinds raised by the interpreter.
///
/// Uses strum derives for automatic `Display` and `Into<&'static str>` implementations.
/// The string representation matches the variant name exactly (e.g., `TypeError` -> "TypeError").
///
/// Every kind is fatal: the interpreter offers no user-level catch, so an error of any
/// kind aborts the program with a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ErrorKind {
    /// Malformed source: loader, preparation, lexer, and parser failures.
    SyntaxError,
    /// A referenced library could not be loaded.
    ReferenceError,
    /// An identifier, member, or namespace entry is not defined.
    NameError,
    /// An operand or receiver has the wrong runtime type.
    TypeError,
    /// A hashtable lookup missed.
    KeyError,
    /// Unknown operator or function, arity mismatch, bad cast, or a numeric fault.
    ValueError,
    /// An `!` assertion evaluated to a falsy value.
    AssertionError,
    /// A user-invoked `!>>` with the rendered message.
    RaisedError,
}

/// A fatal interpreter error: a kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    kind: ErrorKind,
    message: String,
}

impl RunError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceError, message)
    }

    pub fn name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NameError, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn key(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyError, message)
    }

    pub fn value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValueError, message)
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AssertionError, message)
    }

    pub fn raised(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RaisedError, message)
    }

    /// The kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RunError {}
