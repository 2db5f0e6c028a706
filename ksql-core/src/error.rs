use crate::Error;
use std::fmt::{self, Display};

/// Failures raised by the client itself, as opposed to errors bubbling up
/// from the HTTP stack or from serialization.
///
/// They travel inside [`Error`] (an `anyhow::Error`), use [`ErrorKind::of`]
/// to classify one without caring about the context attached on the way up.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KsqlError {
    /// The statement text was empty.
    #[error("Invalid statement `{0}`: a statement cannot be empty")]
    InvalidStatement(String),
    /// A buffered call returned a status other than 200.
    #[error("Status Code: {status}.\nMessage: {body}")]
    Transport { status: u16, body: String },
    /// The connect or read deadline elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// The engine reported that the command did not succeed.
    #[error("{0}")]
    Create(String),
    /// A streamed piece of the body is not exactly one JSON document.
    #[error("Incomplete frame of {len} bytes (chunk size {chunk_size}): {reason}")]
    IncompleteFrame {
        len: usize,
        chunk_size: usize,
        reason: String,
    },
    /// A buffered response has neither the command status nor the error shape.
    #[error("Unrecognized response shape: {0}")]
    MalformedResponse(String),
}

impl KsqlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KsqlError::InvalidStatement(..) => ErrorKind::InvalidStatement,
            KsqlError::Transport { .. } => ErrorKind::Transport,
            KsqlError::Timeout(..) => ErrorKind::Timeout,
            KsqlError::Create(..) => ErrorKind::Create,
            KsqlError::IncompleteFrame { .. } => ErrorKind::IncompleteFrame,
            KsqlError::MalformedResponse(..) => ErrorKind::MalformedResponse,
        }
    }
}

/// Discriminant of [`KsqlError`], used to declare which failures a
/// [`RetryPolicy`](crate::RetryPolicy) may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidStatement,
    Transport,
    Timeout,
    Create,
    IncompleteFrame,
    MalformedResponse,
}

impl ErrorKind {
    /// Kind of the [`KsqlError`] wrapped by `error`, if any.
    pub fn of(error: &Error) -> Option<ErrorKind> {
        error.downcast_ref::<KsqlError>().map(KsqlError::kind)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::InvalidStatement => "invalid statement",
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Create => "create",
            ErrorKind::IncompleteFrame => "incomplete frame",
            ErrorKind::MalformedResponse => "malformed response",
        })
    }
}
