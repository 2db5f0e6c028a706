use crate::{KsqlError, Result, truncate_long};
use std::{
    fmt::{self, Display},
    ops::Deref,
};

/// Separator that closes every statement sent to the engine.
pub const STATEMENT_TERMINATOR: char = ';';

/// A statement ready to be sent to the engine.
///
/// The text is never empty and always ends with exactly one
/// [`STATEMENT_TERMINATOR`] added by [`validate`] when missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement(String);

impl Statement {
    /// Validate `text` and terminate it, see [`validate`].
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let mut text = text.into();
        if text.is_empty() {
            return Err(KsqlError::InvalidStatement(text).into());
        }
        if !text.ends_with(STATEMENT_TERMINATOR) {
            text.push(STATEMENT_TERMINATOR);
        }
        Ok(Self(text))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Reject empty statements and append the terminator when missing.
///
/// Nothing else is touched: no trimming, no case normalization.
/// ```
/// # use ksql_core::validate;
/// assert_eq!(validate("SHOW STREAMS").unwrap().as_str(), "SHOW STREAMS;");
/// assert_eq!(validate("SHOW STREAMS;").unwrap().as_str(), "SHOW STREAMS;");
/// assert!(validate("").is_err());
/// ```
pub fn validate(text: impl Into<String>) -> Result<Statement> {
    Statement::new(text)
}

impl Deref for Statement {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Statement> for String {
    fn from(value: Statement) -> Self {
        value.0
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.as_str()))
    }
}
