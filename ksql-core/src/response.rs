use crate::{KsqlError, Result, truncate_long};
use serde::Deserialize;
use serde_json::Value;

/// One entry of the document returned by the `/ksql` endpoint.
///
/// The engine answers with an array of entries, either the command status
/// of a statement or an error report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseEntry {
    CommandStatus {
        #[serde(rename = "currentStatus")]
        current_status: CurrentStatus,
    },
    Error {
        error: ErrorReport,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentStatus {
    #[serde(rename = "commandStatus")]
    pub command_status: CommandStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandStatus {
    pub status: CommandStatusKind,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatusKind {
    Queued,
    Parsing,
    Executing,
    Terminated,
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorReport {
    #[serde(rename = "errorMessage")]
    pub error_message: ErrorMessage,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(rename = "stackTrace", default)]
    pub stack_trace: Vec<String>,
}

impl ResponseEntry {
    /// Decode the first entry of a `/ksql` document.
    pub fn first_of(document: &Value) -> Result<Self> {
        let Some(first) = document.as_array().and_then(|v| v.first()) else {
            return Err(malformed(document).into());
        };
        Ok(ResponseEntry::deserialize(first).map_err(|_| malformed(first))?)
    }
}

fn malformed(value: &Value) -> KsqlError {
    let text = value.to_string();
    KsqlError::MalformedResponse(format!("{}", truncate_long!(text)))
}

/// Turn a `/ksql` document into success or a [`KsqlError::Create`].
///
/// Only the first entry is inspected. Shapes other than command status and
/// error report fail with [`KsqlError::MalformedResponse`].
pub fn interpret(document: &Value) -> Result<bool> {
    match ResponseEntry::first_of(document)? {
        ResponseEntry::CommandStatus { current_status } => {
            let CommandStatus { status, message } = current_status.command_status;
            if status == CommandStatusKind::Success {
                Ok(true)
            } else {
                Err(KsqlError::Create(message.unwrap_or_default()).into())
            }
        }
        ResponseEntry::Error { error } => Err(KsqlError::Create(format!(
            "Message: {}",
            error.error_message.message
        ))
        .into()),
    }
}
