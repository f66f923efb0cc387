use thiserror::Error;

use crate::command::CommandError;
use crate::parser::ParseError;
use crate::writer::WriteError;

/// Errors returned by any exchange with the firewall.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body was not a well-formed document.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A request payload could not be serialized.
    #[error(transparent)]
    Write(#[from] WriteError),
    /// An operational command could not be converted.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// The device processed the request and reported an error.
    #[error("{}", device_message(.code.as_deref(), .message))]
    Device {
        code: Option<String>,
        message: String,
    },
    /// A successful response lacked an expected element.
    #[error("response is missing {0}")]
    MissingField(&'static str),
    /// An asynchronous device job finished unsuccessfully.
    #[error("job {id} {result}: {details}")]
    Job {
        id: String,
        result: String,
        details: String,
    },
}

fn device_message(code: Option<&str>, message: &str) -> String {
    match code {
        Some(code) => format!("device error (code {code}): {message}"),
        None => format!("device error: {message}"),
    }
}
