//!
//! # Client Error Handling
//!
//! This module defines `ClientError`, the single error type returned by every
//! operation of the client. It separates the failure kinds the user interface
//! must treat differently: input rejected before dispatch, no response from the
//! remote service, a non-2xx response, and an undecodable success body.
//!
//! `From` implementations for `reqwest::Error`, `serde_json::Error`,
//! `std::io::Error` and `validator::ValidationErrors` allow propagation with `?`.

use std::fmt;
use validator::ValidationErrors;

/// Text shown whenever the remote service could not be reached.
pub const CONNECTION_ERROR_MESSAGE: &str = "Could not connect to the server.";

/// Represents all possible failures of a client operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Input rejected locally; no request was sent.
    Validation(String),
    /// No response was received (offline, DNS failure, connection reset).
    Transport(String),
    /// The service answered with a non-2xx status.
    /// `message` is the optional `message` field of the response body.
    Application { status: u16, message: Option<String> },
    /// A 2xx response whose body did not have the expected shape.
    Decode(String),
    /// The credential could not be read from or written to persistent storage.
    Storage(String),
    /// Invalid runtime configuration.
    Config(String),
}

impl ClientError {
    /// Returns the text to show the user for this failure.
    ///
    /// The server-provided message is used verbatim when present; `fallback` is
    /// the fixed per-operation text used otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Transport(_) => CONNECTION_ERROR_MESSAGE.to_string(),
            ClientError::Application {
                message: Some(msg), ..
            } => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status of an application error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            ClientError::Transport(msg) => write!(f, "Transport Error: {}", msg),
            ClientError::Application {
                status,
                message: Some(msg),
            } => write!(f, "Application Error ({}): {}", status, msg),
            ClientError::Application {
                status,
                message: None,
            } => write!(f, "Application Error ({})", status),
            ClientError::Decode(msg) => write!(f, "Decode Error: {}", msg),
            ClientError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            ClientError::Config(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Converts `reqwest::Error` into `ClientError`.
///
/// Body decoding failures become `Decode`; everything else means no usable
/// response arrived and becomes `Transport`.
impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> ClientError {
        if error.is_decode() {
            ClientError::Decode(error.to_string())
        } else {
            ClientError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> ClientError {
        ClientError::Decode(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> ClientError {
        ClientError::Storage(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `ClientError::Validation`.
///
/// Only the first field message is kept; it is what the status line shows.
impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> ClientError {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        ClientError::Validation(message)
    }
}
