//! The single status line shown to the user. Each new message replaces the
//! previous one; there is no queue and no history.

use std::fmt;

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

impl StatusKind {
    /// Presentation tag used when styling the message.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.text)
    }
}

#[derive(Debug, Default)]
pub struct StatusLine {
    current: Option<StatusMessage>,
}

impl StatusLine {
    /// Overwrites the visible message.
    pub fn show(&mut self, text: impl Into<String>, kind: StatusKind) {
        let message = StatusMessage {
            text: text.into(),
            kind,
        };
        match kind {
            StatusKind::Success => info!("Status: {}", message.text),
            StatusKind::Error => warn!("Status: {}", message.text),
        }
        self.current = Some(message);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.show(text, StatusKind::Success);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.show(text, StatusKind::Error);
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }
}
