//! HTTP client for the remote task service.
//!
//! Every operation issues exactly one request and normalizes the outcome:
//! a decoded success payload, or a `ClientError` telling a missing response
//! (`Transport`) apart from a non-2xx answer (`Application`). No local state is
//! touched here; callers decide what a result means for the session and view.

pub mod auth;
pub mod tasks;

use log::{debug, warn};
use reqwest::{RequestBuilder, Response};

use crate::config::Config;
use crate::error::ClientError;
use crate::models::ErrorBody;

/// The operations the service exposes, used for logging and for the fixed
/// message shown when a failed response carries no `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    FetchSecurityQuestion,
    ValidateSecurityAnswer,
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::Register => "Registration failed.",
            Operation::Login => "Login failed.",
            Operation::FetchSecurityQuestion => "Could not get the security question.",
            Operation::ValidateSecurityAnswer => "Could not validate the answer.",
            Operation::ListTasks => "Could not load the tasks.",
            Operation::CreateTask => "Could not create the task.",
            Operation::UpdateTask => "Could not update the task.",
            Operation::DeleteTask => "Could not delete the task.",
        }
    }

    /// Whether the route needs a bearer credential.
    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            Operation::ListTasks
                | Operation::CreateTask
                | Operation::UpdateTask
                | Operation::DeleteTask
        )
    }
}

/// Client for the task service rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `request` and splits the response into success or failure.
    ///
    /// Non-2xx bodies are read for an optional `message`; a body that is not
    /// JSON simply yields no message.
    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<Response, ClientError> {
        debug!("Dispatching {:?}", operation);
        let response = request.send().await.map_err(|e| {
            warn!("{:?} got no response: {}", operation, e);
            ClientError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("{:?} succeeded with {}", operation, status);
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        warn!(
            "{:?} failed with {}{}",
            operation,
            status,
            message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default()
        );
        Err(ClientError::Application {
            status: status.as_u16(),
            message,
        })
    }
}
