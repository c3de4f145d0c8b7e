use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "https://okijulian.pythonanywhere.com";
pub const DEFAULT_SESSION_FILE: &str = ".taskforge-session.json";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the remote task service, without a trailing slash.
    pub api_url: String,
    /// Where the session credential is persisted between runs.
    pub session_file: PathBuf,
    /// Pause between the password-reset confirmation and the redirect to login.
    pub redirect_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        let api_url = env::var("TASKFORGE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let session_file = env::var("TASKFORGE_SESSION_FILE")
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
        let redirect_delay_ms = match env::var("TASKFORGE_REDIRECT_DELAY_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ClientError::Config(format!(
                    "TASKFORGE_REDIRECT_DELAY_MS must be a number of milliseconds, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_REDIRECT_DELAY_MS,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_file: PathBuf::from(session_file),
            redirect_delay: Duration::from_millis(redirect_delay_ms),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}
