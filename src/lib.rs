#![doc = "The `taskforge_client` library crate."]
#![doc = ""]
#![doc = "This crate contains the session-authenticated client for the TaskForge task"]
#![doc = "service: credential persistence, the HTTP API client, the task list renderer"]
#![doc = "and the controller that keeps the rendered list in sync with the server."]
#![doc = "It is used by the `taskforge` binary (`main.rs`)."]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod render;
pub mod session;
pub mod sync;

pub use crate::api::ApiClient;
pub use crate::error::ClientError;
pub use crate::session::{Credential, Session, View};
pub use crate::sync::{ActionOutcome, SyncController};
