use log::{info, warn};

use super::Session;

/// The views ("pages") of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    Login,
    Register,
    Recover,
    Tasks,
}

impl View {
    /// Only the task list is protected.
    pub fn requires_auth(self) -> bool {
        matches!(self, View::Tasks)
    }
}

/// Keeps protected views behind a stored credential.
pub struct SessionGuard;

impl SessionGuard {
    /// Decides where a freshly loaded `view` should go.
    ///
    /// Returns `Some(View::Login)` when `view` is protected and no credential
    /// is stored; the caller must redirect before requesting any protected data.
    pub fn check_on_load(session: &Session, view: View) -> Option<View> {
        if view.requires_auth() && !session.is_authenticated() {
            info!("No session credential for {:?}, redirecting to login", view);
            return Some(View::Login);
        }
        None
    }

    /// Handles a failed protected read: clears the credential and returns the
    /// view to navigate to.
    ///
    /// Any non-success answer counts, not only 401. The service does not let the
    /// client tell an expired session from other server errors.
    pub fn on_unauthorized(session: &Session) -> View {
        if let Err(e) = session.clear() {
            warn!("Could not clear session credential after forced logout: {}", e);
        }
        info!("Protected read rejected, session ended");
        View::Login
    }
}
