//! The client's session state: who is logged in and with which token.
//!
//! The session is an explicit object with a create/read/invalidate
//! lifecycle, shared between the controller and the active adapter through
//! a [SessionHandle]. Logging out, and the remote adapter observing a
//! rejected token, both clear the handle.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::models::{LogInResponse, UserID};

/// The token value used when no real token exists: the local backends have
/// no server to mint one.
pub const LOCAL_TOKEN: &str = "local-token";

/// The identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// The user's ID in the active backend.
    pub id: UserID,
    /// The user's name.
    pub username: String,
}

/// A logged-in session: the user's identity plus the bearer token presented
/// on protected calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The identity of the logged-in user.
    pub user: SessionUser,
    /// The bearer token for the remote backend, or [LOCAL_TOKEN] for the
    /// local backends.
    pub token: String,
}

impl From<LogInResponse> for Session {
    fn from(response: LogInResponse) -> Self {
        Self {
            user: SessionUser {
                id: response.id,
                username: response.username,
            },
            token: response.token,
        }
    }
}

/// Shared handle to the (at most one) active session.
///
/// Cloning shares the same underlying slot.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    slot: Arc<Mutex<Option<Session>>>,
}

impl SessionHandle {
    /// Create a handle with no active session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    pub fn current(&self) -> Option<Session> {
        self.slot.lock().ok().and_then(|session| session.clone())
    }

    /// Whether a session is active.
    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    /// Store `session` as the active session, replacing any previous one.
    pub fn set(&self, session: Session) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(session);
        }
    }

    /// Clear the active session.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
