//! Session Guard
//!
//! Presence-only check in front of the authenticated section. The guard never
//! validates signature or expiry and never touches the network; a missing
//! token is the ordinary "please sign in" path, not an error.

use shopdesk_core::{SessionKey, SessionToken, Username};

/// Session values read from the client's cookie storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pub token: Option<SessionToken>,
    pub username: Option<Username>,
}

impl SessionCookies {
    /// Build from raw cookie values; blank values count as absent
    pub fn from_raw(token: Option<&str>, username: Option<&str>) -> Self {
        Self {
            token: token.and_then(SessionToken::parse),
            username: username.and_then(Username::parse),
        }
    }

    /// Store key for this session, when both halves are present
    pub fn session_key(&self) -> Option<SessionKey> {
        match (&self.token, &self.username) {
            (Some(token), Some(username)) => {
                Some(SessionKey::new(token.clone(), username.clone()))
            }
            _ => None,
        }
    }
}

/// Outcome of the session guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDecision {
    /// Render the protected content unchanged
    Proceed,
    /// No token: send the visitor to the login route
    RedirectToLogin,
}

/// Synchronous presence check for the session token
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionGuard;

impl SessionGuard {
    pub fn check(&self, cookies: &SessionCookies) -> SessionDecision {
        if cookies.token.is_some() {
            SessionDecision::Proceed
        } else {
            SessionDecision::RedirectToLogin
        }
    }
}
