//! Permission Gate
//!
//! Resolves whether the current user may open one page. Every path that is
//! not a positive match against a loaded permission set ends in `Denied`.

use crate::session::SessionCookies;
use crate::store::AuthorizationStore;
use shopdesk_core::{PageId, PermissionSet};
use tracing::{debug, warn};

/// Why a gate denied access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No username cookie
    MissingUsername,
    /// No token cookie (gate used outside the session guard)
    MissingSession,
    /// Permission set loaded, page not in it
    NotGranted,
    /// Permission lookup failed
    LookupFailed,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MissingUsername => "missing_username",
            DenyReason::MissingSession => "missing_session",
            DenyReason::NotGranted => "not_granted",
            DenyReason::LookupFailed => "lookup_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Allowed,
    Denied(DenyReason),
}

impl GateState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GateState::Pending)
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GateState::Allowed)
    }
}

/// One gate per page visit. Starts `Pending`; the first `resolve` moves it to
/// a terminal state which later calls return unchanged.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    page: PageId,
    state: GateState,
}

impl PermissionGate {
    pub fn new(page: impl Into<PageId>) -> Self {
        Self {
            page: page.into(),
            state: GateState::Pending,
        }
    }

    pub fn page(&self) -> &PageId {
        &self.page
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub async fn resolve(
        &mut self,
        store: &AuthorizationStore,
        cookies: &SessionCookies,
    ) -> GateState {
        if !self.state.is_terminal() {
            self.state = decide(&self.page, store, cookies).await;
        }
        self.state
    }
}

async fn decide(page: &PageId, store: &AuthorizationStore, cookies: &SessionCookies) -> GateState {
    if cookies.username.is_none() {
        debug!(page = %page, "No username in session, denying");
        return GateState::Denied(DenyReason::MissingUsername);
    }
    let Some(key) = cookies.session_key() else {
        debug!(page = %page, "No token in session, denying");
        return GateState::Denied(DenyReason::MissingSession);
    };

    if let Some(set) = store.cached(&key) {
        return verdict(&set, page);
    }

    match store.permissions(&key).await {
        Ok(set) => verdict(&set, page),
        Err(e) => {
            e.log();
            warn!(
                page = %page,
                username = %key.username,
                error_id = %e.context().error_id,
                "Permission lookup failed, denying"
            );
            GateState::Denied(DenyReason::LookupFailed)
        }
    }
}

fn verdict(set: &PermissionSet, page: &PageId) -> GateState {
    if set.allows(page) {
        GateState::Allowed
    } else {
        GateState::Denied(DenyReason::NotGranted)
    }
}
