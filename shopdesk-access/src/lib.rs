//! Access control for the Shopdesk admin gateway
//!
//! Two checks sit in front of every admin page:
//! - the session guard, a presence-only check for the session token
//! - the permission gate, which resolves one page identifier against the
//!   user's permission set, loading that set at most once per session
//!
//! Both fail closed: anything short of a positive match is a redirect.

pub mod gate;
pub mod login;
pub mod session;
pub mod source;
pub mod store;
pub mod token;

#[cfg(test)]
mod testing;

pub use gate::{DenyReason, GateState, PermissionGate};
pub use login::{Authenticator, Credentials, HttpAuthenticator, LoginGrant};
pub use session::{SessionCookies, SessionDecision, SessionGuard};
pub use source::{backend_client, HttpPermissionSource, PermissionSource};
pub use store::AuthorizationStore;
pub use token::TokenStatus;
