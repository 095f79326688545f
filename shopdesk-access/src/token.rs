//! Public-route token inspection
//!
//! The login screen sends visitors who already hold a live session back to
//! the app. That check reads the `exp` claim of the JWT without verifying the
//! signature: it only decides where to navigate, the backend still validates
//! the token on every API call.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use shopdesk_core::SessionToken;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// What the login screen can tell about a token it cannot verify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Active { expires_at: DateTime<Utc> },
    Expired,
    /// Not a JWT, or no `exp` claim
    Unreadable,
}

impl TokenStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, TokenStatus::Active { .. })
    }
}

pub fn inspect(token: &SessionToken) -> TokenStatus {
    inspect_at(token, Utc::now())
}

pub fn inspect_at(token: &SessionToken, now: DateTime<Utc>) -> TokenStatus {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let claims = match decode::<ExpiryClaims>(
        token.as_str(),
        &DecodingKey::from_secret(&[]),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!(error = %e, "Session token is not a readable JWT");
            return TokenStatus::Unreadable;
        }
    };

    match Utc.timestamp_opt(claims.exp, 0).single() {
        Some(expires_at) if expires_at > now => TokenStatus::Active { expires_at },
        Some(_) => TokenStatus::Expired,
        None => TokenStatus::Unreadable,
    }
}
