// SPDX-License-Identifier: MIT

//! Authenticated session value.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Margin before token expiration when a session counts as expired and a
/// refresh is attempted (5 minutes).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Identity of the signed-in user, as asserted by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Opaque user identifier
    pub id: String,
    /// Email address (may be absent for some providers)
    pub email: Option<String>,
}

/// A live authentication session: the token pair plus the user it belongs
/// to. Replaced wholesale on every auth-state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// True when the access token is expired or inside the refresh margin.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// Display name shown on the dashboard: the email local-part with its
    /// first letter upper-cased, or "User" when no email is present.
    pub fn display_name(&self) -> String {
        let local = self
            .user
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|part| !part.is_empty());

        match local {
            Some(name) => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => "User".to_string(),
                }
            }
            None => "User".to_string(),
        }
    }
}
