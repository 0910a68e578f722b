// SPDX-License-Identifier: MIT

//! Supabase GoTrue auth client.
//!
//! Handles:
//! - Email/password sign-up and sign-in
//! - Sign-out (remote token revocation)
//! - Refresh-token grant
//! - `set_session`: rebuilding a session from a deep-linked token pair

use crate::error::{AppError, Result};
use crate::models::{AuthUser, Session};
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Auth API client.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    /// Create a new auth client for a Supabase project.
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", supabase_url),
            anon_key: anon_key.to_string(),
        }
    }

    /// Register a new account. The service sends a confirmation email; no
    /// session is returned until the address is verified.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        validate_credentials(email, password)?;

        let url = format!("{}/signup", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        self.check_response(response).await
    }

    /// Sign in with email and password, returning a fresh session.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        validate_credentials(email, password)?;

        let url = format!("{}/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let token: TokenResponse = self.check_response_json(response).await?;
        Ok(token.into_session())
    }

    /// Revoke the session's tokens on the auth service.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        self.check_response(response).await
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let url = format!("{}/token?grant_type=refresh_token", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let token: TokenResponse = self.check_response_json(response).await?;
        Ok(token.into_session())
    }

    /// Build a session from an externally delivered token pair (the deep
    /// link exchange).
    ///
    /// The access token's claims identify the user and expiry. When the
    /// token is already inside the refresh margin, the refresh token is
    /// exchanged for a fresh pair instead.
    pub async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session> {
        let claims = decode_access_claims(access_token)?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AppError::InvalidToken)?;

        let margin = Duration::seconds(crate::models::session::TOKEN_REFRESH_MARGIN_SECS);
        if Utc::now() + margin >= expires_at {
            tracing::info!("Deep-linked access token expiring, refreshing");
            return self.refresh_session(refresh_token).await;
        }

        Ok(Session {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at,
            user: AuthUser {
                id: claims.sub,
                email: claims.email,
            },
        })
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 {
            return Err(AppError::InvalidToken);
        }

        Err(AppError::Auth(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 {
                return Err(AppError::InvalidToken);
            }

            return Err(AppError::Auth(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("JSON parse error: {}", e)))
    }
}

/// Both credentials must be present; checked before any network call.
fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Please enter both email and password".to_string(),
        ));
    }
    Ok(())
}

/// Claims this client reads from an access token.
#[derive(Debug, Deserialize)]
struct AccessClaims {
    /// User id
    sub: String,
    /// Email address, when the provider supplies one
    #[serde(default)]
    email: Option<String>,
    /// Expiry (Unix timestamp)
    exp: i64,
}

/// Decode claims from an access token without verifying the signature.
/// The backend is the verifier; the client only needs identity and expiry.
fn decode_access_claims(token: &str) -> Result<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|_| AppError::InvalidToken)?;

    Ok(data.claims)
}

/// Session payload returned by the token endpoints.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    /// Lifetime in seconds
    expires_in: i64,
    /// Absolute expiry; newer API versions include it directly
    #[serde(default)]
    expires_at: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| Utc::now() + Duration::seconds(self.expires_in));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: AuthUser {
                id: self.user.id,
                email: self.user.email,
            },
        }
    }
}
