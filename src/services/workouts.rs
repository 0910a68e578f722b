// SPDX-License-Identifier: MIT

//! Workout repository: the remote collection of workout rows.
//!
//! The `WorkoutRepository` trait is the contract the rest of the app
//! depends on; `SupabaseWorkouts` implements it over the PostgREST API.
//! Every call is scoped by `user_id` (the backend additionally enforces
//! row-level ownership).

use crate::error::{AppError, Result};
use crate::models::{Workout, WorkoutSet};
use crate::services::session::SessionStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Insert payload: a workout without a store-assigned id.
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkout {
    pub user_id: String,
    pub name: String,
    pub emoji: String,
    pub date: NaiveDate,
    pub sets: Vec<WorkoutSet>,
    pub completed: bool,
}

/// Partial update payload. Only present fields are written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkoutChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<Vec<WorkoutSet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl WorkoutChanges {
    /// Changes that bring a stored row up to date with `next`.
    pub fn from_state(next: &Workout) -> Self {
        Self {
            sets: Some(next.sets.clone()),
            completed: Some(next.completed),
        }
    }
}

/// Remote workout collection contract.
#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Workouts for one user and date, ordered by creation time ascending.
    async fn fetch(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Workout>>;

    /// Insert a new workout; the store assigns the id.
    async fn insert(&self, workout: NewWorkout) -> Result<Workout>;

    /// Apply a partial update to one row.
    async fn update(&self, id: &str, user_id: &str, changes: WorkoutChanges) -> Result<()>;

    /// Delete one row. Irreversible.
    async fn delete(&self, id: &str, user_id: &str) -> Result<()>;
}

/// PostgREST implementation of the workout repository.
#[derive(Clone)]
pub struct SupabaseWorkouts {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    /// Gates every call behind an authenticated session.
    session: Arc<SessionStore>,
}

impl SupabaseWorkouts {
    pub fn new(supabase_url: &str, anon_key: &str, session: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/rest/v1/workouts", supabase_url),
            anon_key: anon_key.to_string(),
            session,
        }
    }

    /// Access token of the current session, or `Unauthorized`.
    fn access_token(&self) -> Result<String> {
        self.session
            .session()
            .map(|s| s.access_token)
            .ok_or(AppError::Unauthorized)
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

        Err(AppError::Api(format!("HTTP {}: {}", status, body)))
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

            return Err(AppError::Api(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Api(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl WorkoutRepository for SupabaseWorkouts {
    async fn fetch(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Workout>> {
        let token = self.access_token()?;

        let response = self
            .http
            .get(&self.base_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("date", format!("eq.{}", date)),
                ("order", "created_at.asc".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        self.check_response_json(response).await
    }

    async fn insert(&self, workout: NewWorkout) -> Result<Workout> {
        let token = self.access_token()?;

        let response = self
            .http
            .post(&self.base_url)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(&token)
            .json(&workout)
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        // PostgREST returns the inserted rows as an array
        let mut rows: Vec<Workout> = self.check_response_json(response).await?;
        rows.pop()
            .ok_or_else(|| AppError::Api("insert returned no row".to_string()))
    }

    async fn update(&self, id: &str, user_id: &str, changes: WorkoutChanges) -> Result<()> {
        let token = self.access_token()?;

        let response = self
            .http
            .patch(&self.base_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .json(&changes)
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        self.check_response(response).await
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<()> {
        let token = self.access_token()?;

        let response = self
            .http
            .delete(&self.base_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        self.check_response(response).await
    }
}
