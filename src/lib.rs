// SPDX-License-Identifier: MIT

//! Repday: daily workout checklist client core.
//!
//! This crate implements the reusable core of a workout-tracking client:
//! the set-completion state machine, the Monday-start week selector, a
//! Supabase-backed workout repository, and the session lifecycle
//! (persisted-session restore, auth-state broadcast, deep-link token
//! exchange). The backend service itself is an external collaborator.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use services::{AuthClient, SessionStore, SupabaseWorkouts};
use std::sync::Arc;
use storage::SessionStorage;

/// Application root: configuration plus the explicitly constructed,
/// process-wide services.
pub struct App {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub workouts: Arc<SupabaseWorkouts>,
}

impl App {
    /// Wire up the application from configuration.
    pub fn new(config: Config) -> Self {
        let auth = AuthClient::new(&config.supabase_url, &config.supabase_anon_key);
        let storage = SessionStorage::new(&config.session_file);
        let session = Arc::new(SessionStore::new(auth, storage));
        let workouts = Arc::new(SupabaseWorkouts::new(
            &config.supabase_url,
            &config.supabase_anon_key,
            Arc::clone(&session),
        ));

        Self {
            config,
            session,
            workouts,
        }
    }
}
