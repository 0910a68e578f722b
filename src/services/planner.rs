// SPDX-License-Identifier: MIT

//! Daily workout planner.
//!
//! Owns the selected date and the mirrored workout list for that date, and
//! runs every mutation through the same workflow: validate, persist to the
//! repository, and only mirror into local state once the round-trip
//! succeeded. On failure the local list is left untouched and the error is
//! surfaced to the caller.
//!
//! Fetches are sequenced: each takes a ticket from a monotonic counter and
//! its response is dropped when a newer fetch has been issued since, so a
//! slow response for a previously selected date can never overwrite the
//! current one.

use crate::error::{AppError, Result};
use crate::models::week::{week_days, WeekDay};
use crate::models::workout::{
    clamp_set_count, Workout, WorkoutSet, DEFAULT_EMOJI, DEFAULT_REPS, DEFAULT_SETS,
};
use crate::services::workouts::{NewWorkout, WorkoutChanges, WorkoutRepository};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

struct PlannerState {
    selected_date: NaiveDate,
    workouts: Vec<Workout>,
}

/// Per-screen workout planner for one authenticated user.
pub struct WorkoutPlanner {
    repo: Arc<dyn WorkoutRepository>,
    user_id: String,
    /// Reference date fixed at construction; drives the week projection
    today: NaiveDate,
    state: Mutex<PlannerState>,
    /// Ticket counter for stale-fetch suppression
    fetch_ticket: AtomicU64,
}

impl WorkoutPlanner {
    /// Create a planner with the selection initialized to `today`.
    pub fn new(repo: Arc<dyn WorkoutRepository>, user_id: String, today: NaiveDate) -> Self {
        Self {
            repo,
            user_id,
            today,
            state: Mutex::new(PlannerState {
                selected_date: today,
                workouts: Vec::new(),
            }),
            fetch_ticket: AtomicU64::new(0),
        }
    }

    /// The week containing `today`, Monday first.
    pub fn week(&self) -> [WeekDay; 7] {
        week_days(self.today)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The user this planner was built for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn selected_date(&self) -> NaiveDate {
        self.state.lock().await.selected_date
    }

    /// Mirrored workouts for the selected date.
    pub async fn workouts(&self) -> Vec<Workout> {
        self.state.lock().await.workouts.clone()
    }

    /// Select a date and fetch its workouts.
    pub async fn select_date(&self, date: NaiveDate) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            state.selected_date = date;
        }
        self.fetch_selected(date).await
    }

    /// Refetch the currently selected date.
    pub async fn refresh(&self) -> Result<()> {
        let date = self.selected_date().await;
        self.fetch_selected(date).await
    }

    async fn fetch_selected(&self, date: NaiveDate) -> Result<()> {
        let ticket = self.fetch_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let rows = self.repo.fetch(&self.user_id, date).await?;

        // A newer fetch was issued while this one was in flight; its
        // response wins and this one is dropped.
        if self.fetch_ticket.load(Ordering::SeqCst) != ticket {
            tracing::debug!(%date, ticket, "Dropping stale workout fetch");
            return Ok(());
        }

        let mut state = self.state.lock().await;
        tracing::debug!(%date, count = rows.len(), "Workouts loaded");
        state.workouts = rows;
        Ok(())
    }

    /// Add a workout on the selected date.
    ///
    /// Empty or whitespace-only names are rejected before any network call.
    /// The set count is clamped to 1..=10 and defaults to 3; reps default
    /// to 10.
    pub async fn add_workout(
        &self,
        name: &str,
        set_count: Option<u32>,
        reps: Option<u32>,
    ) -> Result<Workout> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Workout name must not be empty".to_string(),
            ));
        }

        let set_count = clamp_set_count(set_count.unwrap_or(DEFAULT_SETS));
        let reps = reps.unwrap_or(DEFAULT_REPS);
        let date = self.selected_date().await;

        let inserted = self
            .repo
            .insert(NewWorkout {
                user_id: self.user_id.clone(),
                name: name.to_string(),
                emoji: DEFAULT_EMOJI.to_string(),
                date,
                sets: WorkoutSet::batch(set_count, reps),
                completed: false,
            })
            .await?;

        tracing::info!(workout_id = %inserted.id, %date, name, "Workout added");

        let mut state = self.state.lock().await;
        if state.selected_date == inserted.date {
            state.workouts.push(inserted.clone());
        }
        Ok(inserted)
    }

    /// Toggle the whole workout between all-completed and all-incomplete.
    pub async fn toggle_workout(&self, id: &str) -> Result<Workout> {
        let next = self.find(id).await?.toggled_all();
        self.persist_then_mirror(id, next).await
    }

    /// Complete the next incomplete set, or reset a fully completed cycle.
    pub async fn advance_workout(&self, id: &str) -> Result<Workout> {
        let next = self.find(id).await?.advanced();
        self.persist_then_mirror(id, next).await
    }

    /// Delete a workout. Irreversible; callers confirm with the user first.
    pub async fn delete_workout(&self, id: &str) -> Result<()> {
        // Make sure the id is ours before issuing the delete
        self.find(id).await?;
        self.repo.delete(id, &self.user_id).await?;

        let mut state = self.state.lock().await;
        state.workouts.retain(|w| w.id != id);
        tracing::info!(workout_id = %id, "Workout deleted");
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Workout> {
        self.state
            .lock()
            .await
            .workouts
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("workout {}", id)))
    }

    /// Write the next state to the repository, then mirror it locally.
    async fn persist_then_mirror(&self, id: &str, next: Workout) -> Result<Workout> {
        self.repo
            .update(id, &self.user_id, WorkoutChanges::from_state(&next))
            .await?;

        let mut state = self.state.lock().await;
        if let Some(slot) = state.workouts.iter_mut().find(|w| w.id == id) {
            *slot = next.clone();
        }
        Ok(next)
    }
}
