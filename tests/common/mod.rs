// SPDX-License-Identifier: MIT

//! Shared test helpers: an in-memory workout repository with failure
//! injection and per-fetch latency control.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use repday::error::{AppError, Result};
use repday::models::Workout;
use repday::services::{NewWorkout, WorkoutChanges, WorkoutRepository};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory stand-in for the remote workout store.
#[derive(Default)]
pub struct FakeRepository {
    rows: Mutex<Vec<Workout>>,
    next_id: AtomicU64,
    fail: AtomicBool,
    /// Every insert payload the repository received
    pub insert_log: Mutex<Vec<NewWorkout>>,
    /// Artificial latency applied to fetches, one entry per call
    pub fetch_delays: Mutex<VecDeque<Duration>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a service error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check_fail(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Api("injected failure".to_string()));
        }
        Ok(())
    }

    /// Insert a row directly, bypassing failure injection.
    pub fn seed(&self, workout: Workout) {
        self.rows.lock().unwrap().push(workout);
    }

    /// Snapshot of the stored rows.
    pub fn rows(&self) -> Vec<Workout> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkoutRepository for FakeRepository {
    async fn fetch(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Workout>> {
        let delay = self.fetch_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_fail()?;

        let mut rows: Vec<Workout> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.user_id == user_id && w.date == date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn insert(&self, workout: NewWorkout) -> Result<Workout> {
        self.check_fail()?;
        self.insert_log.lock().unwrap().push(workout.clone());

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = Workout {
            id: format!("w{}", n),
            user_id: workout.user_id,
            name: workout.name,
            emoji: workout.emoji,
            date: workout.date,
            sets: workout.sets,
            completed: workout.completed,
            repeat_mode: "none".to_string(),
            repeat_weekdays: vec![],
            repeat_end_date: None,
            created_at: format!("2024-01-01T00:00:{:02}Z", n.min(59)),
            updated_at: format!("2024-01-01T00:00:{:02}Z", n.min(59)),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: &str, user_id: &str, changes: WorkoutChanges) -> Result<()> {
        self.check_fail()?;

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|w| w.id == id && w.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("workout {}", id)))?;

        if let Some(sets) = changes.sets {
            row.sets = sets;
        }
        if let Some(completed) = changes.completed {
            row.completed = completed;
        }
        Ok(())
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<()> {
        self.check_fail()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|w| !(w.id == id && w.user_id == user_id));
        Ok(())
    }
}

/// A stored workout with `count` fresh sets, for seeding.
pub fn make_workout(id: &str, user_id: &str, date: NaiveDate, count: u32) -> Workout {
    Workout {
        id: id.to_string(),
        user_id: user_id.to_string(),
        name: format!("Workout {}", id),
        emoji: "🏋️".to_string(),
        date,
        sets: repday::models::WorkoutSet::batch(count, 10),
        completed: false,
        repeat_mode: "none".to_string(),
        repeat_weekdays: vec![],
        repeat_end_date: None,
        created_at: "2024-01-01T01:00:00Z".to_string(),
        updated_at: "2024-01-01T01:00:00Z".to_string(),
    }
}
