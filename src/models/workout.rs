// SPDX-License-Identifier: MIT

//! Workout model and the set-completion state machine.
//!
//! A workout is a named exercise entry for one calendar date, made of an
//! ordered sequence of sets. The workout-level `completed` flag is derived:
//! it is true exactly when every set is completed, and every mutation here
//! re-establishes that invariant. Sets are replaced wholesale, never mutated
//! in place, so change detection stays predictable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lowest accepted number of sets per workout.
pub const MIN_SETS: u32 = 1;
/// Highest accepted number of sets per workout.
pub const MAX_SETS: u32 = 10;
/// Default number of sets when none is given.
pub const DEFAULT_SETS: u32 = 3;
/// Default rep count when none is given or it fails to parse.
pub const DEFAULT_REPS: u32 = 10;
/// Default icon for newly created workouts. Cosmetic only.
pub const DEFAULT_EMOJI: &str = "💪";

/// One repetition-group within a workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Target rep count
    pub reps: u32,
    /// Whether this set has been performed
    pub completed: bool,
}

impl WorkoutSet {
    /// Build `count` fresh (incomplete) sets with the given rep target.
    pub fn batch(count: u32, reps: u32) -> Vec<WorkoutSet> {
        (0..count)
            .map(|_| WorkoutSet {
                reps,
                completed: false,
            })
            .collect()
    }
}

/// A stored workout row.
///
/// `repeat_mode`, `repeat_weekdays` and `repeat_end_date` exist in the
/// remote schema but are carried as inert data; nothing in the client
/// interprets them yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Opaque row identifier, assigned by the store
    pub id: String,
    /// Owning user (opaque identifier); never reassigned
    pub user_id: String,
    /// Exercise name
    pub name: String,
    /// Display icon
    #[serde(default)]
    pub emoji: String,
    /// Calendar date this workout belongs to (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Ordered sequence of sets
    pub sets: Vec<WorkoutSet>,
    /// Derived: true iff every set is completed
    pub completed: bool,
    #[serde(default)]
    pub repeat_mode: String,
    #[serde(default)]
    pub repeat_weekdays: Vec<u8>,
    #[serde(default)]
    pub repeat_end_date: Option<NaiveDate>,
    /// Creation timestamp (ISO 8601), assigned by the store
    #[serde(default)]
    pub created_at: String,
    /// Last-update timestamp (ISO 8601), assigned by the store
    #[serde(default)]
    pub updated_at: String,
}

impl Workout {
    /// True when every set has been completed.
    pub fn all_sets_completed(&self) -> bool {
        self.sets.iter().all(|set| set.completed)
    }

    /// Number of completed sets (progress numerator).
    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|set| set.completed).count()
    }

    /// Toggle the whole workout: if every set is completed, mark all
    /// incomplete; otherwise mark all completed. Returns the next state.
    pub fn toggled_all(&self) -> Workout {
        let target = !self.all_sets_completed();
        let sets = self
            .sets
            .iter()
            .map(|set| WorkoutSet {
                reps: set.reps,
                completed: target,
            })
            .collect();

        Workout {
            sets,
            completed: target,
            ..self.clone()
        }
    }

    /// Complete the next incomplete set, or reset the full cycle.
    ///
    /// If every set is already completed, all sets go back to incomplete.
    /// Otherwise the first incomplete set (lowest index) is marked
    /// completed and the workout flag is recomputed as the conjunction
    /// over all sets. Returns the next state.
    pub fn advanced(&self) -> Workout {
        if self.all_sets_completed() {
            let sets = self
                .sets
                .iter()
                .map(|set| WorkoutSet {
                    reps: set.reps,
                    completed: false,
                })
                .collect();
            return Workout {
                sets,
                completed: false,
                ..self.clone()
            };
        }

        let next_index = match self.sets.iter().position(|set| !set.completed) {
            Some(idx) => idx,
            // Unreachable under the invariant; keep the state as-is.
            None => return self.clone(),
        };

        let sets: Vec<WorkoutSet> = self
            .sets
            .iter()
            .enumerate()
            .map(|(idx, set)| WorkoutSet {
                reps: set.reps,
                completed: set.completed || idx == next_index,
            })
            .collect();
        let completed = sets.iter().all(|set| set.completed);

        Workout {
            sets,
            completed,
            ..self.clone()
        }
    }
}

/// Clamp a requested set count into the accepted 1..=10 range.
pub fn clamp_set_count(count: u32) -> u32 {
    count.clamp(MIN_SETS, MAX_SETS)
}
