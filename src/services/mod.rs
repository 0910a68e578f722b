// SPDX-License-Identifier: MIT

//! Services module - auth, session, repository, planner.

pub mod auth;
pub mod planner;
pub mod session;
pub mod workouts;

pub use auth::AuthClient;
pub use planner::WorkoutPlanner;
pub use session::{AuthState, SessionStore};
pub use workouts::{NewWorkout, SupabaseWorkouts, WorkoutChanges, WorkoutRepository};
