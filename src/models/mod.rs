// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod session;
pub mod week;
pub mod workout;

pub use session::{AuthUser, Session};
pub use week::{week_days, WeekDay};
pub use workout::{Workout, WorkoutSet};
