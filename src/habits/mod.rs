// SPDX-License-Identifier: MIT
//! Habit tracking core — streak computation, milestone rewards, and the
//! service that ties them to storage.

pub mod rewards;
pub mod service;
pub mod streak;

pub use rewards::{MilestoneNotice, RewardPolicy};
pub use service::{CompletionOutcome, HabitService};
pub use streak::StreakSnapshot;
