// SPDX-License-Identifier: MIT
//! Habit service — the read-modify-write path behind "mark complete" and the
//! CRUD operations the REST layer exposes.
//!
//! The persisted `streak` column is a cache: every write that can change the
//! completion set (complete, undo) recomputes the streak from the full set
//! and stores the result. Nothing ever increments the cached value.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::storage::{CompletionRow, HabitFields, HabitRow, StoreError, Storage, DATE_FORMAT};

use super::rewards::{MilestoneNotice, RewardPolicy};
use super::streak::{self, StreakSnapshot};

/// Result of a mark-complete request, returned to the client so it can show
/// the fresh streak and any milestone celebration.
#[derive(Debug)]
pub struct CompletionOutcome {
    pub streak: u32,
    pub milestone: Option<MilestoneNotice>,
    /// True when the habit was already completed on this date. The request
    /// is then a benign no-op: no new row, no milestone, streak unchanged.
    pub duplicate: bool,
}

pub struct HabitService {
    storage: Arc<Storage>,
    policy: RewardPolicy,
}

impl HabitService {
    pub fn new(storage: Arc<Storage>, policy: RewardPolicy) -> Self {
        Self { storage, policy }
    }

    pub fn policy(&self) -> RewardPolicy {
        self.policy
    }

    // ─── CRUD ─────────────────────────────────────────────────────────────────

    pub async fn create(&self, user_id: &str, fields: &HabitFields) -> Result<HabitRow, StoreError> {
        let habit = self.storage.create_habit(user_id, fields).await?;
        info!(habit_id = %habit.id, user_id, name = %habit.name, "habit created");
        Ok(habit)
    }

    pub async fn list(&self, user_id: &str, include_done: bool) -> Result<Vec<HabitRow>, StoreError> {
        self.storage.list_habits(user_id, include_done).await
    }

    pub async fn get(&self, user_id: &str, habit_id: &str) -> Result<HabitRow, StoreError> {
        self.storage.get_owned_habit(habit_id, user_id).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        habit_id: &str,
        fields: &HabitFields,
    ) -> Result<HabitRow, StoreError> {
        let habit = self.storage.update_habit(habit_id, user_id, fields).await?;
        info!(habit_id, user_id, status = %habit.status, "habit updated");
        Ok(habit)
    }

    pub async fn delete(&self, user_id: &str, habit_id: &str) -> Result<(), StoreError> {
        self.storage.delete_habit(habit_id, user_id).await?;
        info!(habit_id, user_id, "habit deleted (completions cascaded)");
        Ok(())
    }

    pub async fn completions(&self, user_id: &str, habit_id: &str) -> Result<Vec<CompletionRow>, StoreError> {
        self.storage.get_owned_habit(habit_id, user_id).await?;
        self.storage.list_completions(habit_id).await
    }

    // ─── Mark complete ────────────────────────────────────────────────────────

    /// Record a completion for `date`, recompute the streak anchored at
    /// `today`, persist the cache, and check for a milestone crossing.
    ///
    /// A duplicate completion (same habit, same date) is reported rather
    /// than double-counted: the uniqueness constraint rejects the insert and
    /// the current streak is returned unchanged, with no milestone.
    pub async fn mark_complete(
        &self,
        user_id: &str,
        habit_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<CompletionOutcome, StoreError> {
        let habit = self.storage.get_owned_habit(habit_id, user_id).await?;

        let duplicate = match self.storage.add_completion(habit_id, user_id, date).await {
            Ok(_) => false,
            Err(StoreError::DuplicateCompletion) => {
                debug!(habit_id, %date, "duplicate completion ignored");
                true
            }
            Err(e) => return Err(e),
        };

        let current = self.recompute_streak(&habit, today).await?;

        let milestone = if duplicate {
            None
        } else {
            self.policy.milestone_for(&habit.name, current)
        };
        if let Some(notice) = &milestone {
            info!(habit_id, streak = notice.streak, "milestone reached");
        }

        Ok(CompletionOutcome {
            streak: current,
            milestone,
            duplicate,
        })
    }

    /// Undo a completion and recompute the streak cache.
    /// Returns false when no completion existed for that date.
    pub async fn undo_completion(
        &self,
        user_id: &str,
        habit_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<bool, StoreError> {
        let habit = self.storage.get_owned_habit(habit_id, user_id).await?;
        let removed = self.storage.delete_completion(habit_id, date).await?;
        if removed {
            self.recompute_streak(&habit, today).await?;
            info!(habit_id, %date, "completion removed");
        }
        Ok(removed)
    }

    /// Derived streak figures straight from the completion set, bypassing
    /// the cached column. Used by the statistics view and tests.
    pub async fn snapshot(
        &self,
        user_id: &str,
        habit_id: &str,
        today: NaiveDate,
    ) -> Result<StreakSnapshot, StoreError> {
        self.storage.get_owned_habit(habit_id, user_id).await?;
        let dates = self.completion_dates(habit_id).await?;
        Ok(streak::snapshot(&dates, today))
    }

    // ─── Internals ────────────────────────────────────────────────────────────

    async fn completion_dates(&self, habit_id: &str) -> Result<HashSet<NaiveDate>, StoreError> {
        let rows = self.storage.list_completions(habit_id).await?;
        Ok(rows
            .iter()
            .filter_map(|r| NaiveDate::parse_from_str(&r.completed_date, DATE_FORMAT).ok())
            .collect())
    }

    async fn recompute_streak(&self, habit: &HabitRow, today: NaiveDate) -> Result<u32, StoreError> {
        let dates = self.completion_dates(&habit.id).await?;
        let current = streak::current_streak(&dates, today);
        let last_completed = dates.iter().copied().filter(|d| *d <= today).max();
        self.storage
            .set_streak(&habit.id, &habit.user_id, current, last_completed)
            .await?;
        Ok(current)
    }
}
