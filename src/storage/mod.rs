// SPDX-License-Identifier: MIT
//! SQLite persistence — habits, per-day completions, and mood entries.
//!
//! The schema is bootstrapped with `CREATE TABLE IF NOT EXISTS` on open, so a
//! fresh data directory needs no migration step. Two uniqueness constraints
//! carry domain invariants:
//!
//! - `habit_completions UNIQUE(habit_id, completed_date)` — at most one
//!   completion per habit per calendar day. Concurrent duplicate "complete"
//!   requests race on this constraint; the loser sees
//!   [`StoreError::DuplicateCompletion`].
//! - `mood_entries UNIQUE(user_id, date)` — one mood check-in per day;
//!   later saves overwrite via upsert.
//!
//! All dates are stored as `YYYY-MM-DD` TEXT and compare correctly with
//! lexicographic `BETWEEN`.

use anyhow::{Context as _, Result};
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::mood::Mood;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Typed storage failures. Routes map these onto HTTP statuses; everything
/// else in the daemon wraps them in `anyhow` with context.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("habit not found")]
    HabitNotFound,

    #[error("habit belongs to another user")]
    NotOwner,

    #[error("habit already completed on this date")]
    DuplicateCompletion,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

// ─── Row types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HabitRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Cadence label shown on the habit card (e.g. "daily"). Display only,
    /// not machine-enforced.
    pub reminder_frequency: String,
    /// `in_progress` | `done`.
    pub status: String,
    pub created_at: String,
    /// Cached value of the current streak. Recomputed from completions on
    /// every write that can change it; never incremented in place.
    pub streak: i64,
    pub last_completed_date: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletionRow {
    pub id: String,
    pub habit_id: String,
    pub user_id: String,
    pub completed_date: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MoodEntryRow {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub mood: String,
    pub emoji: String,
    pub note: Option<String>,
    pub updated_at: String,
}

impl MoodEntryRow {
    /// Parse the stored mood label. The CHECK constraint keeps the column in
    /// range, so a parse failure means the database was edited by hand.
    pub fn mood(&self) -> Option<Mood> {
        self.mood.parse().ok()
    }
}

/// Fields accepted by habit create/update.
#[derive(Debug, Clone)]
pub struct HabitFields {
    pub name: String,
    pub description: Option<String>,
    pub reminder_frequency: String,
    pub status: String,
}

// ─── Storage ──────────────────────────────────────────────────────────────────

pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (or create) `reclaim.db` under `data_dir` and bootstrap the schema.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("create data dir {}", data_dir.display()))?;
        let db_path = data_dir.join("reclaim.db");
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
            .context("parse sqlite connection string")?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .context("open sqlite database")?;

        let storage = Self { pool };
        storage.bootstrap_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn bootstrap_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS habits (
                id                  TEXT PRIMARY KEY,
                user_id             TEXT NOT NULL,
                name                TEXT NOT NULL,
                description         TEXT,
                reminder_frequency  TEXT NOT NULL,
                status              TEXT NOT NULL DEFAULT 'in_progress'
                                    CHECK(status IN ('in_progress', 'done')),
                created_at          TEXT NOT NULL,
                streak              INTEGER NOT NULL DEFAULT 0,
                last_completed_date TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .context("create habits table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id)")
            .execute(&self.pool)
            .await
            .context("create habits index")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS habit_completions (
                id             TEXT PRIMARY KEY,
                habit_id       TEXT NOT NULL,
                user_id        TEXT NOT NULL,
                completed_date TEXT NOT NULL,
                UNIQUE(habit_id, completed_date)
            )",
        )
        .execute(&self.pool)
        .await
        .context("create habit_completions table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_completions_user
                ON habit_completions(user_id, completed_date)",
        )
        .execute(&self.pool)
        .await
        .context("create habit_completions index")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS mood_entries (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                date       TEXT NOT NULL,
                mood       TEXT NOT NULL
                           CHECK(mood IN ('great', 'good', 'okay', 'bad', 'terrible')),
                emoji      TEXT NOT NULL,
                note       TEXT,
                updated_at TEXT NOT NULL,
                UNIQUE(user_id, date)
            )",
        )
        .execute(&self.pool)
        .await
        .context("create mood_entries table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_mood_entries_user ON mood_entries(user_id, date)",
        )
        .execute(&self.pool)
        .await
        .context("create mood_entries index")?;

        Ok(())
    }

    // ─── Habits ───────────────────────────────────────────────────────────────

    pub async fn create_habit(
        &self,
        user_id: &str,
        fields: &HabitFields,
    ) -> Result<HabitRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO habits
                (id, user_id, name, description, reminder_frequency, status, created_at, streak)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.reminder_frequency)
        .bind(&fields.status)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        self.get_habit(&id).await?.ok_or(StoreError::HabitNotFound)
    }

    /// List a user's habits, newest first. Habits marked `done` are excluded
    /// unless `include_done` is set.
    pub async fn list_habits(
        &self,
        user_id: &str,
        include_done: bool,
    ) -> Result<Vec<HabitRow>, StoreError> {
        let rows = if include_done {
            sqlx::query_as::<_, HabitRow>(
                "SELECT * FROM habits WHERE user_id = ? ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, HabitRow>(
                "SELECT * FROM habits WHERE user_id = ? AND status != 'done'
                 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    pub async fn get_habit(&self, id: &str) -> Result<Option<HabitRow>, StoreError> {
        let row = sqlx::query_as::<_, HabitRow>("SELECT * FROM habits WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fetch a habit and verify ownership. Unknown id and foreign id are
    /// distinct failures.
    pub async fn get_owned_habit(&self, id: &str, user_id: &str) -> Result<HabitRow, StoreError> {
        let habit = self.get_habit(id).await?.ok_or(StoreError::HabitNotFound)?;
        if habit.user_id != user_id {
            return Err(StoreError::NotOwner);
        }
        Ok(habit)
    }

    pub async fn update_habit(
        &self,
        id: &str,
        user_id: &str,
        fields: &HabitFields,
    ) -> Result<HabitRow, StoreError> {
        let result = sqlx::query(
            "UPDATE habits
                SET name = ?, description = ?, reminder_frequency = ?, status = ?
              WHERE id = ? AND user_id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.reminder_frequency)
        .bind(&fields.status)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_habit(id).await? {
                Some(_) => Err(StoreError::NotOwner),
                None => Err(StoreError::HabitNotFound),
            };
        }
        self.get_habit(id).await?.ok_or(StoreError::HabitNotFound)
    }

    /// Write the streak cache and last-completed date after a recompute.
    pub async fn set_streak(
        &self,
        id: &str,
        user_id: &str,
        streak: u32,
        last_completed_date: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE habits SET streak = ?, last_completed_date = ?
              WHERE id = ? AND user_id = ?",
        )
        .bind(streak as i64)
        .bind(last_completed_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a habit and cascade its completions.
    pub async fn delete_habit(&self, id: &str, user_id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM habits WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return match self.get_habit(id).await? {
                Some(_) => Err(StoreError::NotOwner),
                None => Err(StoreError::HabitNotFound),
            };
        }
        sqlx::query("DELETE FROM habit_completions WHERE habit_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // ─── Completions ──────────────────────────────────────────────────────────

    /// Record a completion for `date`. The UNIQUE(habit_id, completed_date)
    /// constraint is the authoritative duplicate guard — under concurrent
    /// requests exactly one insert wins and the other returns
    /// [`StoreError::DuplicateCompletion`].
    pub async fn add_completion(
        &self,
        habit_id: &str,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<CompletionRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let date_str = date.format(DATE_FORMAT).to_string();
        let result = sqlx::query(
            "INSERT INTO habit_completions (id, habit_id, user_id, completed_date)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(habit_id)
        .bind(user_id)
        .bind(&date_str)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(CompletionRow {
                id,
                habit_id: habit_id.to_string(),
                user_id: user_id.to_string(),
                completed_date: date_str,
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateCompletion)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_completions(&self, habit_id: &str) -> Result<Vec<CompletionRow>, StoreError> {
        let rows = sqlx::query_as::<_, CompletionRow>(
            "SELECT * FROM habit_completions WHERE habit_id = ?
             ORDER BY completed_date DESC",
        )
        .bind(habit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Remove a completion (undo). Returns whether a row was deleted.
    pub async fn delete_completion(
        &self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM habit_completions WHERE habit_id = ? AND completed_date = ?",
        )
        .bind(habit_id)
        .bind(date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All of a user's completions in `[start, end]`, across habits. Feeds
    /// the analytics aggregator.
    pub async fn completions_for_user(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionRow>, StoreError> {
        let rows = sqlx::query_as::<_, CompletionRow>(
            "SELECT * FROM habit_completions
              WHERE user_id = ? AND completed_date BETWEEN ? AND ?
              ORDER BY completed_date ASC",
        )
        .bind(user_id)
        .bind(start.format(DATE_FORMAT).to_string())
        .bind(end.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ─── Mood entries ─────────────────────────────────────────────────────────

    /// Save the mood for (user, date). One entry per day — a later save for
    /// the same day overwrites mood, emoji, and note.
    pub async fn upsert_mood(
        &self,
        user_id: &str,
        date: NaiveDate,
        mood: Mood,
        note: Option<&str>,
    ) -> Result<MoodEntryRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let date_str = date.format(DATE_FORMAT).to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO mood_entries (id, user_id, date, mood, emoji, note, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, date) DO UPDATE SET
                mood = excluded.mood,
                emoji = excluded.emoji,
                note = excluded.note,
                updated_at = excluded.updated_at",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&date_str)
        .bind(mood.as_str())
        .bind(mood.emoji())
        .bind(note)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, MoodEntryRow>(
            "SELECT * FROM mood_entries WHERE user_id = ? AND date = ?",
        )
        .bind(user_id)
        .bind(&date_str)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_moods(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MoodEntryRow>, StoreError> {
        let rows = sqlx::query_as::<_, MoodEntryRow>(
            "SELECT * FROM mood_entries
              WHERE user_id = ? AND date BETWEEN ? AND ?
              ORDER BY date ASC",
        )
        .bind(user_id)
        .bind(start.format(DATE_FORMAT).to_string())
        .bind(end.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_mood(&self, user_id: &str, date: NaiveDate) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM mood_entries WHERE user_id = ? AND date = ?")
            .bind(user_id)
            .bind(date.format(DATE_FORMAT).to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
