// SPDX-License-Identifier: MIT
//! Streak computation — pure functions over a habit's completion-date set.
//!
//! All functions take an explicit `today` so callers (and tests) control the
//! evaluation date; nothing here reads the system clock. Completions dated
//! after `today` are ignored entirely.

use chrono::{Days, NaiveDate};
use std::collections::HashSet;

// ─── Current streak ───────────────────────────────────────────────────────────

/// Count consecutive completed days ending at `today`.
///
/// Walks backward from `today` one day at a time and stops at the first day
/// with no completion. A habit not completed today therefore has a current
/// streak of 0 — the dashboard surfaces this as a "complete today!" prompt
/// rather than carrying yesterday's run forward.
pub fn current_streak(completion_dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0u32;
    let mut day = today;
    while completion_dates.contains(&day) {
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

// ─── Longest streak ───────────────────────────────────────────────────────────

/// Length of the longest run of consecutive completed days on or before `today`.
///
/// Single sorted scan over the unique dates; every maximal consecutive run is
/// measured once. Always ≥ `current_streak` for the same inputs, since the
/// current streak is itself one such run (or 0).
pub fn longest_streak(completion_dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = completion_dates
        .iter()
        .copied()
        .filter(|d| *d <= today)
        .collect();
    dates.sort_unstable();

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        run = match prev {
            Some(p) if p.checked_add_days(Days::new(1)) == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// Derived streak figures for a habit, computed on read from its completion
/// set. Never persisted as a source of truth — the stored `streak` column is
/// only ever a cache of `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakSnapshot {
    pub current: u32,
    pub longest: u32,
    pub total_completions: u32,
}

pub fn snapshot(completion_dates: &HashSet<NaiveDate>, today: NaiveDate) -> StreakSnapshot {
    StreakSnapshot {
        current: current_streak(completion_dates, today),
        longest: longest_streak(completion_dates, today),
        total_completions: completion_dates.iter().filter(|d| **d <= today).count() as u32,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
