// SPDX-License-Identifier: MIT
//! Analytics data models — serialisable types returned by the analytics
//! endpoints. Field names are camelCase on the wire to match the web client.

use serde::{Deserialize, Serialize};

// ─── Habit completion rate ────────────────────────────────────────────────────

/// Per-habit completion rate over a date window (`/analytics/habits/completion-rates`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRate {
    pub habit_id: String,
    pub name: String,

    /// Completions recorded inside the window.
    pub completed_count: u32,

    /// Inclusive day-count of the window.
    pub total_days: u32,

    /// `completed_count / total_days * 100`, one decimal. 0 for an empty window.
    pub rate_percent: f64,
}

// ─── Habit calendar ───────────────────────────────────────────────────────────

/// One day of the month-grid habit calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// ISO 8601 calendar date, e.g. `"2026-02-25"`.
    pub date: String,

    pub completed_count: u32,

    /// Denominator for the day's rate. This is the user's *current* habit
    /// count, applied to every day of the month — a deliberate simplification
    /// (habits created later deflate historical rates slightly).
    pub total_habit_count: u32,

    pub rate_percent: f64,

    /// Names of the habits completed on this day.
    pub habits_completed: Vec<String>,
}

// ─── Statistics ───────────────────────────────────────────────────────────────

/// Quick-stats block for the dashboard (`/analytics/habits/statistics`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatistics {
    pub total_habits: u32,
    pub active_habits: u32,
    pub completed_habits: u32,
    pub total_completions: u32,

    /// Habits with a current streak of at least one day.
    pub active_streaks: u32,

    pub longest_streak: LongestStreak,

    /// Active habits completed today.
    pub completed_today: u32,

    /// `completed_today / active_habits * 100`, one decimal. 0 with no
    /// active habits.
    pub completion_rate_today_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestStreak {
    /// Name of the habit holding the record. `None` when there are no habits.
    pub name: Option<String>,
    pub days: u32,
}

// ─── Mood trend ───────────────────────────────────────────────────────────────

/// Mood ordinal time series plus its average (`/analytics/mood/trends`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTrend {
    pub points: Vec<MoodPoint>,

    /// Mean ordinal score, two decimals. 0 when there are no entries.
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodPoint {
    pub date: String,
    /// Ordinal mood score 1–5 (terrible..great).
    pub score: u8,
}

// ─── Mood distribution ────────────────────────────────────────────────────────

/// Count of entries per mood category over a window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodDistribution {
    pub great: u32,
    pub good: u32,
    pub okay: u32,
    pub bad: u32,
    pub terrible: u32,
}

// ─── Mood calendar ────────────────────────────────────────────────────────────

/// One recorded day of the month-grid mood calendar. Days without an entry
/// are simply absent; the client renders them as "no data".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodCalendarDay {
    pub date: String,
    pub mood: String,
    pub emoji: String,
    pub has_note: bool,
}

// ─── Correlation ──────────────────────────────────────────────────────────────

/// Mood↔habit-activity comparison (`/analytics/correlation`). Averages are
/// `None` (omitted as JSON null) when a partition has no mood-scored days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub average_mood_on_habit_days: Option<f64>,
    pub average_mood_on_non_habit_days: Option<f64>,
    pub insight: String,
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_rate_serialises_camel_case() {
        let rate = CompletionRate {
            habit_id: "h1".to_string(),
            name: "Meditate".to_string(),
            completed_count: 12,
            total_days: 30,
            rate_percent: 40.0,
        };
        let json = serde_json::to_value(&rate).unwrap();
        assert_eq!(json["habitId"], "h1");
        assert_eq!(json["ratePercent"], 40.0);
        assert!(json.get("habit_id").is_none());
    }

    #[test]
    fn correlation_null_partition_is_json_null() {
        let corr = Correlation {
            average_mood_on_habit_days: Some(4.0),
            average_mood_on_non_habit_days: None,
            insight: "n/a".to_string(),
        };
        let json = serde_json::to_value(&corr).unwrap();
        assert_eq!(json["averageMoodOnHabitDays"], 4.0);
        assert!(json["averageMoodOnNonHabitDays"].is_null());
    }

    #[test]
    fn mood_distribution_defaults_to_zero() {
        let dist = MoodDistribution::default();
        assert_eq!(dist.great + dist.good + dist.okay + dist.bad + dist.terrible, 0);
    }
}
