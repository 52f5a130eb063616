// SPDX-License-Identifier: MIT
//! Analytics aggregation — pure compute functions over loaded habit, completion,
//! and mood rows.
//!
//! Nothing here touches the database or the clock: callers load the rows and
//! pass an explicit `today` / date range. Every function tolerates empty
//! input and returns zeroed or empty results — analytics is read-side
//! reporting and must never block a user action.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::{HashMap, HashSet};

use crate::habits::streak;
use crate::mood::Mood;
use crate::storage::{CompletionRow, HabitRow, MoodEntryRow, DATE_FORMAT};

use super::model::{
    CalendarDay, CompletionRate, Correlation, HabitStatistics, LongestStreak, MoodCalendarDay,
    MoodDistribution, MoodPoint, MoodTrend,
};

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Every day of the given month, or empty for an out-of-range month/year.
fn month_days(month: u32, year: i32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut days = Vec::with_capacity(31);
    let mut day = first;
    while day.month() == month {
        days.push(day);
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

// ─── Completion rates ─────────────────────────────────────────────────────────

/// Per-habit completion rate over the inclusive window `[start, end]`.
/// An inverted window has zero days and yields rate 0 for every habit.
pub fn completion_rates(
    habits: &[HabitRow],
    completions: &[CompletionRow],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<CompletionRate> {
    let total_days = if end < start {
        0u32
    } else {
        (end - start).num_days() as u32 + 1
    };

    habits
        .iter()
        .map(|habit| {
            let completed_count = completions
                .iter()
                .filter(|c| c.habit_id == habit.id)
                .filter_map(|c| parse_date(&c.completed_date))
                .filter(|d| *d >= start && *d <= end)
                .count() as u32;
            let rate_percent = if total_days == 0 {
                0.0
            } else {
                round1(completed_count as f64 / total_days as f64 * 100.0)
            };
            CompletionRate {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                completed_count,
                total_days,
                rate_percent,
            }
        })
        .collect()
}

// ─── Habit calendar ───────────────────────────────────────────────────────────

/// Month grid of daily completion ratios. The denominator is the user's
/// current habit count for every day (see [`CalendarDay::total_habit_count`]).
pub fn habit_calendar(
    habits: &[HabitRow],
    completions: &[CompletionRow],
    month: u32,
    year: i32,
) -> Vec<CalendarDay> {
    let names: HashMap<&str, &str> = habits
        .iter()
        .map(|h| (h.id.as_str(), h.name.as_str()))
        .collect();
    let total_habit_count = habits.len() as u32;

    let mut by_date: HashMap<NaiveDate, Vec<&CompletionRow>> = HashMap::new();
    for completion in completions {
        if let Some(date) = parse_date(&completion.completed_date) {
            by_date.entry(date).or_default().push(completion);
        }
    }

    month_days(month, year)
        .into_iter()
        .map(|date| {
            let todays = by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            let habits_completed: Vec<String> = todays
                .iter()
                .filter_map(|c| names.get(c.habit_id.as_str()))
                .map(|n| n.to_string())
                .collect();
            let completed_count = habits_completed.len() as u32;
            let rate_percent = if total_habit_count == 0 {
                0.0
            } else {
                round1(completed_count as f64 / total_habit_count as f64 * 100.0)
            };
            CalendarDay {
                date: date.format(DATE_FORMAT).to_string(),
                completed_count,
                total_habit_count,
                rate_percent,
                habits_completed,
            }
        })
        .collect()
}

// ─── Statistics ───────────────────────────────────────────────────────────────

/// Dashboard quick stats. `completions_by_habit` maps habit id to its full
/// completion-date set; streaks are computed live from the sets, not read
/// from the cached column.
pub fn statistics(
    habits: &[HabitRow],
    completions_by_habit: &HashMap<String, HashSet<NaiveDate>>,
    today: NaiveDate,
) -> HabitStatistics {
    let empty: HashSet<NaiveDate> = HashSet::new();

    let total_habits = habits.len() as u32;
    let active: Vec<&HabitRow> = habits.iter().filter(|h| h.status != "done").collect();
    let active_habits = active.len() as u32;
    let completed_habits = total_habits - active_habits;

    let mut total_completions = 0u32;
    let mut active_streaks = 0u32;
    let mut completed_today = 0u32;
    let mut longest = LongestStreak { name: None, days: 0 };

    for habit in habits {
        let dates = completions_by_habit.get(&habit.id).unwrap_or(&empty);
        total_completions += dates.iter().filter(|d| **d <= today).count() as u32;

        let best = streak::longest_streak(dates, today);
        if best > longest.days {
            longest = LongestStreak {
                name: Some(habit.name.clone()),
                days: best,
            };
        }

        if habit.status != "done" {
            if streak::current_streak(dates, today) >= 1 {
                active_streaks += 1;
            }
            if dates.contains(&today) {
                completed_today += 1;
            }
        }
    }

    let completion_rate_today_percent = if active_habits == 0 {
        0.0
    } else {
        round1(completed_today as f64 / active_habits as f64 * 100.0)
    };

    HabitStatistics {
        total_habits,
        active_habits,
        completed_habits,
        total_completions,
        active_streaks,
        longest_streak: longest,
        completed_today,
        completion_rate_today_percent,
    }
}

// ─── Mood trend ───────────────────────────────────────────────────────────────

/// Ordinal mood time series (date ascending) and its two-decimal average.
pub fn mood_trend(entries: &[MoodEntryRow]) -> MoodTrend {
    let mut points: Vec<MoodPoint> = entries
        .iter()
        .filter_map(|e| {
            let score = e.mood()?.score();
            Some(MoodPoint {
                date: e.date.clone(),
                score,
            })
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));

    let average = if points.is_empty() {
        0.0
    } else {
        let sum: u32 = points.iter().map(|p| p.score as u32).sum();
        round2(sum as f64 / points.len() as f64)
    };

    MoodTrend { points, average }
}

// ─── Mood distribution ────────────────────────────────────────────────────────

pub fn mood_distribution(entries: &[MoodEntryRow]) -> MoodDistribution {
    let mut dist = MoodDistribution::default();
    for entry in entries {
        match entry.mood() {
            Some(Mood::Great) => dist.great += 1,
            Some(Mood::Good) => dist.good += 1,
            Some(Mood::Okay) => dist.okay += 1,
            Some(Mood::Bad) => dist.bad += 1,
            Some(Mood::Terrible) => dist.terrible += 1,
            None => {}
        }
    }
    dist
}

// ─── Mood calendar ────────────────────────────────────────────────────────────

/// Recorded days only; the caller fetches the month's entries and the client
/// renders absent days as "no data".
pub fn mood_calendar(entries: &[MoodEntryRow]) -> Vec<MoodCalendarDay> {
    let mut days: Vec<MoodCalendarDay> = entries
        .iter()
        .map(|e| MoodCalendarDay {
            date: e.date.clone(),
            mood: e.mood.clone(),
            emoji: e.emoji.clone(),
            has_note: e.note.as_deref().is_some_and(|n| !n.is_empty()),
        })
        .collect();
    days.sort_by(|a, b| a.date.cmp(&b.date));
    days
}

// ─── Correlation ──────────────────────────────────────────────────────────────

/// Compare average mood on days with at least one habit completion against
/// days with none, over `[start, end]`. Only days that also have a mood entry
/// contribute to an average; an empty partition reports `None`.
pub fn correlation(
    entries: &[MoodEntryRow],
    completions: &[CompletionRow],
    start: NaiveDate,
    end: NaiveDate,
) -> Correlation {
    let habit_days: HashSet<NaiveDate> = completions
        .iter()
        .filter_map(|c| parse_date(&c.completed_date))
        .filter(|d| *d >= start && *d <= end)
        .collect();

    let mut with_habits: Vec<u8> = Vec::new();
    let mut without_habits: Vec<u8> = Vec::new();
    for entry in entries {
        let Some(date) = parse_date(&entry.date) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        let Some(score) = entry.mood().map(Mood::score) else {
            continue;
        };
        if habit_days.contains(&date) {
            with_habits.push(score);
        } else {
            without_habits.push(score);
        }
    }

    let avg = |scores: &[u8]| -> Option<f64> {
        if scores.is_empty() {
            None
        } else {
            let sum: u32 = scores.iter().map(|s| *s as u32).sum();
            Some(round2(sum as f64 / scores.len() as f64))
        }
    };

    let average_mood_on_habit_days = avg(&with_habits);
    let average_mood_on_non_habit_days = avg(&without_habits);

    let insight = match (average_mood_on_habit_days, average_mood_on_non_habit_days) {
        (Some(with), Some(without)) if with > without => {
            "Your mood tends to be better on days when you complete habits. Keeping up your routines looks like it pays off!".to_string()
        }
        (Some(with), Some(without)) if with < without => {
            "Your mood has been lower on habit days recently. Habits take effort — be kind to yourself and keep going.".to_string()
        }
        (Some(_), Some(_)) => {
            "Your mood is about the same with or without habit completions.".to_string()
        }
        _ => "Not enough data yet to relate mood and habits. Keep logging both!".to_string(),
    };

    Correlation {
        average_mood_on_habit_days,
        average_mood_on_non_habit_days,
        insight,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
