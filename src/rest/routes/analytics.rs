// SPDX-License-Identifier: MIT
// rest/routes/analytics.rs — read-only dashboard endpoints. Thin glue: load
// the rows, hand them to the aggregator, serialize the result.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::analytics::aggregator;
use crate::rest::routes::mood::RangeQuery;
use crate::rest::{bad_request, store_error, today, ApiError, UserId};
use crate::storage::DATE_FORMAT;
use crate::AppContext;

#[derive(Deserialize)]
pub struct MonthQuery {
    /// 1–12.
    pub month: u32,
    /// 4-digit year.
    pub year: i32,
}

impl MonthQuery {
    /// First and last day of the requested month.
    fn resolve(&self) -> Result<(NaiveDate, NaiveDate), ApiError> {
        if !(1..=12).contains(&self.month) {
            return Err(bad_request("Month must be between 1 and 12"));
        }
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| bad_request("Invalid month/year"))?;
        let next_month = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        let last = next_month
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .ok_or_else(|| bad_request("Invalid month/year"))?;
        Ok((first, last))
    }
}

// ─── Habit analytics ──────────────────────────────────────────────────────────

pub async fn completion_rates(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = query.resolve()?;
    let habits = ctx
        .storage
        .list_habits(&user.0, false)
        .await
        .map_err(store_error)?;
    let completions = ctx
        .storage
        .completions_for_user(&user.0, start, end)
        .await
        .map_err(store_error)?;
    let rates = aggregator::completion_rates(&habits, &completions, start, end);
    Ok(Json(json!({ "rates": rates })))
}

pub async fn habit_calendar(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Value>, ApiError> {
    let (first, last) = query.resolve()?;
    let habits = ctx
        .storage
        .list_habits(&user.0, false)
        .await
        .map_err(store_error)?;
    let completions = ctx
        .storage
        .completions_for_user(&user.0, first, last)
        .await
        .map_err(store_error)?;
    let days = aggregator::habit_calendar(&habits, &completions, first.month(), first.year());
    Ok(Json(json!({ "calendarDays": days })))
}

pub async fn statistics(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
) -> Result<Json<Value>, ApiError> {
    let habits = ctx
        .storage
        .list_habits(&user.0, true)
        .await
        .map_err(store_error)?;

    let mut by_habit: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
    for habit in &habits {
        let completions = ctx
            .storage
            .list_completions(&habit.id)
            .await
            .map_err(store_error)?;
        let dates = completions
            .iter()
            .filter_map(|c| NaiveDate::parse_from_str(&c.completed_date, DATE_FORMAT).ok())
            .collect();
        by_habit.insert(habit.id.clone(), dates);
    }

    let stats = aggregator::statistics(&habits, &by_habit, today());
    Ok(Json(json!({ "statistics": stats })))
}

// ─── Mood analytics ───────────────────────────────────────────────────────────

pub async fn mood_trends(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = query.resolve()?;
    let entries = ctx
        .storage
        .list_moods(&user.0, start, end)
        .await
        .map_err(store_error)?;
    let trend = aggregator::mood_trend(&entries);
    Ok(Json(json!({ "trends": trend.points, "average": trend.average })))
}

pub async fn mood_distribution(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = query.resolve()?;
    let entries = ctx
        .storage
        .list_moods(&user.0, start, end)
        .await
        .map_err(store_error)?;
    let distribution = aggregator::mood_distribution(&entries);
    Ok(Json(json!({ "distribution": distribution })))
}

pub async fn mood_calendar(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Value>, ApiError> {
    let (first, last) = query.resolve()?;
    let entries = ctx
        .storage
        .list_moods(&user.0, first, last)
        .await
        .map_err(store_error)?;
    let days = aggregator::mood_calendar(&entries);
    Ok(Json(json!({ "entries": days })))
}

// ─── Correlation ──────────────────────────────────────────────────────────────

pub async fn correlation(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = query.resolve()?;
    let entries = ctx
        .storage
        .list_moods(&user.0, start, end)
        .await
        .map_err(store_error)?;
    let completions = ctx
        .storage
        .completions_for_user(&user.0, start, end)
        .await
        .map_err(store_error)?;
    let correlation = aggregator::correlation(&entries, &completions, start, end);
    Ok(Json(json!({
        "averageMoodOnHabitDays": correlation.average_mood_on_habit_days,
        "averageMoodOnNonHabitDays": correlation.average_mood_on_non_habit_days,
        "insight": correlation.insight,
    })))
}
