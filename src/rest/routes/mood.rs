// SPDX-License-Identifier: MIT
// rest/routes/mood.rs — daily mood check-ins (one entry per user per day).

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Days;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::mood::Mood;
use crate::rest::{bad_request, parse_date, store_error, today, ApiError, UserId};
use crate::storage::MoodEntryRow;
use crate::AppContext;

fn entry_json(entry: &MoodEntryRow) -> Value {
    json!({
        "date": entry.date,
        "mood": entry.mood,
        "emoji": entry.emoji,
        "note": entry.note,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeQuery {
    /// Resolve the requested window; defaults to the 30 days ending today.
    pub fn resolve(&self) -> Result<(chrono::NaiveDate, chrono::NaiveDate), ApiError> {
        let end = match self.end_date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => today(),
        };
        let start = match self.start_date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => end.checked_sub_days(Days::new(29)).unwrap_or(end),
        };
        Ok((start, end))
    }
}

pub async fn list_moods(
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
    let list: Vec<Value> = entries.iter().map(entry_json).collect();
    Ok(Json(json!({ "entries": list })))
}

#[derive(Deserialize)]
pub struct SaveMoodRequest {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    pub mood: String,
    pub note: Option<String>,
}

/// Save today's (or a given day's) mood. Saving twice for the same day
/// overwrites the earlier entry.
pub async fn save_mood(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Json(body): Json<SaveMoodRequest>,
) -> Result<Json<Value>, ApiError> {
    let date = match body.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let mood: Mood = body
        .mood
        .parse()
        .map_err(|_| bad_request("Mood must be one of great, good, okay, bad, terrible"))?;
    let entry = ctx
        .storage
        .upsert_mood(&user.0, date, mood, body.note.as_deref())
        .await
        .map_err(store_error)?;
    Ok(Json(entry_json(&entry)))
}

pub async fn delete_mood(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Path(date): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let date = parse_date(&date)?;
    let removed = ctx
        .storage
        .delete_mood(&user.0, date)
        .await
        .map_err(store_error)?;
    Ok(Json(json!({ "success": true, "removed": removed })))
}
