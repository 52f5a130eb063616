// SPDX-License-Identifier: MIT
// rest/routes/habits.rs — habit CRUD and the mark-complete endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::{bad_request, parse_date, store_error, today, ApiError, UserId};
use crate::storage::{HabitFields, HabitRow};
use crate::AppContext;

const STATUS_IN_PROGRESS: &str = "in_progress";
const STATUS_DONE: &str = "done";

fn habit_json(ctx: &AppContext, habit: &HabitRow) -> Value {
    let badges = ctx.habit_service.policy().earned_badges(habit.streak.max(0) as u32);
    json!({
        "id": habit.id,
        "name": habit.name,
        "description": habit.description,
        "reminderFrequency": habit.reminder_frequency,
        "status": habit.status,
        "createdAt": habit.created_at,
        "streak": habit.streak,
        "lastCompletedDate": habit.last_completed_date,
        "badges": badges,
    })
}

fn validate_fields(
    name: &str,
    reminder_frequency: &str,
    status: &str,
) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(bad_request("Habit name is required"));
    }
    if reminder_frequency.trim().is_empty() {
        return Err(bad_request("Reminder frequency is required"));
    }
    if status != STATUS_IN_PROGRESS && status != STATUS_DONE {
        return Err(bad_request("Status must be 'in_progress' or 'done'"));
    }
    Ok(())
}

// ─── CRUD ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub include_done: Option<bool>,
}

pub async fn list_habits(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let habits = ctx
        .habit_service
        .list(&user.0, query.include_done.unwrap_or(false))
        .await
        .map_err(store_error)?;
    let list: Vec<Value> = habits.iter().map(|h| habit_json(&ctx, h)).collect();
    Ok(Json(json!({ "habits": list })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub name: String,
    pub description: Option<String>,
    pub reminder_frequency: Option<String>,
}

pub async fn create_habit(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Json(body): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let fields = HabitFields {
        name: body.name,
        description: body.description,
        reminder_frequency: body.reminder_frequency.unwrap_or_else(|| "daily".to_string()),
        status: STATUS_IN_PROGRESS.to_string(),
    };
    validate_fields(&fields.name, &fields.reminder_frequency, &fields.status)?;
    let habit = ctx
        .habit_service
        .create(&user.0, &fields)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(habit_json(&ctx, &habit))))
}

pub async fn get_habit(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let habit = ctx
        .habit_service
        .get(&user.0, &id)
        .await
        .map_err(store_error)?;
    Ok(Json(habit_json(&ctx, &habit)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    pub name: String,
    pub description: Option<String>,
    pub reminder_frequency: String,
    pub status: String,
}

pub async fn update_habit(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Path(id): Path<String>,
    Json(body): Json<UpdateHabitRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_fields(&body.name, &body.reminder_frequency, &body.status)?;
    let fields = HabitFields {
        name: body.name,
        description: body.description,
        reminder_frequency: body.reminder_frequency,
        status: body.status,
    };
    let habit = ctx
        .habit_service
        .update(&user.0, &id, &fields)
        .await
        .map_err(store_error)?;
    Ok(Json(habit_json(&ctx, &habit)))
}

pub async fn delete_habit(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ctx.habit_service
        .delete(&user.0, &id)
        .await
        .map_err(store_error)?;
    Ok(Json(json!({ "success": true })))
}

// ─── Completions ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CompleteRequest {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
}

/// Mark a habit complete. Duplicate requests for the same date are a benign
/// no-op: the response carries `alreadyCompleted: true` and the unchanged
/// streak, with no milestone.
pub async fn complete_habit(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let today = today();
    let date = match body.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    if date > today {
        return Err(bad_request("Cannot complete a habit on a future date"));
    }

    let outcome = ctx
        .habit_service
        .mark_complete(&user.0, &id, date, today)
        .await
        .map_err(store_error)?;

    Ok(Json(json!({
        "success": true,
        "streak": outcome.streak,
        "alreadyCompleted": outcome.duplicate,
        "milestone": outcome.milestone,
    })))
}

pub async fn undo_completion(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Path((id, date)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let date = parse_date(&date)?;
    let removed = ctx
        .habit_service
        .undo_completion(&user.0, &id, date, today())
        .await
        .map_err(store_error)?;
    if !removed {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No completion recorded for this date" })),
        ));
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn list_completions(
    State(ctx): State<Arc<AppContext>>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let completions = ctx
        .habit_service
        .completions(&user.0, &id)
        .await
        .map_err(store_error)?;
    let list: Vec<Value> = completions
        .iter()
        .map(|c| json!({ "id": c.id, "habitId": c.habit_id, "completedDate": c.completed_date }))
        .collect();
    Ok(Json(json!({ "completions": list })))
}
