// SPDX-License-Identifier: MIT
// rest/mod.rs — HTTP API server for the Reclaim web client.
//
// Axum server, local only by default. Auth lives in the fronting layer; it
// identifies the requesting user via the `X-User-Id` header. Requests without
// the header are rejected with 401.
//
// Endpoints:
//   GET    /api/habits                    ?includeDone=bool
//   POST   /api/habits
//   GET    /api/habits/{id}
//   PUT    /api/habits/{id}
//   DELETE /api/habits/{id}
//   POST   /api/habits/{id}/complete
//   DELETE /api/habits/{id}/complete/{date}
//   GET    /api/habits/{id}/completions
//   GET    /api/mood                      ?startDate&endDate
//   POST   /api/mood
//   DELETE /api/mood/{date}
//   GET    /api/analytics/habits/completion-rates
//   GET    /api/analytics/habits/calendar ?month&year
//   GET    /api/analytics/habits/statistics
//   GET    /api/analytics/mood/trends
//   GET    /api/analytics/mood/distribution
//   GET    /api/analytics/mood/calendar   ?month&year
//   GET    /api/analytics/correlation
//   GET    /health

pub mod routes;

use anyhow::Result;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::storage::{StoreError, DATE_FORMAT};
use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no user header required)
        .route("/health", get(routes::health::health))
        // Habits
        .route(
            "/api/habits",
            get(routes::habits::list_habits).post(routes::habits::create_habit),
        )
        .route(
            "/api/habits/{id}",
            get(routes::habits::get_habit)
                .put(routes::habits::update_habit)
                .delete(routes::habits::delete_habit),
        )
        .route("/api/habits/{id}/complete", post(routes::habits::complete_habit))
        .route(
            "/api/habits/{id}/complete/{date}",
            delete(routes::habits::undo_completion),
        )
        .route(
            "/api/habits/{id}/completions",
            get(routes::habits::list_completions),
        )
        // Mood
        .route(
            "/api/mood",
            get(routes::mood::list_moods).post(routes::mood::save_mood),
        )
        .route("/api/mood/{date}", delete(routes::mood::delete_mood))
        // Analytics
        .route(
            "/api/analytics/habits/completion-rates",
            get(routes::analytics::completion_rates),
        )
        .route(
            "/api/analytics/habits/calendar",
            get(routes::analytics::habit_calendar),
        )
        .route(
            "/api/analytics/habits/statistics",
            get(routes::analytics::statistics),
        )
        .route("/api/analytics/mood/trends", get(routes::analytics::mood_trends))
        .route(
            "/api/analytics/mood/distribution",
            get(routes::analytics::mood_distribution),
        )
        .route(
            "/api/analytics/mood/calendar",
            get(routes::analytics::mood_calendar),
        )
        .route("/api/analytics/correlation", get(routes::analytics::correlation))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

// ─── Shared route plumbing ────────────────────────────────────────────────────

pub type ApiError = (StatusCode, Json<Value>);

/// The requesting user, taken from the `X-User-Id` header set by the
/// fronting auth layer.
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| UserId(v.to_string()))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Not authenticated" })),
                )
            })
    }
}

pub(crate) fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

/// Map a storage failure onto an HTTP response.
pub(crate) fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::HabitNotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Habit not found" })),
        ),
        StoreError::NotOwner => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Habit belongs to another user" })),
        ),
        StoreError::DuplicateCompletion => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Habit already completed on this date" })),
        ),
        StoreError::Db(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

/// Parse a `YYYY-MM-DD` request parameter.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| bad_request(&format!("invalid date '{value}', expected YYYY-MM-DD")))
}

/// The evaluation date for streaks and "today" statistics: the server's
/// local calendar date.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
