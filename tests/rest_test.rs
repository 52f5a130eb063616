//! HTTP API tests. Spins up the server on a random port and sends raw HTTP
//! requests over a TcpStream.

use reclaimd::{config::DaemonConfig, rest, storage::Storage, AppContext};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Find a free local port by binding to port 0.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn start_server(dir: &TempDir, port: u16) -> Arc<AppContext> {
    let config = Arc::new(DaemonConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
    ));
    let storage = Arc::new(Storage::new(dir.path()).await.unwrap());
    let ctx = Arc::new(AppContext::new(config, storage));

    let ctx_clone = ctx.clone();
    tokio::spawn(async move {
        let _ = rest::start_rest_server(ctx_clone).await;
    });
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    ctx
}

/// Send a raw HTTP/1.1 request and return (status line, parsed JSON body).
async fn request(
    port: u16,
    method: &str,
    path: &str,
    user: Option<&str>,
    body: Option<&str>,
) -> (String, serde_json::Value) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}"))
        .await
        .unwrap();

    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    if let Some(user) = user {
        req.push_str(&format!("X-User-Id: {user}\r\n"));
    }
    match body {
        Some(body) => {
            req.push_str(&format!(
                "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            ));
        }
        None => req.push_str("\r\n"),
    }
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let response = String::from_utf8_lossy(&buf).to_string();

    let status_line = response.lines().next().unwrap_or("").to_string();
    let body_start = response
        .find("\r\n\r\n")
        .map(|i| i + 4)
        .expect("no body in response");
    let json = serde_json::from_str(&response[body_start..]).unwrap_or(serde_json::Value::Null);
    (status_line, json)
}

#[tokio::test]
async fn health_endpoint_reports_version() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (status, body) = request(port, "GET", "/health", None, None).await;
    assert!(status.contains("200"), "expected 200, got: {status}");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn requests_without_user_header_are_rejected() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (status, body) = request(port, "GET", "/api/habits", None, None).await;
    assert!(status.contains("401"), "expected 401, got: {status}");
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn habit_crud_round_trip() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (status, created) = request(
        port,
        "POST",
        "/api/habits",
        Some("u1"),
        Some(r#"{"name":"Meditate","description":"10 minutes"}"#),
    )
    .await;
    assert!(status.contains("201"), "expected 201, got: {status}");
    assert_eq!(created["name"], "Meditate");
    assert_eq!(created["status"], "in_progress");
    assert_eq!(created["streak"], 0);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, list) = request(port, "GET", "/api/habits", Some("u1"), None).await;
    assert!(status.contains("200"));
    assert_eq!(list["habits"].as_array().unwrap().len(), 1);

    // Another user cannot see or touch it.
    let (_, other_list) = request(port, "GET", "/api/habits", Some("u2"), None).await;
    assert!(other_list["habits"].as_array().unwrap().is_empty());
    let (status, _) = request(port, "GET", &format!("/api/habits/{id}"), Some("u2"), None).await;
    assert!(status.contains("403"), "expected 403, got: {status}");

    let (status, _) = request(
        port,
        "DELETE",
        &format!("/api/habits/{id}"),
        Some("u1"),
        None,
    )
    .await;
    assert!(status.contains("200"));
    let (status, _) = request(port, "GET", &format!("/api/habits/{id}"), Some("u1"), None).await;
    assert!(status.contains("404"), "expected 404, got: {status}");
}

#[tokio::test]
async fn create_requires_a_name() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (status, body) = request(
        port,
        "POST",
        "/api/habits",
        Some("u1"),
        Some(r#"{"name":"  "}"#),
    )
    .await;
    assert!(status.contains("400"), "expected 400, got: {status}");
    assert_eq!(body["error"], "Habit name is required");
}

#[tokio::test]
async fn completing_a_habit_returns_streak_and_milestone() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (_, created) = request(
        port,
        "POST",
        "/api/habits",
        Some("u1"),
        Some(r#"{"name":"Run"}"#),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    // Complete for today (empty body date defaults to today).
    let (status, body) = request(
        port,
        "POST",
        &format!("/api/habits/{id}/complete"),
        Some("u1"),
        Some("{}"),
    )
    .await;
    assert!(status.contains("200"), "expected 200, got: {status}");
    assert_eq!(body["streak"], 1);
    assert_eq!(body["alreadyCompleted"], false);
    // First-day milestone is on by default.
    assert_eq!(body["milestone"]["streak"], 1);

    // Completing again the same day is a no-op with no milestone.
    let (status, body) = request(
        port,
        "POST",
        &format!("/api/habits/{id}/complete"),
        Some("u1"),
        Some("{}"),
    )
    .await;
    assert!(status.contains("200"));
    assert_eq!(body["alreadyCompleted"], true);
    assert_eq!(body["streak"], 1);
    assert!(body["milestone"].is_null());
}

#[tokio::test]
async fn future_completion_dates_are_rejected() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (_, created) = request(
        port,
        "POST",
        "/api/habits",
        Some("u1"),
        Some(r#"{"name":"Run"}"#),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        port,
        "POST",
        &format!("/api/habits/{id}/complete"),
        Some("u1"),
        Some(r#"{"date":"2999-01-01"}"#),
    )
    .await;
    assert!(status.contains("400"), "expected 400, got: {status}");

    let (status, body) = request(
        port,
        "POST",
        &format!("/api/habits/{id}/complete"),
        Some("u1"),
        Some(r#"{"date":"not-a-date"}"#),
    )
    .await;
    assert!(status.contains("400"), "expected 400, got: {status}");
    assert!(body["error"].as_str().unwrap().contains("invalid date"));
}

#[tokio::test]
async fn mood_save_and_analytics_flow() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (status, saved) = request(
        port,
        "POST",
        "/api/mood",
        Some("u1"),
        Some(r#"{"mood":"great","note":"sunny"}"#),
    )
    .await;
    assert!(status.contains("200"), "expected 200, got: {status}");
    assert_eq!(saved["mood"], "great");
    assert_eq!(saved["emoji"], "😊");

    // Overwrite the same day.
    let (_, saved) = request(
        port,
        "POST",
        "/api/mood",
        Some("u1"),
        Some(r#"{"mood":"okay"}"#),
    )
    .await;
    assert_eq!(saved["mood"], "okay");

    let (status, body) = request(port, "GET", "/api/mood", Some("u1"), None).await;
    assert!(status.contains("200"));
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);

    let (status, body) = request(
        port,
        "GET",
        "/api/analytics/mood/distribution",
        Some("u1"),
        None,
    )
    .await;
    assert!(status.contains("200"));
    assert_eq!(body["distribution"]["okay"], 1);
    assert_eq!(body["distribution"]["great"], 0);

    let (status, body) = request(port, "GET", "/api/analytics/mood/trends", Some("u1"), None).await;
    assert!(status.contains("200"));
    assert_eq!(body["average"], 3.0);

    let (status, body) = request(
        port,
        "POST",
        "/api/mood",
        Some("u1"),
        Some(r#"{"mood":"fantastic"}"#),
    )
    .await;
    assert!(status.contains("400"), "expected 400, got: {status}");
    assert!(body["error"].as_str().unwrap().contains("Mood must be"));
}

#[tokio::test]
async fn statistics_endpoint_counts_todays_completions() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (_, created) = request(
        port,
        "POST",
        "/api/habits",
        Some("u1"),
        Some(r#"{"name":"Meditate"}"#),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    request(
        port,
        "POST",
        &format!("/api/habits/{id}/complete"),
        Some("u1"),
        Some("{}"),
    )
    .await;

    let (status, body) = request(
        port,
        "GET",
        "/api/analytics/habits/statistics",
        Some("u1"),
        None,
    )
    .await;
    assert!(status.contains("200"));
    let stats = &body["statistics"];
    assert_eq!(stats["totalHabits"], 1);
    assert_eq!(stats["activeHabits"], 1);
    assert_eq!(stats["completedToday"], 1);
    assert_eq!(stats["completionRateTodayPercent"], 100.0);
    assert_eq!(stats["activeStreaks"], 1);
    assert_eq!(stats["longestStreak"]["days"], 1);
}

#[tokio::test]
async fn calendar_validates_month() {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    start_server(&dir, port).await;

    let (status, _) = request(
        port,
        "GET",
        "/api/analytics/habits/calendar?month=13&year=2024",
        Some("u1"),
        None,
    )
    .await;
    assert!(status.contains("400"), "expected 400, got: {status}");

    let (status, body) = request(
        port,
        "GET",
        "/api/analytics/habits/calendar?month=2&year=2024",
        Some("u1"),
        None,
    )
    .await;
    assert!(status.contains("200"));
    assert_eq!(body["calendarDays"].as_array().unwrap().len(), 29);
}
