//! Integration tests for the analytics aggregator fed from real storage rows.

use chrono::NaiveDate;
use reclaimd::analytics::aggregator;
use reclaimd::mood::Mood;
use reclaimd::storage::{HabitFields, Storage, DATE_FORMAT};
use std::collections::{HashMap, HashSet};
use tempfile::TempDir;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn fields(name: &str) -> HabitFields {
    HabitFields {
        name: name.to_string(),
        description: None,
        reminder_frequency: "daily".to_string(),
        status: "in_progress".to_string(),
    }
}

#[tokio::test]
async fn completion_rates_from_stored_rows() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();

    let meditate = storage.create_habit("u1", &fields("Meditate")).await.unwrap();
    let run = storage.create_habit("u1", &fields("Run")).await.unwrap();
    for date in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        storage.add_completion(&meditate.id, "u1", d(date)).await.unwrap();
    }
    storage.add_completion(&run.id, "u1", d("2024-01-02")).await.unwrap();

    let habits = storage.list_habits("u1", false).await.unwrap();
    let completions = storage
        .completions_for_user("u1", d("2024-01-01"), d("2024-01-10"))
        .await
        .unwrap();
    let rates = aggregator::completion_rates(&habits, &completions, d("2024-01-01"), d("2024-01-10"));

    let meditate_rate = rates.iter().find(|r| r.name == "Meditate").unwrap();
    assert_eq!(meditate_rate.completed_count, 3);
    assert_eq!(meditate_rate.total_days, 10);
    assert_eq!(meditate_rate.rate_percent, 30.0);
    let run_rate = rates.iter().find(|r| r.name == "Run").unwrap();
    assert_eq!(run_rate.rate_percent, 10.0);
}

#[tokio::test]
async fn statistics_over_seeded_store() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let today = d("2024-01-05");

    let meditate = storage.create_habit("u1", &fields("Meditate")).await.unwrap();
    for date in ["2024-01-03", "2024-01-04", "2024-01-05"] {
        storage.add_completion(&meditate.id, "u1", d(date)).await.unwrap();
    }
    let run = storage.create_habit("u1", &fields("Run")).await.unwrap();
    storage.add_completion(&run.id, "u1", d("2024-01-02")).await.unwrap();

    let habits = storage.list_habits("u1", true).await.unwrap();
    let mut by_habit: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
    for habit in &habits {
        let dates = storage
            .list_completions(&habit.id)
            .await
            .unwrap()
            .iter()
            .filter_map(|c| NaiveDate::parse_from_str(&c.completed_date, DATE_FORMAT).ok())
            .collect();
        by_habit.insert(habit.id.clone(), dates);
    }

    let stats = aggregator::statistics(&habits, &by_habit, today);
    assert_eq!(stats.total_habits, 2);
    assert_eq!(stats.active_habits, 2);
    assert_eq!(stats.total_completions, 4);
    assert_eq!(stats.active_streaks, 1);
    assert_eq!(stats.completed_today, 1);
    assert_eq!(stats.completion_rate_today_percent, 50.0);
    assert_eq!(stats.longest_streak.days, 3);
    assert_eq!(stats.longest_streak.name.as_deref(), Some("Meditate"));
}

#[tokio::test]
async fn mood_upsert_overwrites_same_day() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();

    storage
        .upsert_mood("u1", d("2024-01-01"), Mood::Bad, Some("rough morning"))
        .await
        .unwrap();
    let updated = storage
        .upsert_mood("u1", d("2024-01-01"), Mood::Good, None)
        .await
        .unwrap();
    assert_eq!(updated.mood, "good");
    assert!(updated.note.is_none());

    let entries = storage
        .list_moods("u1", d("2024-01-01"), d("2024-01-31"))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn mood_trend_and_distribution_from_store() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();

    let moods = [
        ("2024-01-01", Mood::Great),
        ("2024-01-02", Mood::Great),
        ("2024-01-03", Mood::Okay),
        ("2024-01-04", Mood::Bad),
        ("2024-01-05", Mood::Good),
    ];
    for (date, mood) in moods {
        storage.upsert_mood("u1", d(date), mood, None).await.unwrap();
    }

    let entries = storage
        .list_moods("u1", d("2024-01-01"), d("2024-01-07"))
        .await
        .unwrap();
    let trend = aggregator::mood_trend(&entries);
    assert_eq!(trend.average, 3.80);
    assert_eq!(trend.points.len(), 5);

    let dist = aggregator::mood_distribution(&entries);
    assert_eq!(dist.great, 2);
    assert_eq!(dist.good, 1);
    assert_eq!(dist.okay, 1);
    assert_eq!(dist.bad, 1);
    assert_eq!(dist.terrible, 0);
}

#[tokio::test]
async fn correlation_from_store_favors_habit_days() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let habit = storage.create_habit("u1", &fields("Meditate")).await.unwrap();

    // Habit days with moods 5, 4, 3; habit-free days with 2, 2.
    for (date, mood) in [
        ("2024-01-01", Mood::Great),
        ("2024-01-02", Mood::Good),
        ("2024-01-03", Mood::Okay),
        ("2024-01-04", Mood::Bad),
        ("2024-01-05", Mood::Bad),
    ] {
        storage.upsert_mood("u1", d(date), mood, None).await.unwrap();
    }
    for date in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        storage.add_completion(&habit.id, "u1", d(date)).await.unwrap();
    }

    let entries = storage
        .list_moods("u1", d("2024-01-01"), d("2024-01-07"))
        .await
        .unwrap();
    let completions = storage
        .completions_for_user("u1", d("2024-01-01"), d("2024-01-07"))
        .await
        .unwrap();
    let corr = aggregator::correlation(&entries, &completions, d("2024-01-01"), d("2024-01-07"));
    assert_eq!(corr.average_mood_on_habit_days, Some(4.00));
    assert_eq!(corr.average_mood_on_non_habit_days, Some(2.00));
}

#[tokio::test]
async fn data_is_partitioned_per_user() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();

    let mine = storage.create_habit("u1", &fields("Mine")).await.unwrap();
    storage.create_habit("u2", &fields("Theirs")).await.unwrap();
    storage.add_completion(&mine.id, "u1", d("2024-01-01")).await.unwrap();
    storage.upsert_mood("u2", d("2024-01-01"), Mood::Great, None).await.unwrap();

    assert_eq!(storage.list_habits("u1", true).await.unwrap().len(), 1);
    assert!(storage
        .list_moods("u1", d("2024-01-01"), d("2024-01-31"))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        storage
            .completions_for_user("u2", d("2024-01-01"), d("2024-01-31"))
            .await
            .unwrap()
            .len(),
        0
    );
}
