// SPDX-License-Identifier: MIT

pub mod analytics;
pub mod config;
pub mod habits;
pub mod mood;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use config::DaemonConfig;
use habits::{HabitService, RewardPolicy};
use storage::Storage;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<DaemonConfig>,
    pub storage: Arc<Storage>,
    pub habit_service: Arc<HabitService>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: Arc<DaemonConfig>, storage: Arc<Storage>) -> Self {
        let policy = RewardPolicy {
            first_day_milestone: config.rewards.first_day_milestone,
        };
        let habit_service = Arc::new(HabitService::new(Arc::clone(&storage), policy));
        Self {
            config,
            storage,
            habit_service,
            started_at: std::time::Instant::now(),
        }
    }
}
