// SPDX-License-Identifier: MIT
//! Daemon configuration — built-in defaults, overlaid by `{data_dir}/config.toml`,
//! overlaid by CLI flags / env vars.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4600;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── RewardsConfig ────────────────────────────────────────────────────────────

/// Streak reward configuration (`[rewards]` in config.toml).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Treat the first completed day of a habit as its own milestone
    /// notification (default: true). When false, the ladder starts at 7.
    pub first_day_milestone: bool,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            first_day_milestone: true,
        }
    }
}

// ─── DaemonConfig ─────────────────────────────────────────────────────────────

/// Resolved daemon configuration shared through `AppContext`.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub port: u16,
    pub bind_address: String,
    pub data_dir: PathBuf,
    /// Log level filter string, e.g. "debug", "info,reclaimd=trace".
    pub log: String,
    /// "pretty" (human-readable) | "json" (structured for log aggregators).
    pub log_format: String,
    pub rewards: RewardsConfig,
}

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 4600).
    port: Option<u16>,
    /// Bind address (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log level filter string (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" | "json".
    log_format: Option<String>,
    /// Streak reward configuration (`[rewards]`).
    rewards: Option<RewardsConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

impl DaemonConfig {
    /// Resolve the configuration.
    ///
    /// Priority for every field:
    ///   1. CLI flag / env var (the `Option` arguments)
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in default
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());
        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);
        let log_format = std::env::var("RECLAIMD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());
        let rewards = toml.rewards.unwrap_or_default();

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            rewards,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/reclaimd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("reclaimd");
        }
    }
    #[cfg(not(target_os = "macos"))]
    {
        // ~/.reclaimd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".reclaimd");
        }
    }
    PathBuf::from(".reclaimd")
}

// ─── Tests ────────────────────────────────────────────────────────────────────
