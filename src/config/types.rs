use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub show_timestamps: bool,
    pub colored_output: bool,
}

/// Timing knobs for the three watchdog triggers.
///
/// All delays are in milliseconds. The defaults mirror the intervals the
/// controller was tuned against: a 1 s navigation poll, ten readiness probes
/// 500 ms apart after a navigation, and a short debounce before drift checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Interval between URL polls for navigation detection.
    pub poll_interval_ms: u64,
    /// Maximum readiness probes for the new video after a navigation.
    pub reapply_attempts: u32,
    /// Delay before each readiness probe.
    pub reapply_delay_ms: u64,
    /// Quiet period after a style mutation before the drift check runs.
    pub drift_debounce_ms: u64,
    /// Drift reapplies allowed per occupancy before giving up.
    pub drift_reapply_limit: u32,
    /// Settling delay after a fullscreen transition before reapplying.
    pub fullscreen_settle_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for the stored record and preference files.
    /// Defaults to the platform data directory when absent.
    pub storage_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_timestamps: true,
            colored_output: true,
        }
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            reapply_attempts: 10,
            reapply_delay_ms: 500,
            drift_debounce_ms: 200,
            drift_reapply_limit: 5,
            fullscreen_settle_ms: 300,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { storage_dir: None }
    }
}
