//! Pacing and protocol knobs for the hand engine, read once at startup.

use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long a resolved showdown stays visible before the hand completes.
    pub showdown_display: Duration,
    /// Minimum gap between a completed hand and the next deal.
    pub inter_hand_delay: Duration,
    /// Spectator pacing between streets of an all-in runout. Zero deals the board at once.
    pub runout_street_delay: Duration,
    /// A hand still in `dealing` this long after creation is treated as crashed setup.
    pub stale_setup_threshold: Duration,
    /// Largest incremental event list served by sync before falling back to a snapshot.
    pub sync_event_limit: u64,
    pub sweep_interval: Duration,
    /// Spawn delayed advancement tasks. Tests drive time explicitly and turn this off.
    pub scheduler_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            showdown_display: Duration::from_millis(5000),
            inter_hand_delay: Duration::from_millis(3000),
            runout_street_delay: Duration::from_millis(1500),
            stale_setup_threshold: Duration::from_secs(30),
            sync_event_limit: 50,
            sweep_interval: Duration::from_millis(1000),
            scheduler_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Every pacing delay set to zero; automated tests drive time explicitly.
    pub fn immediate() -> Self {
        Self {
            showdown_display: Duration::ZERO,
            inter_hand_delay: Duration::ZERO,
            runout_street_delay: Duration::ZERO,
            scheduler_enabled: false,
            ..Self::default()
        }
    }

    /// Read overrides from the environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            showdown_display: millis_var("SHOWDOWN_DISPLAY_MS", defaults.showdown_display)?,
            inter_hand_delay: millis_var("INTER_HAND_DELAY_MS", defaults.inter_hand_delay)?,
            runout_street_delay: millis_var(
                "RUNOUT_STREET_DELAY_MS",
                defaults.runout_street_delay,
            )?,
            stale_setup_threshold: match parse_var::<u64>("STALE_SETUP_SECS")? {
                Some(secs) => Duration::from_secs(secs),
                None => defaults.stale_setup_threshold,
            },
            sync_event_limit: parse_var::<u64>("SYNC_EVENT_LIMIT")?
                .unwrap_or(defaults.sync_event_limit),
            sweep_interval: millis_var("SWEEP_INTERVAL_MS", defaults.sweep_interval)?,
            scheduler_enabled: match env::var("SCHEDULER_ENABLED") {
                Ok(raw) => !matches!(raw.trim(), "0" | "false" | "off"),
                Err(_) => defaults.scheduler_enabled,
            },
        })
    }

    pub fn with_runout_street_delay(mut self, delay: Duration) -> Self {
        self.runout_street_delay = delay;
        self
    }

    pub fn with_showdown_display(mut self, delay: Duration) -> Self {
        self.showdown_display = delay;
        self
    }

    pub fn with_inter_hand_delay(mut self, delay: Duration) -> Self {
        self.inter_hand_delay = delay;
        self
    }

    pub fn with_stale_setup_threshold(mut self, threshold: Duration) -> Self {
        self.stale_setup_threshold = threshold;
        self
    }

    pub fn with_sync_event_limit(mut self, limit: u64) -> Self {
        self.sync_event_limit = limit;
        self
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration, AppError> {
    Ok(parse_var::<u64>(name)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::config(format!("{name} must be a non-negative integer, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Convert a std duration into a `time` duration for timestamp arithmetic.
pub fn to_time_duration(d: Duration) -> time::Duration {
    time::Duration::try_from(d).unwrap_or(time::Duration::MAX)
}
