//! Runtime configuration.
//!
//! Defaults cover every field. Override via environment variables or
//! explicit construction.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_CHAIN_THRESHOLD: f64 = 0.7;
pub const DEFAULT_DECAY_HALF_LIFE: Duration = Duration::from_secs(3600);
/// Upper bound for `INTENTUM_RATE_WINDOW_SECS`: 366 days.
pub const MAX_RATE_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

/// Process-wide defaults for the policy runtime.
#[derive(Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Requests per window on the decide-with-rate-limit path.
    pub rate_limit: u32,
    pub rate_window: Duration,
    /// Primary-model acceptance threshold for chained inference.
    pub chain_threshold: f64,
    /// Half-life for time-decay similarity.
    pub decay_half_life: Duration,
    /// Whether engines built from this config keep an execution log.
    pub execution_log_enabled: bool,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field(
                "rate_limit",
                &format_args!("{}/{}s", self.rate_limit, self.rate_window.as_secs()),
            )
            .field("chain_threshold", &self.chain_threshold)
            .field("decay_half_life_secs", &self.decay_half_life.as_secs())
            .field("execution_log_enabled", &self.execution_log_enabled)
            .finish()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: DEFAULT_RATE_WINDOW,
            chain_threshold: DEFAULT_CHAIN_THRESHOLD,
            decay_half_life: DEFAULT_DECAY_HALF_LIFE,
            execution_log_enabled: false,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `INTENTUM_RATE_LIMIT` (default: 100)
    /// - `INTENTUM_RATE_WINDOW_SECS` (default: 60, must be in
    ///   `1..=`[`MAX_RATE_WINDOW_SECS`])
    /// - `INTENTUM_CHAIN_THRESHOLD` (default: 0.7, must be in `[0, 1]`)
    /// - `INTENTUM_DECAY_HALF_LIFE_SECS` (default: 3600)
    /// - `INTENTUM_EXECUTION_LOG` (default: false)
    ///
    /// Absent variables take their default. Present but unparsable ones
    /// are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let chain_threshold = parse_var(&lookup, "INTENTUM_CHAIN_THRESHOLD")?
            .unwrap_or(defaults.chain_threshold);
        if !(0.0..=1.0).contains(&chain_threshold) {
            return Err(ConfigError::InvalidValue {
                var: "INTENTUM_CHAIN_THRESHOLD",
                value: chain_threshold.to_string(),
                reason: "must be within [0, 1]".into(),
            });
        }

        let rate_window = match parse_var::<u64>(&lookup, "INTENTUM_RATE_WINDOW_SECS")? {
            Some(secs) if (1..=MAX_RATE_WINDOW_SECS).contains(&secs) => Duration::from_secs(secs),
            Some(secs) => {
                return Err(ConfigError::InvalidValue {
                    var: "INTENTUM_RATE_WINDOW_SECS",
                    value: secs.to_string(),
                    reason: format!("must be within [1, {MAX_RATE_WINDOW_SECS}]"),
                });
            }
            None => defaults.rate_window,
        };

        Ok(Self {
            rate_limit: parse_var(&lookup, "INTENTUM_RATE_LIMIT")?.unwrap_or(defaults.rate_limit),
            rate_window,
            chain_threshold,
            decay_half_life: parse_var(&lookup, "INTENTUM_DECAY_HALF_LIFE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.decay_half_life),
            execution_log_enabled: parse_var(&lookup, "INTENTUM_EXECUTION_LOG")?
                .unwrap_or(defaults.execution_log_enabled),
        })
    }

    /// Per-call rate-limit options for `key` using these defaults.
    pub fn rate_limit_options(&self, key: impl Into<String>) -> RateLimitOptions {
        RateLimitOptions {
            key: key.into(),
            limit: self.rate_limit,
            window: self.rate_window,
        }
    }

    /// Half-life as a `chrono` duration, for time-decay similarity.
    pub fn decay_half_life_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.decay_half_life).unwrap_or(chrono::Duration::MAX)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

/// Rate-limit parameters for one decide call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitOptions {
    pub key: String,
    pub limit: u32,
    pub window: Duration,
}

impl RateLimitOptions {
    pub fn new(key: impl Into<String>, limit: u32, window: Duration) -> Self {
        Self {
            key: key.into(),
            limit,
            window,
        }
    }
}
