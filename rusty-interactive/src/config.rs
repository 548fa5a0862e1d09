use std::{env, time::Duration};

use rusty_utils::parse::{parse_duration_seconds, parse_flag};

use crate::error::{Result, invalid};

const DEFAULT_TIMEOUT_VAR: &str = "INTERACTIVE_DEFAULT_TIMEOUT";
const MIN_TIMEOUT_VAR: &str = "INTERACTIVE_MIN_TIMEOUT";
const MAX_TIMEOUT_VAR: &str = "INTERACTIVE_MAX_TIMEOUT";
const DEFER_STOP_VAR: &str = "INTERACTIVE_DEFER_STOP_INTERACTIONS";

/// Engine-wide settings shared by every session the service starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractiveConfig {
    /// Used when a caller passes no timeout.
    pub default_timeout: Duration,
    pub min_timeout: Duration,
    pub max_timeout: Duration,
    /// Acknowledge the stopping interaction even when the stop action changes nothing.
    pub defer_stop_interactions: bool,
    /// How long a reaction paginator waits for a typed page number.
    pub jump_input_timeout: Duration,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(120),
            min_timeout: Duration::from_secs(1),
            max_timeout: Duration::from_secs(15 * 60),
            defer_stop_interactions: true,
            jump_input_timeout: Duration::from_secs(30),
        }
    }
}

impl InteractiveConfig {
    /// Read overrides from the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(DEFAULT_TIMEOUT_VAR) {
            config.default_timeout = duration_var(DEFAULT_TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = lookup(MIN_TIMEOUT_VAR) {
            config.min_timeout = duration_var(MIN_TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = lookup(MAX_TIMEOUT_VAR) {
            config.max_timeout = duration_var(MAX_TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = lookup(DEFER_STOP_VAR) {
            config.defer_stop_interactions = parse_flag(&raw)
                .ok_or_else(|| invalid(format!("{DEFER_STOP_VAR} must be true or false")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_timeout > self.max_timeout {
            return Err(invalid(format!(
                "minimum timeout {:?} exceeds maximum timeout {:?}",
                self.min_timeout, self.max_timeout
            )));
        }
        if self.jump_input_timeout.is_zero() {
            return Err(invalid("jump input timeout must be positive"));
        }

        Ok(())
    }

    /// The requested timeout (or the default) forced into `[min_timeout, max_timeout]`.
    pub fn clamp_timeout(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.default_timeout)
            .clamp(self.min_timeout, self.max_timeout)
    }
}

fn duration_var(name: &str, raw: &str) -> Result<Duration> {
    match parse_duration_seconds(raw) {
        Some(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(invalid(format!(
            "{name} must be a positive duration such as 90s or 2m, got {raw:?}"
        ))),
    }
}
