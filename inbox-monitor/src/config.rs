use crate::api::DEFAULT_REQUEST_TIMEOUT;
use crate::countdown::Countdown;
use crate::events::ERROR_BANNER_TTL;
use crate::retry::RetryPolicy;
use std::time::Duration;

/// Configuration for the polling scheduler and its backend
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub base_url: String,

    // Scheduler cadence
    pub tick_millis: u64,
    pub countdown_secs: i32,
    pub stats_refresh_ticks: u32,

    pub banner_dismiss_millis: u64,
    pub request_timeout_millis: u64,
    pub retry: RetryPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),

            tick_millis: 1000,
            countdown_secs: Countdown::DEFAULT_PERIOD,
            stats_refresh_ticks: 10, // every 10 seconds at the default tick

            banner_dismiss_millis: ERROR_BANNER_TTL.as_millis() as u64,
            request_timeout_millis: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            retry: RetryPolicy::default(),
        }
    }
}

macro_rules! env_or_default {
    ($config:expr, $field:ident, $env_var:expr) => {
        if let Ok(val) = std::env::var($env_var) {
            if let Ok(parsed) = val.parse() {
                $config.$field = parsed;
            }
        }
    };
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        env_or_default!(config, base_url, "DASHBOARD_BASE_URL");
        env_or_default!(config, tick_millis, "POLL_TICK_MILLIS");
        env_or_default!(config, countdown_secs, "POLL_COUNTDOWN_SECS");
        env_or_default!(config, stats_refresh_ticks, "STATS_REFRESH_TICKS");
        env_or_default!(config, banner_dismiss_millis, "BANNER_DISMISS_MILLIS");
        env_or_default!(config, request_timeout_millis, "REQUEST_TIMEOUT_MILLIS");
        config.retry = RetryPolicy::from_env();

        config
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }

    pub fn banner_ttl(&self) -> Duration {
        Duration::from_millis(self.banner_dismiss_millis)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_millis.max(1))
    }
}
