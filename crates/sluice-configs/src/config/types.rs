use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Main substrate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SluiceConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub limiter: LimiterSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Single-flight cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum cached entries before LRU eviction (default: 128)
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

/// Quota for one protected operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Requests counted against the window per credential (default: 60)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 300 = 5 minutes)
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl RateLimitSettings {
    /// Window length as a Duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Rate limiting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterSettings {
    #[serde(default)]
    pub reaper: ReaperSettings,

    /// Per-operation quotas, keyed by operation name.
    /// Configure via TOML tables:
    /// [limiter.operations.render_page]
    /// max_requests = 10
    /// window_seconds = 300
    #[serde(default)]
    pub operations: HashMap<String, RateLimitSettings>,
}

/// Background reaper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperSettings {
    /// Seconds between expired-entry sweeps (default: 1800 = 30 minutes)
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

impl ReaperSettings {
    /// Sweep period as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file path; console-only when unset
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// Log format: "compact" or "json" (default: "compact")
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides.
    /// Configure via a TOML table:
    /// [logging.targets]
    /// sluice_core = "debug"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for SluiceConfig {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            limiter: LimiterSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
        }
    }
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            reaper: ReaperSettings::default(),
            operations: HashMap::new(),
        }
    }
}

impl Default for ReaperSettings {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SluiceConfig::default();
        assert_eq!(config.cache.max_entries, 128);
        assert_eq!(config.limiter.reaper.sweep_interval_seconds, 1800);
        assert!(config.limiter.operations.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "compact");
        assert!(config.logging.log_to_console);
    }

    #[test]
    fn test_rate_limit_window_helper() {
        let settings = RateLimitSettings {
            max_requests: 5,
            window_seconds: 90,
        };
        assert_eq!(settings.window(), Duration::from_secs(90));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SluiceConfig = toml::from_str(
            r#"
            [cache]
            max_entries = 4

            [limiter.operations.render_page]
            max_requests = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.max_entries, 4);
        let quota = &config.limiter.operations["render_page"];
        assert_eq!(quota.max_requests, 10);
        assert_eq!(quota.window_seconds, 300);
        assert_eq!(config.logging.level, "info");
    }
}
