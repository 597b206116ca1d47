use super::types::SluiceConfig;
use std::fs;
use std::path::Path;

impl SluiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment overrides are applied and the result is validated before
    /// it is returned.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config: SluiceConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.finalize()?;

        Ok(config)
    }

    /// Apply environment overrides and validate.
    ///
    /// Call this on configs assembled in code; `from_file` already does.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.apply_env_overrides()?;
        self.validate()?;
        Ok(())
    }

    /// Apply SLUICE_* environment variable overrides.
    ///
    /// Recognized variables:
    /// - SLUICE_LOG_LEVEL
    /// - SLUICE_LOG_FORMAT
    /// - SLUICE_CACHE_MAX_ENTRIES
    /// - SLUICE_REAPER_SWEEP_INTERVAL_SECONDS
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(level) = std::env::var("SLUICE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("SLUICE_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(value) = std::env::var("SLUICE_CACHE_MAX_ENTRIES") {
            self.cache.max_entries = value.parse().map_err(|e| {
                anyhow::anyhow!("Invalid SLUICE_CACHE_MAX_ENTRIES '{}': {}", value, e)
            })?;
        }

        if let Ok(value) = std::env::var("SLUICE_REAPER_SWEEP_INTERVAL_SECONDS") {
            self.limiter.reaper.sweep_interval_seconds = value.parse().map_err(|e| {
                anyhow::anyhow!(
                    "Invalid SLUICE_REAPER_SWEEP_INTERVAL_SECONDS '{}': {}",
                    value,
                    e
                )
            })?;
        }

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache.max_entries == 0 {
            return Err(anyhow::anyhow!("cache max_entries cannot be 0"));
        }

        // Validate log level
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        // Validate log format
        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        // Validate per-target log levels if provided
        for (target, level) in &self.logging.targets {
            if !valid_levels.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    valid_levels.join(", ")
                ));
            }
        }

        if self.limiter.reaper.sweep_interval_seconds == 0 {
            return Err(anyhow::anyhow!("reaper sweep_interval_seconds cannot be 0"));
        }

        // Per-operation quotas; names are fully validated at registration time
        for (name, quota) in &self.limiter.operations {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("operation name cannot be empty"));
            }
            if quota.max_requests == 0 {
                return Err(anyhow::anyhow!(
                    "max_requests for operation '{}' cannot be 0",
                    name
                ));
            }
            if quota.window_seconds == 0 {
                return Err(anyhow::anyhow!(
                    "window_seconds for operation '{}' cannot be 0",
                    name
                ));
            }
        }

        Ok(())
    }
}
