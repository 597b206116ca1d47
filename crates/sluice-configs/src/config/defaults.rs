// Default value functions
pub fn default_cache_max_entries() -> usize {
    128
}

pub fn default_max_requests() -> u32 {
    60
}

pub fn default_window_seconds() -> u64 {
    300 // 5 minutes
}

pub fn default_sweep_interval_seconds() -> u64 {
    1800 // 30 minutes
}

pub fn default_true() -> bool {
    true
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}
