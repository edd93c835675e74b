//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the crate.

// ===== Prayer Limits =====

/// Maximum prayer priority. Priorities run 0 (none) through 3 (highest).
pub const MAX_PRIORITY: i64 = 3;

/// Maximum length for a prayer name.
/// Prevents excessively long values from being stored.
pub const MAX_PRAYER_NAME_LENGTH: usize = 200;

// ===== Category Limits =====

/// Maximum length for a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

// ===== Alert Settings =====

/// How often the background purge task sweeps for expired alerts.
pub const ALERT_PURGE_INTERVAL_SECS: u64 = 3600;

/// Long date style used when displaying an alert date, e.g. "September 17, 2003".
pub const ALERT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Short time style used when displaying an alert time, e.g. "3:00 PM".
pub const ALERT_TIME_FORMAT: &str = "%-I:%M %p";
