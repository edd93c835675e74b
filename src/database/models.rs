//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to the embedding application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// How a prayer repeats, when the user has scheduled it.
///
/// Stored as text; the wire strings predate this crate and are kept
/// for compatibility with exported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PrayerType {
    #[sqlx(rename = "On_Date")]
    #[serde(rename = "On_Date")]
    OnDate,
    Daily,
    Weekly,
}

/// The primary tracked record: a single prayer request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Prayer {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub details: String,
    pub creation_date: DateTime<Utc>,
    /// Due date, present once the user schedules the prayer
    pub added_date: Option<DateTime<Utc>>,
    /// Weekday name for weekly-repeating prayers
    pub weekday: Option<String>,
    pub prayer_type: Option<PrayerType>,
    pub is_date_added: bool,
    pub answered: bool,
    pub answered_notes: String,
    /// Set when the prayer is marked answered, cleared if unmarked
    pub answered_timestamp: Option<DateTime<Utc>>,
    /// 0 (none) through 3 (highest)
    pub priority: i64,
}

/// A named grouping of prayers.
///
/// `prayer_count` is never stored; every category query computes it with a
/// correlated COUNT so it cannot drift from the actual membership.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub creation_date: DateTime<Utc>,
    pub prayer_count: i64,
}

/// A scheduled reminder tied to one prayer and one local notification id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: String,
    pub prayer_id: String,
    pub alert_date: DateTime<Utc>,
    /// Numeric key handed to the platform notification service
    pub notification_id: i64,
    /// Whether the underlying OS notification has been registered
    pub did_schedule: bool,
    /// Display position within the prayer's alert list
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// Create prayer request
#[derive(Debug, Deserialize)]
pub struct CreatePrayerRequest {
    pub name: String,
    pub category_id: String,
    pub details: String,
}

/// Partial update of a prayer's text fields
#[derive(Debug, Deserialize)]
pub struct UpdatePrayerRequest {
    pub id: String,
    pub name: Option<String>,
    pub details: Option<String>,
    pub answered_notes: Option<String>,
}

/// Sort key accepted by the category list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategorySortKey {
    #[default]
    CreationDate,
    Name,
}

impl CategorySortKey {
    pub(crate) fn column(self) -> &'static str {
        match self {
            CategorySortKey::CreationDate => "creation_date",
            CategorySortKey::Name => "name",
        }
    }
}
