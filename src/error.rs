//! Error types for PrayerKit
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Prayer not found: {0}")]
    PrayerNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    #[error("Category already exists: {0}")]
    CategoryExists(String),

    #[error("Priority must be between 0 and 3, got {0}")]
    InvalidPriority(i64),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("{0}")]
    Validation(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
