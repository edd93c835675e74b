//! Prayers service
//!
//! High-level business logic for prayer records: creation, lookup,
//! scheduling fields, answered state, priority, search and deletion.

use crate::config;
use crate::database::{CreatePrayerRequest, Prayer, PrayerType, Repository, UpdatePrayerRequest};
use crate::error::{AppError, Result};
use crate::notifications::NotificationService;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Service for managing prayers
#[derive(Clone)]
pub struct PrayersService {
    repo: Repository,
    notifications: Arc<dyn NotificationService>,
}

impl PrayersService {
    pub fn new(repo: Repository, notifications: Arc<dyn NotificationService>) -> Self {
        Self {
            repo,
            notifications,
        }
    }

    /// Create a new prayer in a category
    pub async fn create_prayer(
        &self,
        name: String,
        category_id: String,
        details: String,
    ) -> Result<Prayer> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Prayer name is empty".to_string()));
        }
        if trimmed.len() > config::MAX_PRAYER_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Prayer name exceeds {} characters",
                config::MAX_PRAYER_NAME_LENGTH
            )));
        }

        // Surface a CategoryNotFound instead of a foreign-key failure
        self.repo.get_category(&category_id).await?;

        tracing::info!("Creating new prayer: {}", trimmed);

        let prayer = self
            .repo
            .create_prayer(CreatePrayerRequest {
                name: trimmed.to_string(),
                category_id,
                details,
            })
            .await?;

        tracing::info!("Prayer created successfully: {}", prayer.id);
        Ok(prayer)
    }

    /// Get a prayer by ID
    pub async fn get_prayer(&self, id: &str) -> Result<Prayer> {
        self.repo.get_prayer(id).await
    }

    /// List the prayers in a category, newest first
    pub async fn prayers_in_category(&self, category_id: &str) -> Result<Vec<Prayer>> {
        self.repo.list_prayers_in_category(category_id).await
    }

    /// Count the prayers in a category
    pub async fn count_for_category(&self, category_id: &str) -> Result<i64> {
        self.repo.count_prayers_in_category(category_id).await
    }

    /// Update a prayer's text fields
    pub async fn update_prayer(
        &self,
        id: String,
        name: Option<String>,
        details: Option<String>,
    ) -> Result<Prayer> {
        tracing::debug!("Updating prayer: {}", id);

        self.repo
            .update_prayer(UpdatePrayerRequest {
                id,
                name,
                details,
                answered_notes: None,
            })
            .await
    }

    /// Set a prayer's repeat type, due date and weekday together.
    pub async fn set_prayer_schedule(
        &self,
        id: &str,
        prayer_type: Option<PrayerType>,
        added_date: Option<DateTime<Utc>>,
        weekday: Option<String>,
    ) -> Result<Prayer> {
        tracing::debug!("Updating schedule for prayer: {}", id);
        self.repo
            .set_prayer_schedule(id, prayer_type, added_date, weekday)
            .await
    }

    /// Mark a prayer answered (or not), optionally replacing the notes.
    pub async fn set_answered(
        &self,
        id: &str,
        answered: bool,
        notes: Option<String>,
    ) -> Result<Prayer> {
        tracing::info!("Marking prayer {} answered: {}", id, answered);
        self.repo.set_prayer_answered(id, answered, notes).await
    }

    /// Set a prayer's priority (0 through 3)
    pub async fn set_priority(&self, id: &str, priority: i64) -> Result<Prayer> {
        if !(0..=config::MAX_PRIORITY).contains(&priority) {
            return Err(AppError::InvalidPriority(priority));
        }

        self.repo.set_prayer_priority(id, priority).await
    }

    /// Delete a prayer and its alerts, cancelling their notifications.
    pub async fn delete_prayer(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting prayer: {}", id);

        let notification_ids = self.repo.delete_prayer(id).await?;

        for notification_id in notification_ids {
            // Data is already committed; log cancellation failures
            if let Err(e) = self.notifications.cancel(notification_id) {
                tracing::error!(
                    "Failed to cancel notification {}: {}",
                    notification_id,
                    e
                );
            }
        }

        tracing::info!("Prayer deleted successfully: {}", id);
        Ok(())
    }

    /// Search prayers by name or details
    pub async fn search_prayers(&self, query: &str) -> Result<Vec<Prayer>> {
        let all_prayers = self.repo.list_prayers().await?;

        let query_lower = query.to_lowercase();

        let filtered: Vec<Prayer> = all_prayers
            .into_iter()
            .filter(|prayer| {
                prayer.name.to_lowercase().contains(&query_lower)
                    || prayer.details.to_lowercase().contains(&query_lower)
            })
            .collect();

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use crate::notifications::LoggingNotificationService;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> (PrayersService, Repository, String) {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        let category = repo.create_category("Family", Utc::now()).await.unwrap();
        let service = PrayersService::new(repo.clone(), Arc::new(LoggingNotificationService));

        (service, repo, category.id)
    }

    #[tokio::test]
    async fn test_create_and_get_prayer() {
        let (service, _repo, category_id) = create_test_service().await;

        let prayer = service
            .create_prayer("For mom".to_string(), category_id, "Health".to_string())
            .await
            .unwrap();

        assert_eq!(prayer.name, "For mom");
        assert!(!prayer.answered);
        assert_eq!(prayer.priority, 0);

        let fetched = service.get_prayer(&prayer.id).await.unwrap();
        assert_eq!(fetched.id, prayer.id);
    }

    #[tokio::test]
    async fn test_create_prayer_unknown_category() {
        let (service, _repo, _category_id) = create_test_service().await;

        let result = service
            .create_prayer("Orphan".to_string(), "missing".to_string(), String::new())
            .await;

        assert!(matches!(result, Err(AppError::CategoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_prayer_blank_name() {
        let (service, _repo, category_id) = create_test_service().await;

        let result = service
            .create_prayer("  ".to_string(), category_id, String::new())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_priority_bounds() {
        let (service, _repo, category_id) = create_test_service().await;

        let prayer = service
            .create_prayer("Urgent".to_string(), category_id, String::new())
            .await
            .unwrap();

        let updated = service.set_priority(&prayer.id, 3).await.unwrap();
        assert_eq!(updated.priority, 3);

        assert!(matches!(
            service.set_priority(&prayer.id, 4).await,
            Err(AppError::InvalidPriority(4))
        ));
        assert!(matches!(
            service.set_priority(&prayer.id, -1).await,
            Err(AppError::InvalidPriority(-1))
        ));
    }

    #[tokio::test]
    async fn test_answered_round_trip() {
        let (service, _repo, category_id) = create_test_service().await;

        let prayer = service
            .create_prayer("Request".to_string(), category_id, String::new())
            .await
            .unwrap();

        let answered = service
            .set_answered(&prayer.id, true, Some("He answered".to_string()))
            .await
            .unwrap();
        assert!(answered.answered);
        assert!(answered.answered_timestamp.is_some());

        let unanswered = service.set_answered(&prayer.id, false, None).await.unwrap();
        assert!(!unanswered.answered);
        assert!(unanswered.answered_timestamp.is_none());
    }

    #[tokio::test]
    async fn test_search_prayers() {
        let (service, _repo, category_id) = create_test_service().await;

        service
            .create_prayer(
                "For mom".to_string(),
                category_id.clone(),
                "Recovery after surgery".to_string(),
            )
            .await
            .unwrap();
        service
            .create_prayer(
                "New job".to_string(),
                category_id.clone(),
                "Interview on Friday".to_string(),
            )
            .await
            .unwrap();
        service
            .create_prayer("Thanksgiving".to_string(), category_id, String::new())
            .await
            .unwrap();

        let by_name = service.search_prayers("mom").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "For mom");

        let by_details = service.search_prayers("interview").await.unwrap();
        assert_eq!(by_details.len(), 1);
        assert_eq!(by_details[0].name, "New job");

        let none = service.search_prayers("nonexistent").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_delete_prayer_removes_alerts() {
        let (service, repo, category_id) = create_test_service().await;

        let prayer = service
            .create_prayer("Short lived".to_string(), category_id, String::new())
            .await
            .unwrap();
        repo.create_alert(&prayer.id, Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();

        service.delete_prayer(&prayer.id).await.unwrap();

        assert!(service.get_prayer(&prayer.id).await.is_err());
        assert!(repo.list_alerts().await.unwrap().is_empty());
    }
}
