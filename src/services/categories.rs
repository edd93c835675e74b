//! Categories service
//!
//! Owns the category list: fetching with sorting, creation, cascading
//! deletion, and moving prayers between categories. Keeps an in-memory
//! cache of the last-fetched list; callers that need to observe changes
//! made elsewhere must refresh explicitly.

use crate::config;
use crate::database::{Category, CategorySortKey, Repository};
use crate::error::{AppError, Result};
use crate::notifications::NotificationService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Service for managing prayer categories
#[derive(Clone)]
pub struct CategoriesService {
    repo: Repository,
    notifications: Arc<dyn NotificationService>,
    categories: Arc<RwLock<Vec<Category>>>,
}

impl CategoriesService {
    pub fn new(repo: Repository, notifications: Arc<dyn NotificationService>) -> Self {
        Self {
            repo,
            notifications,
            categories: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Refresh the cached category list, newest first.
    pub async fn refresh_categories(&self) -> Result<Vec<Category>> {
        self.refresh_categories_sorted(CategorySortKey::CreationDate, false)
            .await
    }

    /// Refresh the cached category list with an explicit sort.
    /// On failure the error propagates and the cache keeps its last
    /// good contents.
    pub async fn refresh_categories_sorted(
        &self,
        sort_key: CategorySortKey,
        ascending: bool,
    ) -> Result<Vec<Category>> {
        let fresh = self.repo.list_categories(sort_key, ascending).await?;

        let mut cache = self.categories.write().await;
        *cache = fresh.clone();

        Ok(fresh)
    }

    /// All categories except the named one, for a "move to" picker.
    /// Always queries fresh; does not touch the cache.
    pub async fn categories_for_move(&self, excluded_name: &str) -> Result<Vec<Category>> {
        self.repo.list_categories_excluding(excluded_name).await
    }

    /// The cached category list. Not a fresh query; call
    /// [`refresh_categories`](Self::refresh_categories) to see changes made
    /// elsewhere.
    pub async fn all_categories(&self) -> Vec<Category> {
        self.categories.read().await.clone()
    }

    /// Number of categories in the cache
    pub async fn all_categories_count(&self) -> usize {
        self.categories.read().await.len()
    }

    /// Create a new category.
    ///
    /// `created_at` is honored as the stored creation date. The new record
    /// is prepended to the cache so it shows up without a refresh.
    pub async fn add_category(
        &self,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is empty".to_string()));
        }
        if name.len() > config::MAX_CATEGORY_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Category name exceeds {} characters",
                config::MAX_CATEGORY_NAME_LENGTH
            )));
        }
        if self.repo.category_exists(name).await? {
            return Err(AppError::CategoryExists(name.to_string()));
        }

        tracing::info!("Creating category: {}", name);
        let category = self.repo.create_category(name, created_at).await?;

        let mut cache = self.categories.write().await;
        cache.insert(0, category.clone());

        Ok(category)
    }

    /// Delete a category together with every prayer in it (and their
    /// alerts). Notifications for the removed alerts are cancelled after
    /// the database change commits, then the cache is refetched.
    pub async fn delete_category(&self, category_id: &str) -> Result<()> {
        let category = self.repo.get_category(category_id).await?;

        tracing::info!(
            "Deleting category {} with {} prayers",
            category.name,
            category.prayer_count
        );

        let notification_ids = self.repo.delete_category(category_id).await?;

        for notification_id in notification_ids {
            // The rows are already gone; a failed cancellation is logged,
            // not surfaced.
            if let Err(e) = self.notifications.cancel(notification_id) {
                tracing::error!(
                    "Failed to cancel notification {}: {}",
                    notification_id,
                    e
                );
            }
        }

        self.refresh_categories().await?;
        Ok(())
    }

    /// Move every prayer in `from_id` into `to_id`.
    /// Returns the number of prayers moved.
    pub async fn move_prayers(&self, from_id: &str, to_id: &str) -> Result<u64> {
        let from = self.repo.get_category(from_id).await?;
        let to = self.repo.get_category(to_id).await?;

        let moved = self.repo.move_prayers(from_id, to_id).await?;

        tracing::info!("Moved {} prayers from {} to {}", moved, from.name, to.name);

        self.refresh_categories().await?;
        Ok(moved)
    }

    /// Look up a cached category by name. Returns `None` when no cached
    /// category carries the name.
    pub async fn category_for_name(&self, name: &str) -> Option<Category> {
        self.categories
            .read()
            .await
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// Check against the database whether a category with this name exists
    pub async fn category_exists(&self, name: &str) -> Result<bool> {
        self.repo.category_exists(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, CreatePrayerRequest};
    use crate::notifications::LoggingNotificationService;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> (CategoriesService, Repository) {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        let service =
            CategoriesService::new(repo.clone(), Arc::new(LoggingNotificationService));

        (service, repo)
    }

    async fn seed_prayer(repo: &Repository, category_id: &str, name: &str) {
        repo.create_prayer(CreatePrayerRequest {
            name: name.to_string(),
            category_id: category_id.to_string(),
            details: String::new(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_add_category_updates_cache_and_count() {
        let (service, _repo) = create_test_service().await;

        service.refresh_categories().await.unwrap();
        let before = service.all_categories_count().await;

        service.add_category("Faith", Utc::now()).await.unwrap();

        assert!(service.category_exists("Faith").await.unwrap());
        assert_eq!(service.all_categories_count().await, before + 1);
        assert_eq!(service.all_categories().await[0].name, "Faith");
    }

    #[tokio::test]
    async fn test_add_category_honors_passed_date() {
        let (service, _repo) = create_test_service().await;

        let imported = Utc::now() - chrono::Duration::days(365);
        let category = service.add_category("Old", imported).await.unwrap();

        assert_eq!(category.creation_date.timestamp(), imported.timestamp());
    }

    #[tokio::test]
    async fn test_add_duplicate_category() {
        let (service, _repo) = create_test_service().await;

        service.add_category("Family", Utc::now()).await.unwrap();
        let result = service.add_category("Family", Utc::now()).await;

        assert!(matches!(result, Err(AppError::CategoryExists(_))));
    }

    #[tokio::test]
    async fn test_add_category_rejects_blank_name() {
        let (service, _repo) = create_test_service().await;

        let result = service.add_category("   ", Utc::now()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_all_categories_is_cached_until_refresh() {
        let (service, repo) = create_test_service().await;

        service.refresh_categories().await.unwrap();

        // A write that bypasses the service is invisible to the cache
        repo.create_category("Hidden", Utc::now()).await.unwrap();
        assert!(service.category_for_name("Hidden").await.is_none());

        service.refresh_categories().await.unwrap();
        assert!(service.category_for_name("Hidden").await.is_some());
    }

    #[tokio::test]
    async fn test_categories_for_move_excludes_named() {
        let (service, _repo) = create_test_service().await;

        service.add_category("Family", Utc::now()).await.unwrap();
        service.add_category("Friends", Utc::now()).await.unwrap();
        service.add_category("Health", Utc::now()).await.unwrap();

        let targets = service.categories_for_move("Family").await.unwrap();

        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|c| c.name != "Family"));
    }

    #[tokio::test]
    async fn test_delete_category_removes_prayers_and_cache_entry() {
        let (service, repo) = create_test_service().await;

        let doomed = service.add_category("Doomed", Utc::now()).await.unwrap();
        let kept = service.add_category("Kept", Utc::now()).await.unwrap();
        seed_prayer(&repo, &doomed.id, "One").await;
        seed_prayer(&repo, &doomed.id, "Two").await;

        service.delete_category(&doomed.id).await.unwrap();

        assert!(service.category_for_name("Doomed").await.is_none());
        assert!(service
            .all_categories()
            .await
            .iter()
            .all(|c| c.id != doomed.id));
        assert_eq!(repo.list_prayers().await.unwrap().len(), 0);
        assert!(repo.get_category(&kept.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_move_prayers_counts() {
        let (service, repo) = create_test_service().await;

        let from = service.add_category("From", Utc::now()).await.unwrap();
        let to = service.add_category("To", Utc::now()).await.unwrap();
        seed_prayer(&repo, &from.id, "One").await;
        seed_prayer(&repo, &from.id, "Two").await;
        seed_prayer(&repo, &to.id, "Three").await;

        let moved = service.move_prayers(&from.id, &to.id).await.unwrap();
        assert_eq!(moved, 2);

        let from_after = service.category_for_name("From").await.unwrap();
        let to_after = service.category_for_name("To").await.unwrap();
        assert_eq!(from_after.prayer_count, 0);
        assert_eq!(to_after.prayer_count, 3);

        let prayers = repo.list_prayers().await.unwrap();
        assert!(prayers.iter().all(|p| p.category_id == to.id));
    }

    #[tokio::test]
    async fn test_move_prayers_to_missing_category() {
        let (service, _repo) = create_test_service().await;

        let from = service.add_category("From", Utc::now()).await.unwrap();
        let result = service.move_prayers(&from.id, "missing").await;

        assert!(matches!(result, Err(AppError::CategoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_category_for_name_missing_returns_none() {
        let (service, _repo) = create_test_service().await;

        service.refresh_categories().await.unwrap();

        assert!(service.category_for_name("Nope").await.is_none());
    }
}
