//! Repository layer for database operations
//!
//! All SQL lives here. Multi-row mutations (cascading deletes, bulk moves,
//! alert creation with id assignment) run inside a single transaction so a
//! crash can never leave half a mutation behind.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Categories =====

    /// Create a new category.
    ///
    /// `creation_date` is caller-supplied so imported records keep their
    /// original timestamps.
    pub async fn create_category(
        &self,
        name: &str,
        creation_date: DateTime<Utc>,
    ) -> Result<Category> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, creation_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(creation_date)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Created category: {} ({})", name, id);
        self.get_category(&id).await
    }

    /// Get a category by ID, with its computed prayer count
    pub async fn get_category(&self, id: &str) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.creation_date,
                   (SELECT COUNT(*) FROM prayers p WHERE p.category_id = c.id) AS prayer_count
            FROM categories c
            WHERE c.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::CategoryNotFound(id.to_string()))?;

        Ok(category)
    }

    /// List all categories, sorted
    pub async fn list_categories(
        &self,
        sort_key: CategorySortKey,
        ascending: bool,
    ) -> Result<Vec<Category>> {
        let query = format!(
            r#"
            SELECT c.id, c.name, c.creation_date,
                   (SELECT COUNT(*) FROM prayers p WHERE p.category_id = c.id) AS prayer_count
            FROM categories c
            ORDER BY c.{} {}
            "#,
            sort_key.column(),
            if ascending { "ASC" } else { "DESC" },
        );

        let categories = sqlx::query_as::<_, Category>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    /// List all categories except the named one (for a "move to" picker)
    pub async fn list_categories_excluding(&self, name: &str) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.creation_date,
                   (SELECT COUNT(*) FROM prayers p WHERE p.category_id = c.id) AS prayer_count
            FROM categories c
            WHERE c.name != ?
            ORDER BY c.creation_date DESC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Check whether a category with this name exists
    pub async fn category_exists(&self, name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE name = ? LIMIT 1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Delete a category together with its prayers and their alerts.
    ///
    /// Returns the notification ids of every deleted alert so the caller
    /// can cancel them with the notification service after commit.
    pub async fn delete_category(&self, id: &str) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;

        let notification_ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT a.notification_id
            FROM alerts a
            JOIN prayers p ON a.prayer_id = p.id
            WHERE p.category_id = ?
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM alerts WHERE prayer_id IN (SELECT id FROM prayers WHERE category_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM prayers WHERE category_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::CategoryNotFound(id.to_string()));
        }

        tx.commit().await?;

        tracing::debug!("Deleted category: {}", id);
        Ok(notification_ids)
    }

    /// Reassign every prayer in `from_id` to `to_id` in one bulk update.
    /// Returns the number of prayers moved.
    pub async fn move_prayers(&self, from_id: &str, to_id: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let moved = sqlx::query("UPDATE prayers SET category_id = ? WHERE category_id = ?")
            .bind(to_id)
            .bind(from_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::debug!("Moved {} prayers from {} to {}", moved, from_id, to_id);
        Ok(moved)
    }

    // ===== Prayers =====

    /// Create a new prayer
    pub async fn create_prayer(&self, req: CreatePrayerRequest) -> Result<Prayer> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let prayer = sqlx::query_as::<_, Prayer>(
            r#"
            INSERT INTO prayers (id, category_id, name, details, creation_date,
                                 is_date_added, answered, answered_notes, priority)
            VALUES (?, ?, ?, ?, ?, 0, 0, '', 0)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.category_id)
        .bind(&req.name)
        .bind(&req.details)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created prayer: {}", id);
        Ok(prayer)
    }

    /// Get a prayer by ID
    pub async fn get_prayer(&self, id: &str) -> Result<Prayer> {
        let prayer = sqlx::query_as::<_, Prayer>("SELECT * FROM prayers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::PrayerNotFound(id.to_string()))?;

        Ok(prayer)
    }

    /// List all prayers, newest first
    pub async fn list_prayers(&self) -> Result<Vec<Prayer>> {
        let prayers =
            sqlx::query_as::<_, Prayer>("SELECT * FROM prayers ORDER BY creation_date DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(prayers)
    }

    /// List prayers in a category, newest first
    pub async fn list_prayers_in_category(&self, category_id: &str) -> Result<Vec<Prayer>> {
        let prayers = sqlx::query_as::<_, Prayer>(
            r#"
            SELECT * FROM prayers WHERE category_id = ? ORDER BY creation_date DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prayers)
    }

    /// Count prayers in a category
    pub async fn count_prayers_in_category(&self, category_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prayers WHERE category_id = ?")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Partially update a prayer's text fields
    pub async fn update_prayer(&self, req: UpdatePrayerRequest) -> Result<Prayer> {
        // Build dynamic update query
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(name) = &req.name {
            sets.push("name = ?");
            params.push(name.clone());
        }

        if let Some(details) = &req.details {
            sets.push("details = ?");
            params.push(details.clone());
        }

        if let Some(notes) = &req.answered_notes {
            sets.push("answered_notes = ?");
            params.push(notes.clone());
        }

        if sets.is_empty() {
            return self.get_prayer(&req.id).await;
        }

        let query = format!("UPDATE prayers SET {} WHERE id = ?", sets.join(", "));
        params.push(req.id.clone());

        let mut q = sqlx::query(&query);
        for param in &params {
            q = q.bind(param);
        }

        let rows_affected = q.execute(&self.pool).await?.rows_affected();

        if rows_affected == 0 {
            return Err(AppError::PrayerNotFound(req.id));
        }

        self.get_prayer(&req.id).await
    }

    /// Set the scheduling fields as one unit. `is_date_added` tracks
    /// whether a due date is present.
    pub async fn set_prayer_schedule(
        &self,
        id: &str,
        prayer_type: Option<PrayerType>,
        added_date: Option<DateTime<Utc>>,
        weekday: Option<String>,
    ) -> Result<Prayer> {
        let rows = sqlx::query(
            r#"
            UPDATE prayers
            SET prayer_type = ?, added_date = ?, weekday = ?, is_date_added = ?
            WHERE id = ?
            "#,
        )
        .bind(prayer_type)
        .bind(added_date)
        .bind(&weekday)
        .bind(added_date.is_some())
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::PrayerNotFound(id.to_string()));
        }

        self.get_prayer(id).await
    }

    /// Mark a prayer answered or not. Answering stamps the timestamp;
    /// un-answering clears it. Notes are replaced only when provided.
    pub async fn set_prayer_answered(
        &self,
        id: &str,
        answered: bool,
        notes: Option<String>,
    ) -> Result<Prayer> {
        let timestamp: Option<DateTime<Utc>> = answered.then(Utc::now);

        let rows = sqlx::query(
            r#"
            UPDATE prayers
            SET answered = ?, answered_notes = COALESCE(?, answered_notes), answered_timestamp = ?
            WHERE id = ?
            "#,
        )
        .bind(answered)
        .bind(&notes)
        .bind(timestamp)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::PrayerNotFound(id.to_string()));
        }

        self.get_prayer(id).await
    }

    /// Set a prayer's priority. Range checking happens at the service layer.
    pub async fn set_prayer_priority(&self, id: &str, priority: i64) -> Result<Prayer> {
        let rows = sqlx::query("UPDATE prayers SET priority = ? WHERE id = ?")
            .bind(priority)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::PrayerNotFound(id.to_string()));
        }

        self.get_prayer(id).await
    }

    /// Delete a prayer and its alerts; returns the notification ids of the
    /// deleted alerts for post-commit cancellation.
    pub async fn delete_prayer(&self, id: &str) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;

        let notification_ids: Vec<i64> =
            sqlx::query_scalar("SELECT notification_id FROM alerts WHERE prayer_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM alerts WHERE prayer_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query("DELETE FROM prayers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::PrayerNotFound(id.to_string()));
        }

        tx.commit().await?;

        tracing::debug!("Deleted prayer: {}", id);
        Ok(notification_ids)
    }

    // ===== Alerts =====

    /// Create an alert for a prayer.
    ///
    /// The notification id comes from a monotonic counter
    /// (MAX(notification_id) + 1) assigned inside the insert transaction;
    /// the UNIQUE constraint on the column backstops it. The alert is
    /// appended at the end of the prayer's display order.
    pub async fn create_alert(
        &self,
        prayer_id: &str,
        alert_date: DateTime<Utc>,
    ) -> Result<Alert> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let notification_id: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(notification_id), 0) + 1 FROM alerts")
                .fetch_one(&mut *tx)
                .await?;

        let sort_order: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM alerts WHERE prayer_id = ?",
        )
        .bind(prayer_id)
        .fetch_one(&mut *tx)
        .await?;

        let alert = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (id, prayer_id, alert_date, notification_id,
                                did_schedule, sort_order, created_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(prayer_id)
        .bind(alert_date)
        .bind(notification_id)
        .bind(sort_order)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Created alert: {} for prayer: {}", id, prayer_id);
        Ok(alert)
    }

    /// Get an alert by ID
    pub async fn get_alert(&self, id: &str) -> Result<Alert> {
        let alert = sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::AlertNotFound(id.to_string()))?;

        Ok(alert)
    }

    /// List a prayer's alerts in display order
    pub async fn list_alerts_for_prayer(&self, prayer_id: &str) -> Result<Vec<Alert>> {
        let alerts = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts WHERE prayer_id = ? ORDER BY sort_order ASC
            "#,
        )
        .bind(prayer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// List every stored alert
    pub async fn list_alerts(&self) -> Result<Vec<Alert>> {
        let alerts = sqlx::query_as::<_, Alert>("SELECT * FROM alerts ORDER BY alert_date ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(alerts)
    }

    /// Record that the platform notification for this alert was registered
    pub async fn mark_alert_scheduled(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("UPDATE alerts SET did_schedule = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::AlertNotFound(id.to_string()));
        }

        tracing::debug!("Marked alert as scheduled: {}", id);
        Ok(())
    }

    /// Delete an alert
    pub async fn delete_alert(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM alerts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::AlertNotFound(id.to_string()));
        }

        tracing::debug!("Deleted alert: {}", id);
        Ok(())
    }
}
