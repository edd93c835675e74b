//! Alerts service
//!
//! Manages the reminder alerts attached to prayers: creation with unique
//! notification ids, scheduling against the platform notification service,
//! deletion with cancellation, and the periodic purge of expired alerts.

use crate::config;
use crate::database::{Alert, Repository};
use crate::error::Result;
use crate::notifications::NotificationService;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Service for managing prayer alerts
#[derive(Clone)]
pub struct AlertsService {
    repo: Repository,
    notifications: Arc<dyn NotificationService>,
}

impl AlertsService {
    pub fn new(repo: Repository, notifications: Arc<dyn NotificationService>) -> Self {
        Self {
            repo,
            notifications,
        }
    }

    /// Create a new alert for a prayer.
    ///
    /// The alert starts unscheduled; call [`schedule_alert`](Self::schedule_alert)
    /// to register the platform notification.
    pub async fn create_alert(&self, prayer_id: &str, alert_date: DateTime<Utc>) -> Result<Alert> {
        // Fail with PrayerNotFound rather than a foreign-key error
        let prayer = self.repo.get_prayer(prayer_id).await?;

        tracing::info!("Creating alert for prayer {} at {}", prayer.id, alert_date);
        self.repo.create_alert(prayer_id, alert_date).await
    }

    /// Register the platform notification for an alert and record it.
    pub async fn schedule_alert(&self, alert_id: &str) -> Result<Alert> {
        let alert = self.repo.get_alert(alert_id).await?;
        let prayer = self.repo.get_prayer(&alert.prayer_id).await?;

        self.notifications.schedule(
            alert.notification_id,
            alert.alert_date,
            "Prayer Reminder",
            &format!("Time to pray for {}", prayer.name),
        )?;

        self.repo.mark_alert_scheduled(alert_id).await?;

        tracing::info!(
            "Scheduled notification {} for alert {}",
            alert.notification_id,
            alert_id
        );
        self.repo.get_alert(alert_id).await
    }

    /// Delete an alert, cancelling its platform notification first.
    pub async fn delete_alert(&self, alert_id: &str) -> Result<()> {
        let alert = self.repo.get_alert(alert_id).await?;

        self.notifications.cancel(alert.notification_id)?;
        self.repo.delete_alert(alert_id).await?;

        tracing::info!("Deleted alert: {}", alert_id);
        Ok(())
    }

    /// Delete every alert attached to a prayer.
    ///
    /// The alert list is snapshotted first, then deleted in a second pass.
    pub async fn delete_all_alerts_for_prayer(&self, prayer_id: &str) -> Result<usize> {
        let alerts = self.repo.list_alerts_for_prayer(prayer_id).await?;
        let count = alerts.len();

        for alert in alerts {
            self.delete_alert(&alert.id).await?;
        }

        tracing::info!("Deleted {} alerts for prayer {}", count, prayer_id);
        Ok(count)
    }

    /// Delete alerts whose date has passed and whose notification was
    /// actually registered. Past alerts that never got scheduled are left
    /// alone and only logged.
    pub async fn delete_past_alerts(&self) -> Result<usize> {
        let alerts = self.repo.list_alerts().await?;
        let now = Utc::now();

        let mut deleted = 0;
        for alert in alerts {
            if alert.alert_date < now && alert.did_schedule {
                self.delete_alert(&alert.id).await?;
                deleted += 1;
            } else {
                tracing::debug!(
                    "Alert {} is either in the future or has not been scheduled yet; skipping",
                    alert.id
                );
            }
        }

        if deleted > 0 {
            tracing::info!("Purged {} past alerts", deleted);
        }
        Ok(deleted)
    }

    /// List a prayer's alerts in display order
    pub async fn alerts_for_prayer(&self, prayer_id: &str) -> Result<Vec<Alert>> {
        self.repo.list_alerts_for_prayer(prayer_id).await
    }

    /// Start the background purge task.
    ///
    /// Sweeps for expired alerts on a fixed interval until the process
    /// exits. Errors are logged; the loop keeps running.
    pub fn spawn_purge_task(self) {
        tokio::spawn(async move {
            tracing::info!("Starting alert purge task");

            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                config::ALERT_PURGE_INTERVAL_SECS,
            ));

            loop {
                interval.tick().await;

                if let Err(e) = self.delete_past_alerts().await {
                    tracing::error!("Error purging past alerts: {}", e);
                }
            }
        });
    }
}

/// Format an alert date for display as "<long date> at <short time>",
/// e.g. "September 17, 2003 at 3:00 PM".
pub fn format_alert_date(date: DateTime<Utc>) -> String {
    format!(
        "{} at {}",
        date.format(config::ALERT_DATE_FORMAT),
        date.format(config::ALERT_TIME_FORMAT)
    )
}
