//! Local-notification service contract
//!
//! PrayerKit does the bookkeeping around scheduled notifications but never
//! delivers one itself. The embedding application implements
//! [`NotificationService`] over whatever the platform provides; the services
//! in this crate call it with the numeric id stored on each alert.

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Platform notification scheduler, keyed by the numeric id stored on each
/// alert. Implementations must be cheap to call; the services invoke them
/// inline after committing database changes.
pub trait NotificationService: Send + Sync {
    /// Register a timed notification with the platform.
    fn schedule(
        &self,
        notification_id: i64,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<()>;

    /// Cancel a previously registered notification.
    /// Cancelling an id that was never scheduled is not an error.
    fn cancel(&self, notification_id: i64) -> Result<()>;
}

/// Default implementation that only logs. Useful headless and in tests;
/// real delivery comes from the embedding application.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotificationService;

impl NotificationService for LoggingNotificationService {
    fn schedule(
        &self,
        notification_id: i64,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<()> {
        tracing::info!(
            "Notification {} scheduled for {}: {} - {}",
            notification_id,
            fire_at,
            title,
            body
        );
        Ok(())
    }

    fn cancel(&self, notification_id: i64) -> Result<()> {
        tracing::info!("Notification {} cancelled", notification_id);
        Ok(())
    }
}
