//! Application state and initialization
//!
//! The embedding application builds everything once at startup through
//! [`AppState::init`]: pool, repository, and the three services, all
//! explicitly wired. There are no ambient singletons anywhere in the
//! crate.

use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::notifications::NotificationService;
use crate::services::{AlertsService, CategoriesService, PrayersService};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub prayers: PrayersService,
    pub categories: CategoriesService,
    pub alerts: AlertsService,
}

impl AppState {
    /// Open (or create) the database at `db_path` and wire up the services
    /// against the given notification service.
    pub async fn init(
        db_path: &Path,
        notifications: Arc<dyn NotificationService>,
    ) -> Result<Self> {
        tracing::info!("Initializing application state");

        let pool = create_pool(db_path).await?;
        let repo = Repository::new(pool);

        let state = Self {
            prayers: PrayersService::new(repo.clone(), Arc::clone(&notifications)),
            categories: CategoriesService::new(repo.clone(), Arc::clone(&notifications)),
            alerts: AlertsService::new(repo, notifications),
        };

        // Warm the category cache so first reads see the stored list
        state.categories.refresh_categories().await?;

        tracing::info!("Application state initialized successfully");
        Ok(state)
    }
}

/// Initialize logging for the embedding application.
/// Honors RUST_LOG, defaulting to debug output for this crate.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prayerkit=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
