//! Services module
//!
//! Business logic services that coordinate between the embedding
//! application, the repository and the notification service.

pub mod alerts;
pub mod categories;
pub mod prayers;

pub use alerts::AlertsService;
pub use categories::CategoriesService;
pub use prayers::PrayersService;
