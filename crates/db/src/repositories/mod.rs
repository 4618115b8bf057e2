//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod follow_repo;
pub mod notification_repo;
pub mod restaurant_repo;
pub mod search_log_repo;
pub mod session_repo;
pub mod share_repo;
pub mod user_repo;

pub use follow_repo::FollowRepo;
pub use notification_repo::NotificationRepo;
pub use restaurant_repo::RestaurantRepo;
pub use search_log_repo::SearchLogRepo;
pub use session_repo::SessionRepo;
pub use share_repo::ShareRepo;
pub use user_repo::UserRepo;
