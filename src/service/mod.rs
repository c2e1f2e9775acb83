//! The badge pipeline assembled from its tiers.

mod badges;
mod builder;

pub use badges::BadgeService;
pub use builder::{BadgeServiceBuilder, DEFAULT_TIMEOUT_SECS};
