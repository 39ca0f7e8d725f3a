//! Configuration module.
//!
//! - [`BotConfig`]: the JSON config file model
//! - [`PushConfig`]: normalized per-content-type subscription tables
//! - [`ConfigStore`]: current snapshot plus reload events

pub mod events;
pub mod normalize;
pub mod settings;
pub mod store;

pub use events::ConfigUpdateEvent;
pub use normalize::{CollectionKind, CreatorId, DynamicTarget, PushConfig, PushTarget};
pub use settings::{BilibiliConfig, BotConfig, FeedSettings};
pub use store::{CONFIG_PATH_ENV, ConfigStore, DEFAULT_CONFIG_PATH};
