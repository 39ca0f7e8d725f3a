//! Acquisition and delivery adapters.
//!
//! The push scheduler only depends on these traits. Fetching creator data
//! from Bilibili and talking to the chat platform live behind them:
//! - [`DynamicSource`]: new dynamics per creator
//! - [`LiveSource`]: batched live room status
//! - [`EpisodeSource`]: new season/series episodes
//! - [`DynamicFeed`]: incremental feed of the logged-in account
//! - [`MessageSink`]: group message delivery and operator notices

pub mod offline;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::config::{CollectionKind, CreatorId};
use crate::push::types::{DynamicPost, LiveRoom, RenderedDynamic};

/// Per-creator dynamic polling.
#[async_trait]
pub trait DynamicSource: Send + Sync {
    /// Dynamics published since the previous call for this creator.
    async fn fetch_new_dynamics(&self, uid: &str) -> Result<Vec<DynamicPost>>;
}

/// Batched live status polling.
#[async_trait]
pub trait LiveSource: Send + Sync {
    /// Current live room info for the given creators. Creators the
    /// platform did not report on are absent from the map.
    async fn fetch_live_status(&self, uids: &[CreatorId]) -> Result<HashMap<CreatorId, LiveRoom>>;
}

/// Season/series episode polling.
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    /// Rendered announcements of episodes released since the previous call.
    ///
    /// `key` has the form `"<creator>:<collection id>"`.
    async fn fetch_new_episodes(&self, key: &str, kind: CollectionKind) -> Result<Vec<String>>;
}

/// A raw item from the incremental feed.
#[async_trait]
pub trait FeedEntry: Send + Sync {
    /// Author uid.
    fn author_id(&self) -> &str;

    /// Render the item to notification text.
    async fn render(&self) -> Result<RenderedDynamic>;
}

/// Incremental dynamic feed.
#[async_trait]
pub trait DynamicFeed: Send + Sync {
    /// Whether the feed can still be used (e.g. credentials not expired).
    fn is_available(&self) -> bool;

    /// Items not returned by any previous successful call.
    async fn check_and_get_new_items(&self) -> Result<Vec<Box<dyn FeedEntry>>>;
}

/// Builds a fresh feed on every scheduler reinitialization.
pub trait DynamicFeedFactory: Send + Sync {
    fn create(&self) -> Arc<dyn DynamicFeed>;
}

/// Message delivery.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send a message to a group chat.
    async fn send_group_message(&self, group_id: i64, text: &str) -> Result<()>;

    /// Send a notice to the bot operator.
    async fn notify_operator(&self, text: &str) -> Result<()>;
}

/// The full set of adapters the push scheduler runs against.
#[derive(Clone)]
pub struct PushAdapters {
    pub dynamics: Arc<dyn DynamicSource>,
    pub live: Arc<dyn LiveSource>,
    pub episodes: Arc<dyn EpisodeSource>,
    /// Feed mode is only possible when a factory is installed.
    pub feed: Option<Arc<dyn DynamicFeedFactory>>,
    pub sink: Arc<dyn MessageSink>,
}

impl PushAdapters {
    /// Adapters without feed support.
    pub fn new(
        dynamics: Arc<dyn DynamicSource>,
        live: Arc<dyn LiveSource>,
        episodes: Arc<dyn EpisodeSource>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            dynamics,
            live,
            episodes,
            feed: None,
            sink,
        }
    }

    /// Install a feed factory.
    pub fn with_feed(mut self, feed: Arc<dyn DynamicFeedFactory>) -> Self {
        self.feed = Some(feed);
        self
    }
}
