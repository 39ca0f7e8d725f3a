//! In-memory adapters for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::adapters::{
    DynamicFeed, DynamicSource, EpisodeSource, FeedEntry, LiveSource, MessageSink, PushAdapters,
};
use crate::config::{CollectionKind, CreatorId};
use crate::push::types::{DynamicPost, LiveRoom, LiveStatus, PostKind, RenderedDynamic};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub group_id: i64,
    pub text: String,
    pub at: Instant,
}

/// Sink that records deliveries and fails for selected groups.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SentMessage>>,
    notices: Mutex<Vec<(String, Instant)>>,
    failing: HashSet<i64>,
}

impl RecordingSink {
    pub fn failing_for(groups: impl IntoIterator<Item = i64>) -> Self {
        Self {
            failing: groups.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn notices(&self) -> Vec<(String, Instant)> {
        self.notices.lock().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_group_message(&self, group_id: i64, text: &str) -> Result<()> {
        if self.failing.contains(&group_id) {
            return Err(Error::delivery(group_id, "group unreachable"));
        }
        self.sent.lock().push(SentMessage {
            group_id,
            text: text.to_string(),
            at: Instant::now(),
        });
        Ok(())
    }

    async fn notify_operator(&self, text: &str) -> Result<()> {
        self.notices.lock().push((text.to_string(), Instant::now()));
        Ok(())
    }
}

/// Scripted sources. Dynamics and episodes are returned once and then cleared.
#[derive(Default)]
pub struct FakeSources {
    pub dynamics: Mutex<HashMap<String, Vec<DynamicPost>>>,
    pub episodes: Mutex<HashMap<String, Vec<String>>>,
    pub live: Mutex<HashMap<CreatorId, LiveRoom>>,
    pub failing: Mutex<HashSet<String>>,
    pub live_calls: Mutex<usize>,
}

impl FakeSources {
    pub fn add_dynamic(&self, uid: &str, kind: PostKind, text: &str) {
        self.dynamics
            .lock()
            .entry(uid.to_string())
            .or_default()
            .push(DynamicPost {
                kind,
                text: text.to_string(),
            });
    }

    pub fn add_episode(&self, key: &str, text: &str) {
        self.episodes
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(text.to_string());
    }

    pub fn set_live(&self, uid: &str, status: LiveStatus) {
        self.live.lock().insert(uid.to_string(), room(uid, status));
    }

    pub fn fail(&self, key: &str) {
        self.failing.lock().insert(key.to_string());
    }
}

pub fn room(uid: &str, status: LiveStatus) -> LiveRoom {
    LiveRoom {
        status,
        name: format!("creator{uid}"),
        url: format!("https://live.bilibili.com/{uid}"),
        title: "stream".to_string(),
        cover: String::new(),
    }
}

#[async_trait]
impl DynamicSource for FakeSources {
    async fn fetch_new_dynamics(&self, uid: &str) -> Result<Vec<DynamicPost>> {
        if self.failing.lock().contains(uid) {
            return Err(Error::adapter("dynamic", "timeout"));
        }
        Ok(self.dynamics.lock().remove(uid).unwrap_or_default())
    }
}

#[async_trait]
impl LiveSource for FakeSources {
    async fn fetch_live_status(&self, uids: &[CreatorId]) -> Result<HashMap<CreatorId, LiveRoom>> {
        *self.live_calls.lock() += 1;
        let live = self.live.lock();
        Ok(uids
            .iter()
            .filter_map(|uid| live.get(uid).map(|room| (uid.clone(), room.clone())))
            .collect())
    }
}

#[async_trait]
impl EpisodeSource for FakeSources {
    async fn fetch_new_episodes(&self, key: &str, _kind: CollectionKind) -> Result<Vec<String>> {
        if self.failing.lock().contains(key) {
            return Err(Error::adapter("episode", "timeout"));
        }
        Ok(self.episodes.lock().remove(key).unwrap_or_default())
    }
}

/// Feed item with a fixed rendering.
pub struct FakeEntry {
    pub author: String,
    pub rendered: Option<RenderedDynamic>,
}

impl FakeEntry {
    pub fn new(author: &str, id: &str, kind: PostKind, text: &str) -> Self {
        Self {
            author: author.to_string(),
            rendered: Some(RenderedDynamic {
                id: id.to_string(),
                kind,
                text: text.to_string(),
            }),
        }
    }

    pub fn broken(author: &str) -> Self {
        Self {
            author: author.to_string(),
            rendered: None,
        }
    }
}

#[async_trait]
impl FeedEntry for FakeEntry {
    fn author_id(&self) -> &str {
        &self.author
    }

    async fn render(&self) -> Result<RenderedDynamic> {
        self.rendered
            .clone()
            .ok_or_else(|| Error::adapter("feed", "render failed"))
    }
}

/// Feed with a toggleable availability flag and no items.
pub struct FakeFeed {
    available: Mutex<bool>,
}

impl FakeFeed {
    pub fn new() -> Self {
        Self {
            available: Mutex::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }
}

#[async_trait]
impl DynamicFeed for FakeFeed {
    fn is_available(&self) -> bool {
        *self.available.lock()
    }

    async fn check_and_get_new_items(&self) -> Result<Vec<Box<dyn FeedEntry>>> {
        Ok(Vec::new())
    }
}

pub fn adapters(sources: &Arc<FakeSources>, sink: &Arc<RecordingSink>) -> PushAdapters {
    PushAdapters::new(
        sources.clone(),
        sources.clone(),
        sources.clone(),
        sink.clone(),
    )
}
