//! In-memory adapters shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bili_push::adapters::{
    DynamicFeed, DynamicFeedFactory, DynamicSource, EpisodeSource, FeedEntry, LiveSource,
    MessageSink, PushAdapters,
};
use bili_push::config::{BotConfig, CollectionKind, CreatorId};
use bili_push::push::{DynamicPost, LiveRoom, LiveStatus, PostKind, RenderedDynamic};
use bili_push::{Error, Result};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

pub fn bot_config(push: Value) -> BotConfig {
    let mut config = BotConfig::default();
    config.bilibili.push = push;
    config
}

pub fn feed_config(push: Value) -> BotConfig {
    let mut config = bot_config(push);
    config.bilibili.feed.enabled = true;
    config
}

#[derive(Default)]
pub struct Sink {
    sent: Mutex<Vec<(i64, String, Instant)>>,
    notices: Mutex<Vec<Instant>>,
    failing: HashSet<i64>,
}

impl Sink {
    pub fn failing_for(groups: impl IntoIterator<Item = i64>) -> Self {
        Self {
            failing: groups.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent
            .lock()
            .iter()
            .map(|(gid, text, _)| (*gid, text.clone()))
            .collect()
    }

    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent.lock().iter().map(|(_, _, at)| *at).collect()
    }

    pub fn notice_count(&self) -> usize {
        self.notices.lock().len()
    }
}

#[async_trait]
impl MessageSink for Sink {
    async fn send_group_message(&self, group_id: i64, text: &str) -> Result<()> {
        if self.failing.contains(&group_id) {
            return Err(Error::delivery(group_id, "bot was removed from the group"));
        }
        self.sent
            .lock()
            .push((group_id, text.to_string(), Instant::now()));
        Ok(())
    }

    async fn notify_operator(&self, _text: &str) -> Result<()> {
        self.notices.lock().push(Instant::now());
        Ok(())
    }
}

/// Sources backed by scripted data. New dynamics and episodes are handed out once.
#[derive(Default)]
pub struct Sources {
    dynamics: Mutex<HashMap<String, Vec<DynamicPost>>>,
    episodes: Mutex<HashMap<String, Vec<String>>>,
    live: Mutex<HashMap<CreatorId, LiveRoom>>,
    dynamic_calls: Mutex<usize>,
    live_calls: Mutex<usize>,
}

impl Sources {
    pub fn add_dynamic(&self, uid: &str, text: &str) {
        self.dynamics
            .lock()
            .entry(uid.to_string())
            .or_default()
            .push(DynamicPost {
                kind: PostKind::Standard,
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
        self.live.lock().insert(
            uid.to_string(),
            LiveRoom {
                status,
                name: format!("up{uid}"),
                url: format!("https://live.bilibili.com/{uid}?from=feed"),
                title: "live now".to_string(),
                cover: String::new(),
            },
        );
    }

    pub fn dynamic_calls(&self) -> usize {
        *self.dynamic_calls.lock()
    }

    pub fn live_calls(&self) -> usize {
        *self.live_calls.lock()
    }
}

#[async_trait]
impl DynamicSource for Sources {
    async fn fetch_new_dynamics(&self, uid: &str) -> Result<Vec<DynamicPost>> {
        *self.dynamic_calls.lock() += 1;
        Ok(self.dynamics.lock().remove(uid).unwrap_or_default())
    }
}

#[async_trait]
impl LiveSource for Sources {
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
impl EpisodeSource for Sources {
    async fn fetch_new_episodes(&self, key: &str, _kind: CollectionKind) -> Result<Vec<String>> {
        Ok(self.episodes.lock().remove(key).unwrap_or_default())
    }
}

pub struct Entry {
    author: String,
    rendered: RenderedDynamic,
}

impl Entry {
    pub fn boxed(author: &str, id: &str, text: &str) -> Box<dyn FeedEntry> {
        Box::new(Self {
            author: author.to_string(),
            rendered: RenderedDynamic {
                id: id.to_string(),
                kind: PostKind::Standard,
                text: text.to_string(),
            },
        })
    }
}

#[async_trait]
impl FeedEntry for Entry {
    fn author_id(&self) -> &str {
        &self.author
    }

    async fn render(&self) -> Result<RenderedDynamic> {
        Ok(self.rendered.clone())
    }
}

pub struct Feed {
    available: Mutex<bool>,
    pending: Mutex<Vec<Box<dyn FeedEntry>>>,
    fetches: Mutex<usize>,
}

impl Feed {
    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }

    pub fn push(&self, entry: Box<dyn FeedEntry>) {
        self.pending.lock().push(entry);
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock()
    }
}

#[async_trait]
impl DynamicFeed for Feed {
    fn is_available(&self) -> bool {
        *self.available.lock()
    }

    async fn check_and_get_new_items(&self) -> Result<Vec<Box<dyn FeedEntry>>> {
        *self.fetches.lock() += 1;
        Ok(std::mem::take(&mut *self.pending.lock()))
    }
}

#[derive(Default)]
pub struct FeedFactory {
    created: Mutex<Vec<Arc<Feed>>>,
}

impl FeedFactory {
    pub fn created(&self) -> usize {
        self.created.lock().len()
    }

    pub fn latest(&self) -> Arc<Feed> {
        self.created.lock().last().cloned().expect("no feed created yet")
    }
}

impl DynamicFeedFactory for FeedFactory {
    fn create(&self) -> Arc<dyn DynamicFeed> {
        let feed = Arc::new(Feed {
            available: Mutex::new(true),
            pending: Mutex::new(Vec::new()),
            fetches: Mutex::new(0),
        });
        self.created.lock().push(feed.clone());
        feed
    }
}

pub fn adapters(sources: &Arc<Sources>, sink: &Arc<Sink>) -> PushAdapters {
    PushAdapters::new(
        sources.clone(),
        sources.clone(),
        sources.clone(),
        sink.clone(),
    )
}
