//! Per-content-type checks.
//!
//! Each check fetches new content for every subscribed creator and turns it
//! into push tasks, one per item and target. Fetch failures are isolated per
//! creator (or per batch for live) and degrade to "nothing new".

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::feed::SpamFilter;
use super::live_state::LiveStatusStore;
use super::message::{live_message, with_at_all};
use super::task::{PushKind, PushTask};
use super::types::PostKind;
use crate::adapters::{DynamicSource, EpisodeSource, FeedEntry, LiveSource, PushAdapters};
use crate::config::{CollectionKind, CreatorId, DynamicTarget, PushConfig};

/// Runs the checks for one config snapshot.
pub struct PushChecker {
    config: Arc<PushConfig>,
    dynamics: Arc<dyn DynamicSource>,
    live: Arc<dyn LiveSource>,
    episodes: Arc<dyn EpisodeSource>,
    live_store: Arc<Mutex<LiveStatusStore>>,
}

impl PushChecker {
    pub fn new(
        config: Arc<PushConfig>,
        adapters: &PushAdapters,
        live_store: Arc<Mutex<LiveStatusStore>>,
    ) -> Self {
        Self {
            config,
            dynamics: adapters.dynamics.clone(),
            live: adapters.live.clone(),
            episodes: adapters.episodes.clone(),
            live_store,
        }
    }

    pub fn config(&self) -> &Arc<PushConfig> {
        &self.config
    }

    /// Poll new dynamics of every dynamic-subscribed creator.
    pub async fn check_dynamics(&self) -> Vec<PushTask> {
        let table = &self.config.dynamic;
        let results = join_all(
            table
                .keys()
                .map(|uid| async move { self.dynamics.fetch_new_dynamics(uid).await }),
        )
        .await;

        let mut tasks = Vec::new();
        for ((uid, targets), result) in table.iter().zip(results) {
            let posts = match result {
                Ok(posts) => posts,
                Err(e) => {
                    warn!(uid = %uid, "Failed to check dynamics: {}", e);
                    continue;
                }
            };
            for post in &posts {
                push_dynamic(&mut tasks, targets, post.kind, &post.text, None);
            }
        }
        tasks
    }

    /// Poll live status and announce creators that just went live.
    pub async fn check_live(&self) -> Vec<PushTask> {
        let table = &self.config.live;
        if table.is_empty() {
            return Vec::new();
        }

        let uids: Vec<CreatorId> = table.keys().cloned().collect();
        let rooms = match self.live.fetch_live_status(&uids).await {
            Ok(rooms) => rooms,
            Err(e) => {
                warn!("Failed to check live status: {}", e);
                return Vec::new();
            }
        };

        let mut tasks = Vec::new();
        let mut store = self.live_store.lock();
        for (uid, targets) in table {
            let Some(room) = rooms.get(uid) else {
                continue;
            };
            if !store.observe(uid, room.status) {
                continue;
            }
            info!(uid = %uid, name = %room.name, "Creator went live");
            for target in targets {
                tasks.push(PushTask::new(
                    PushKind::Live,
                    target.group_id,
                    live_message(room, target.at_all),
                ));
            }
        }
        tasks
    }

    /// Poll new episodes of every subscribed season or series.
    pub async fn check_collections(&self, kind: CollectionKind) -> Vec<PushTask> {
        let table = self.config.collections(kind);
        let results = join_all(
            table
                .keys()
                .map(|key| async move { self.episodes.fetch_new_episodes(key, kind).await }),
        )
        .await;

        let mut tasks = Vec::new();
        for ((key, targets), result) in table.iter().zip(results) {
            let texts = match result {
                Ok(texts) => texts,
                Err(e) => {
                    warn!(key = %key, "Failed to check {}: {}", kind, e);
                    continue;
                }
            };
            for text in &texts {
                for target in targets {
                    tasks.push(PushTask::new(
                        PushKind::Collection(kind),
                        target.group_id,
                        with_at_all(text, target.at_all),
                    ));
                }
            }
        }
        tasks
    }

    /// Turn a batch of feed items into push tasks.
    ///
    /// Items from creators without a dynamic subscription are ignored. Items
    /// that fail to render or match a spam pattern are skipped.
    pub async fn handle_feed_items(
        &self,
        items: Vec<Box<dyn FeedEntry>>,
        spam: &SpamFilter,
    ) -> Vec<PushTask> {
        let table = &self.config.dynamic;
        let mut by_creator: HashMap<&str, Vec<&dyn FeedEntry>> = HashMap::new();
        for item in &items {
            if table.contains_key(item.author_id()) {
                by_creator
                    .entry(item.author_id())
                    .or_default()
                    .push(item.as_ref());
            }
        }

        let mut tasks = Vec::new();
        for (uid, targets) in table {
            let Some(entries) = by_creator.get(uid.as_str()) else {
                continue;
            };
            for entry in entries {
                let rendered = match entry.render().await {
                    Ok(rendered) => rendered,
                    Err(e) => {
                        warn!(uid = %uid, "Failed to render feed item: {}", e);
                        continue;
                    }
                };
                if spam.is_spam(&rendered.text) {
                    debug!(uid = %uid, id = %rendered.id, "Skipping spam dynamic");
                    continue;
                }
                push_dynamic(
                    &mut tasks,
                    targets,
                    rendered.kind,
                    &rendered.text,
                    Some(&rendered.id),
                );
            }
        }
        tasks
    }
}

fn push_dynamic(
    tasks: &mut Vec<PushTask>,
    targets: &[DynamicTarget],
    kind: PostKind,
    text: &str,
    id: Option<&str>,
) {
    for DynamicTarget { target, video_only } in targets {
        if *video_only && !kind.is_video() {
            continue;
        }
        let task = PushTask::new(
            PushKind::Dynamic,
            target.group_id,
            with_at_all(text, target.at_all),
        );
        tasks.push(match id {
            Some(id) => task.with_source_id(id),
            None => task,
        });
    }
}
