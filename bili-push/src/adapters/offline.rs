//! Offline adapters.
//!
//! Sources that never report new content and a sink that writes deliveries to
//! the log. The standalone binary runs with these; embedding applications
//! supply real adapters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{DynamicSource, EpisodeSource, LiveSource, MessageSink, PushAdapters};
use crate::Result;
use crate::config::{CollectionKind, CreatorId};
use crate::push::types::{DynamicPost, LiveRoom};

/// Sources with nothing new to report.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSources;

#[async_trait]
impl DynamicSource for OfflineSources {
    async fn fetch_new_dynamics(&self, _uid: &str) -> Result<Vec<DynamicPost>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl LiveSource for OfflineSources {
    async fn fetch_live_status(
        &self,
        _uids: &[CreatorId],
    ) -> Result<HashMap<CreatorId, LiveRoom>> {
        Ok(HashMap::new())
    }
}

#[async_trait]
impl EpisodeSource for OfflineSources {
    async fn fetch_new_episodes(&self, _key: &str, _kind: CollectionKind) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Sink that logs every message instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn send_group_message(&self, group_id: i64, text: &str) -> Result<()> {
        info!(group_id, "Group message: {}", text);
        Ok(())
    }

    async fn notify_operator(&self, text: &str) -> Result<()> {
        info!("Operator notice: {}", text);
        Ok(())
    }
}

/// Offline sources with the logging sink and no feed.
pub fn adapters() -> PushAdapters {
    let sources = Arc::new(OfflineSources);
    PushAdapters::new(sources.clone(), sources.clone(), sources, Arc::new(LogSink))
}
