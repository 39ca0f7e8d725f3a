//! Deferred message delivery.

use std::fmt;

use tracing::{debug, warn};

use crate::adapters::MessageSink;
use crate::config::CollectionKind;

/// What a push task announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushKind {
    Dynamic,
    Live,
    Collection(CollectionKind),
}

impl fmt::Display for PushKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushKind::Dynamic => f.write_str("dynamic"),
            PushKind::Live => f.write_str("live"),
            PushKind::Collection(kind) => write!(f, "{kind} video"),
        }
    }
}

/// One message to one group, sent later by the task runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTask {
    pub kind: PushKind,
    pub group_id: i64,
    pub text: String,
    /// Upstream id of the pushed item, when known.
    pub source_id: Option<String>,
}

impl PushTask {
    pub fn new(kind: PushKind, group_id: i64, text: impl Into<String>) -> Self {
        Self {
            kind,
            group_id,
            text: text.into(),
            source_id: None,
        }
    }

    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Deliver the message. Failures are logged and reported as `false`.
    pub async fn execute(&self, sink: &dyn MessageSink) -> bool {
        if let Some(id) = &self.source_id {
            debug!(group_id = self.group_id, "Pushing {} {}", self.kind, id);
        }

        match sink.send_group_message(self.group_id, &self.text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    group_id = self.group_id,
                    "Failed to push {} message: {}", self.kind, e
                );
                false
            }
        }
    }
}
