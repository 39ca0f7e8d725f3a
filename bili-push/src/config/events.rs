//! Configuration reload events.
//!
//! The push scheduler subscribes to these and rebuilds itself on every
//! reload.

use tokio::sync::broadcast;

/// Events broadcast when the configuration changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdateEvent {
    /// A new configuration snapshot replaced the previous one.
    Reloaded {
        /// Monotonic snapshot counter, starting at 1 for the first reload.
        generation: u64,
    },
}

impl ConfigUpdateEvent {
    /// Get a description of the event for logging.
    pub fn description(&self) -> String {
        match self {
            Self::Reloaded { generation } => format!("Config reloaded (generation {})", generation),
        }
    }
}

/// Channel capacity for config update events.
const CHANNEL_CAPACITY: usize = 16;

/// Broadcaster for configuration update events.
pub(crate) struct ConfigEventBroadcaster {
    sender: broadcast::Sender<ConfigUpdateEvent>,
}

impl ConfigEventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigUpdateEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Returns how many receivers got it.
    pub fn publish(&self, event: ConfigUpdateEvent) -> usize {
        tracing::debug!("Publishing config event: {}", event.description());
        self.sender.send(event).unwrap_or(0)
    }
}
