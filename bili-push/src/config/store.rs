//! In-memory configuration snapshot with reload support.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::info;

use crate::Result;

use super::events::{ConfigEventBroadcaster, ConfigUpdateEvent};
use super::settings::BotConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "BILI_PUSH_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Holds the current [`BotConfig`] and announces reloads.
///
/// Readers get a cheap `Arc` snapshot; a reload swaps the snapshot and then
/// publishes [`ConfigUpdateEvent::Reloaded`].
pub struct ConfigStore {
    path: Option<PathBuf>,
    current: RwLock<Arc<BotConfig>>,
    generation: AtomicU64,
    broadcaster: ConfigEventBroadcaster,
}

impl ConfigStore {
    /// Create a store around an already-built config with no backing file.
    pub fn new(config: BotConfig) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(config)),
            generation: AtomicU64::new(0),
            broadcaster: ConfigEventBroadcaster::new(),
        }
    }

    /// Load the config file at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = BotConfig::from_file(&path)?;
        info!(path = %path.display(), "Loaded config");

        let mut store = Self::new(config);
        store.path = Some(path);
        Ok(store)
    }

    /// Load the config file named by `BILI_PUSH_CONFIG`, or `config.json`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load(path)
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current configuration snapshot.
    pub fn current(&self) -> Arc<BotConfig> {
        self.current.read().clone()
    }

    /// Number of reloads applied so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Subscribe to reload events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigUpdateEvent> {
        self.broadcaster.subscribe()
    }

    /// Re-read the backing file and publish a reload.
    ///
    /// On a read or parse error the previous snapshot stays active and no
    /// event is published. A store without a backing file republishes its
    /// current snapshot.
    pub fn reload(&self) -> Result<u64> {
        let config = match &self.path {
            Some(path) => BotConfig::from_file(path)?,
            None => (*self.current()).clone(),
        };
        Ok(self.replace(config))
    }

    /// Swap in a new snapshot and publish a reload. Returns the new generation.
    pub fn replace(&self, config: BotConfig) -> u64 {
        *self.current.write() = Arc::new(config);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "Config reloaded");
        self.broadcaster
            .publish(ConfigUpdateEvent::Reloaded { generation });
        generation
    }
}
