//! Bot configuration file model.
//!
//! Field names follow the camelCase layout of the bot's JSON config. The
//! `push` subscription table is kept as raw JSON: it is human-authored and
//! the normalizer drops malformed entries instead of rejecting the file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Default polling interval in seconds.
const DEFAULT_PUSH_CHECK_INTERVAL_SECS: u64 = 60;

/// Default feed interval in seconds.
const DEFAULT_FEED_CHECK_INTERVAL_SECS: u64 = 10;

/// Interactive-lottery posts are marketing noise in the feed.
const DEFAULT_SPAM_PATTERNS: &[&str] = &["详情请点击互动抽奖查看"];

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Verbose logging for push delivery.
    #[serde(default)]
    pub debug: bool,
    /// Bilibili push settings.
    #[serde(default)]
    pub bilibili: BilibiliConfig,
}

/// Bilibili push settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilibiliConfig {
    /// Raw subscription table: creator id -> entry or list of entries.
    #[serde(default)]
    pub push: Value,
    /// Polling interval in seconds (clamped to a minimum by the scheduler).
    #[serde(default = "default_push_check_interval")]
    pub push_check_interval: u64,
    /// Feed interval in seconds (clamped to a minimum by the scheduler).
    #[serde(default = "default_feed_check_interval")]
    pub feed_check_interval: u64,
    /// Incremental feed settings.
    #[serde(default)]
    pub feed: FeedSettings,
}

fn default_push_check_interval() -> u64 {
    DEFAULT_PUSH_CHECK_INTERVAL_SECS
}

fn default_feed_check_interval() -> u64 {
    DEFAULT_FEED_CHECK_INTERVAL_SECS
}

impl Default for BilibiliConfig {
    fn default() -> Self {
        Self {
            push: Value::Null,
            push_check_interval: default_push_check_interval(),
            feed_check_interval: default_feed_check_interval(),
            feed: FeedSettings::default(),
        }
    }
}

/// Incremental dynamic feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSettings {
    /// Use the logged-in account's feed instead of per-creator polling.
    #[serde(default)]
    pub enabled: bool,
    /// Regex patterns; feed posts whose text matches any of them are dropped.
    #[serde(default = "default_spam_patterns")]
    pub spam_patterns: Vec<String>,
}

fn default_spam_patterns() -> Vec<String> {
    DEFAULT_SPAM_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            spam_patterns: default_spam_patterns(),
        }
    }
}

impl BotConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }
}
