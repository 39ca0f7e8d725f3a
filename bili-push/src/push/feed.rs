//! Feed availability tracking and spam filtering.
//!
//! - `SpamFilter`: drops feed items whose text matches a configured pattern
//! - `FeedMonitor`: latches the feed as unavailable once the adapter reports it
//! - `remind_operator`: repeats the unavailability notice until cancelled

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use regex::Regex;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapters::{DynamicFeed, MessageSink};

/// How often the operator is reminded that the feed is down.
pub const DEFAULT_FEED_NOTICE_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Shortest reminder period.
const MIN_NOTICE_INTERVAL: Duration = Duration::from_secs(1);

/// Notice sent to the operator when the feed becomes unavailable.
pub fn feed_unavailable_notice(every: Duration) -> String {
    format!(
        "Bilibili cookie has expired and dynamic pushes are paused. \
         Configure a new cookie and reload the config to resume \
         (this reminder repeats every {} hours).",
        every.as_secs() / 3600
    )
}

/// Matches rendered feed text against spam patterns.
#[derive(Debug, Clone, Default)]
pub struct SpamFilter {
    patterns: Vec<Regex>,
}

impl SpamFilter {
    /// Compile `patterns`. Invalid patterns are logged and skipped.
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %p, "Ignoring invalid spam pattern: {}", e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_spam(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Result of an availability poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Available,
    /// The feed just became unavailable.
    Lost,
    /// The feed was already marked unavailable.
    Unavailable,
}

/// Tracks whether a feed may still be fetched.
///
/// Once the adapter reports unavailable the flag stays false for the rest of
/// this monitor's life; only a reinitialization with a fresh feed resets it.
pub struct FeedMonitor {
    feed: Arc<dyn DynamicFeed>,
    available: Arc<AtomicBool>,
}

impl FeedMonitor {
    pub fn new(feed: Arc<dyn DynamicFeed>) -> Self {
        Self {
            feed,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn feed(&self) -> &Arc<dyn DynamicFeed> {
        &self.feed
    }

    /// Shared handle to the availability flag.
    pub fn availability(&self) -> Arc<AtomicBool> {
        self.available.clone()
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn poll(&self) -> FeedState {
        if !self.is_available() {
            return FeedState::Unavailable;
        }
        if self.feed.is_available() {
            return FeedState::Available;
        }

        // Only one caller observes the transition.
        match self
            .available
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => FeedState::Lost,
            Err(_) => FeedState::Unavailable,
        }
    }
}

/// Notify the operator now and then every `every` until `token` is cancelled.
pub async fn remind_operator(
    sink: Arc<dyn MessageSink>,
    every: Duration,
    token: CancellationToken,
) {
    let every = every.max(MIN_NOTICE_INTERVAL);
    let notice = feed_unavailable_notice(every);
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Feed reminder stopped");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = sink.notify_operator(&notice).await {
                    warn!("Failed to notify operator: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::testing::{FakeFeed, RecordingSink};

    #[test]
    fn test_spam_filter() {
        let filter = SpamFilter::new(&[
            "详情请点击互动抽奖查看".to_string(),
            "(unclosed".to_string(),
            r"^\[ad\]".to_string(),
        ]);
        assert_eq!(filter.len(), 2);
        assert!(filter.is_spam("抽奖啦 详情请点击互动抽奖查看"));
        assert!(filter.is_spam("[ad] buy now"));
        assert!(!filter.is_spam("new video"));
        assert!(!SpamFilter::default().is_spam("anything"));
    }

    #[test]
    fn test_monitor_latches_unavailable() {
        let feed = Arc::new(FakeFeed::new());
        let monitor = FeedMonitor::new(feed.clone());
        let flag = monitor.availability();

        assert_eq!(monitor.poll(), FeedState::Available);
        feed.set_available(false);
        assert_eq!(monitor.poll(), FeedState::Lost);
        assert_eq!(monitor.poll(), FeedState::Unavailable);
        assert!(!flag.load(Ordering::SeqCst));

        // A recovered adapter does not revive the same monitor.
        feed.set_available(true);
        assert_eq!(monitor.poll(), FeedState::Unavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_repeats_until_cancelled() {
        let sink = Arc::new(RecordingSink::default());
        let token = CancellationToken::new();
        let every = Duration::from_secs(6 * 3600);
        let handle = tokio::spawn(remind_operator(sink.clone(), every, token.clone()));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sink.notices().len(), 1);
        assert!(sink.notices()[0].0.contains("every 6 hours"));

        tokio::time::sleep(every - Duration::from_secs(120)).await;
        assert_eq!(sink.notices().len(), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(sink.notices().len(), 2);

        token.cancel();
        handle.await.unwrap();
        tokio::time::sleep(every * 2).await;
        assert_eq!(sink.notices().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_reminder_period_is_clamped() {
        let sink = Arc::new(RecordingSink::default());
        let token = CancellationToken::new();
        let handle = tokio::spawn(remind_operator(sink.clone(), Duration::ZERO, token.clone()));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(sink.notices().len(), 3);

        token.cancel();
        handle.await.unwrap();
    }
}
