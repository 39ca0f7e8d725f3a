//! Push scheduler.
//!
//! Owns the two timers (poll and feed) and rebuilds them from the current
//! config on every reinitialization. Each reinitialization starts a new
//! generation: the previous generation's token is cancelled so its cycles stop
//! after their current tick, and fresh cycles are spawned.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::checks::PushChecker;
use super::cycle::{FeedCycle, PollCycle};
use super::feed::{DEFAULT_FEED_NOTICE_INTERVAL, FeedMonitor, SpamFilter};
use super::live_state::LiveStatusStore;
use super::runner::{DEFAULT_TASK_DELAY, TaskRunner};
use super::types::LiveStatus;
use crate::adapters::PushAdapters;
use crate::config::{BilibiliConfig, BotConfig, ConfigStore, PushConfig};

/// Lower bound for the poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Lower bound for the feed interval.
pub const MIN_FEED_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest period any timer is armed with, whatever the config says.
pub const MIN_TIMER_PERIOD: Duration = Duration::from_secs(1);

/// Scheduler tuning.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Pause between consecutive deliveries.
    pub task_delay: Duration,
    /// Operator reminder period while the feed is unavailable.
    pub feed_notice_interval: Duration,
    pub min_poll_interval: Duration,
    pub min_feed_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            task_delay: DEFAULT_TASK_DELAY,
            feed_notice_interval: DEFAULT_FEED_NOTICE_INTERVAL,
            min_poll_interval: MIN_POLL_INTERVAL,
            min_feed_interval: MIN_FEED_INTERVAL,
        }
    }
}

/// Which timers a generation arms, and at what period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerPlan {
    pub poll: Option<Duration>,
    pub feed: Option<Duration>,
}

impl TimerPlan {
    pub fn compute(
        push: &PushConfig,
        settings: &BilibiliConfig,
        feed_enabled: bool,
        config: &SchedulerConfig,
    ) -> Self {
        let period = |secs: u64, min: Duration| {
            Duration::from_secs(secs).max(min).max(MIN_TIMER_PERIOD)
        };
        let poll = ((!feed_enabled && push.has_dynamic_or_live()) || push.has_collections())
            .then(|| period(settings.push_check_interval, config.min_poll_interval));
        let feed = (feed_enabled && push.has_dynamic_or_live())
            .then(|| period(settings.feed_check_interval, config.min_feed_interval));
        Self { poll, feed }
    }

    pub fn is_idle(&self) -> bool {
        self.poll.is_none() && self.feed.is_none()
    }
}

struct Generation {
    token: CancellationToken,
    push_config: Arc<PushConfig>,
    feed_available: Option<Arc<AtomicBool>>,
    plan: TimerPlan,
}

/// Periodically checks subscriptions and delivers notifications.
///
/// [`reinitialize`](Self::reinitialize) spawns tasks and must be called from
/// within a tokio runtime.
pub struct PushScheduler {
    adapters: PushAdapters,
    config: SchedulerConfig,
    live_store: Arc<Mutex<LiveStatusStore>>,
    current: Option<Generation>,
    generation: u64,
}

impl PushScheduler {
    pub fn new(adapters: PushAdapters) -> Self {
        Self::with_config(adapters, SchedulerConfig::default())
    }

    pub fn with_config(adapters: PushAdapters, config: SchedulerConfig) -> Self {
        Self {
            adapters,
            config,
            live_store: Arc::new(Mutex::new(LiveStatusStore::new())),
            current: None,
            generation: 0,
        }
    }

    /// Tear down the running timers and arm new ones for `bot`.
    pub fn reinitialize(&mut self, bot: &BotConfig) -> TimerPlan {
        self.stop();

        let settings = &bot.bilibili;
        let push_config = Arc::new(PushConfig::from_raw(&settings.push));

        let evicted = self.live_store.lock().evict_except(&push_config.live);
        if evicted > 0 {
            debug!("Dropped {} stale live statuses", evicted);
        }

        let feed_enabled = settings.feed.enabled && self.adapters.feed.is_some();
        if settings.feed.enabled && !feed_enabled {
            warn!("Feed mode is enabled but no feed adapter is installed, falling back to polling");
        }

        let plan = TimerPlan::compute(&push_config, settings, feed_enabled, &self.config);
        let token = CancellationToken::new();
        let checker = Arc::new(PushChecker::new(
            push_config.clone(),
            &self.adapters,
            self.live_store.clone(),
        ));
        let runner = Arc::new(TaskRunner::new(
            self.adapters.sink.clone(),
            self.config.task_delay,
        ));

        if let Some(period) = plan.poll {
            let cycle = PollCycle::new(checker.clone(), runner.clone(), !feed_enabled);
            tokio::spawn(cycle.run(period, token.child_token()));
        }

        let mut feed_available = None;
        // Only a feed timer needs a feed session.
        if let (Some(period), Some(factory)) = (plan.feed, &self.adapters.feed) {
            let monitor = FeedMonitor::new(factory.create());
            feed_available = Some(monitor.availability());
            let cycle = FeedCycle::new(
                checker,
                runner,
                monitor,
                SpamFilter::new(&settings.feed.spam_patterns),
                self.config.feed_notice_interval,
            );
            tokio::spawn(cycle.run(period, token.child_token()));
        }

        self.generation += 1;
        info!(
            generation = self.generation,
            dynamic = push_config.dynamic.len(),
            live = push_config.live.len(),
            season = push_config.season.len(),
            series = push_config.series.len(),
            poll = ?plan.poll,
            feed = ?plan.feed,
            "Push scheduler initialized"
        );

        self.current = Some(Generation {
            token,
            push_config,
            feed_available,
            plan,
        });
        plan
    }

    /// Stop arming new cycles. In-flight cycles finish on their own.
    pub fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.token.cancel();
            debug!(generation = self.generation, "Push timers disarmed");
        }
    }

    /// Number of reinitializations so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn timer_plan(&self) -> TimerPlan {
        self.current.as_ref().map(|g| g.plan).unwrap_or_default()
    }

    pub fn push_config(&self) -> Option<Arc<PushConfig>> {
        self.current.as_ref().map(|g| g.push_config.clone())
    }

    /// Feed availability of the current generation, `None` when no feed timer runs.
    pub fn feed_available(&self) -> Option<bool> {
        self.current
            .as_ref()
            .and_then(|g| g.feed_available.as_ref())
            .map(|flag| flag.load(Ordering::SeqCst))
    }

    pub fn live_status(&self, uid: &str) -> Option<LiveStatus> {
        self.live_store.lock().get(uid)
    }

    /// Run until `cancel` fires, reinitializing on start and on every config reload.
    pub async fn run(mut self, store: Arc<ConfigStore>, cancel: CancellationToken) {
        let mut events = store.subscribe();
        self.reinitialize(&store.current());

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Push scheduler received cancellation signal");
                    break;
                }
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            info!("{}, reinitializing push", event.description());
                            self.reinitialize(&store.current());
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("Push scheduler lagged {} config events", n);
                            self.reinitialize(&store.current());
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("Config event channel closed");
                            break;
                        }
                    }
                }
            }
        }

        self.stop();
    }
}

impl Drop for PushScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
