//! Timer-driven check cycles.
//!
//! A cycle owns the checker and runner of one scheduler generation. Its loop
//! only looks at the cancellation token between ticks, so a cycle that is
//! already checking or draining always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::checks::PushChecker;
use super::feed::{FeedMonitor, FeedState, SpamFilter, remind_operator};
use super::runner::{DrainReport, TaskRunner};
use super::task::PushTask;
use crate::config::CollectionKind;

/// Polling cycle: dynamics and live (unless feed mode owns them), seasons and series.
pub(crate) struct PollCycle {
    checker: Arc<PushChecker>,
    runner: Arc<TaskRunner>,
    include_dynamic_live: bool,
}

impl PollCycle {
    pub(crate) fn new(
        checker: Arc<PushChecker>,
        runner: Arc<TaskRunner>,
        include_dynamic_live: bool,
    ) -> Self {
        Self {
            checker,
            runner,
            include_dynamic_live,
        }
    }

    pub(crate) async fn run_once(&self) -> DrainReport {
        let checker = &self.checker;
        let (dynamic, live, season, series) = tokio::join!(
            async {
                if self.include_dynamic_live {
                    checker.check_dynamics().await
                } else {
                    Vec::new()
                }
            },
            async {
                if self.include_dynamic_live {
                    checker.check_live().await
                } else {
                    Vec::new()
                }
            },
            checker.check_collections(CollectionKind::Season),
            checker.check_collections(CollectionKind::Series),
        );

        let tasks: Vec<PushTask> = dynamic
            .into_iter()
            .chain(live)
            .chain(season)
            .chain(series)
            .collect();
        self.runner.drain(tasks).await
    }

    pub(crate) async fn run(self, period: Duration, token: CancellationToken) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = self.run_once().await;
            if report.total() > 0 {
                debug!(
                    "Poll cycle delivered {} messages ({} failed)",
                    report.delivered, report.failed
                );
            }
        }
        debug!("Poll cycle stopped");
    }
}

/// Feed cycle: new feed items plus the live check.
pub(crate) struct FeedCycle {
    checker: Arc<PushChecker>,
    runner: Arc<TaskRunner>,
    monitor: FeedMonitor,
    spam: SpamFilter,
    notice_interval: Duration,
}

impl FeedCycle {
    pub(crate) fn new(
        checker: Arc<PushChecker>,
        runner: Arc<TaskRunner>,
        monitor: FeedMonitor,
        spam: SpamFilter,
        notice_interval: Duration,
    ) -> Self {
        Self {
            checker,
            runner,
            monitor,
            spam,
            notice_interval,
        }
    }

    async fn check_feed(&self, token: &CancellationToken) -> Vec<PushTask> {
        match self.monitor.poll() {
            FeedState::Available => match self.monitor.feed().check_and_get_new_items().await {
                Ok(items) if items.is_empty() => Vec::new(),
                Ok(items) => {
                    debug!("Feed returned {} new items", items.len());
                    self.checker.handle_feed_items(items, &self.spam).await
                }
                Err(e) => {
                    warn!("Failed to check dynamic feed: {}", e);
                    Vec::new()
                }
            },
            FeedState::Lost => {
                warn!("Dynamic feed is unavailable, pausing feed pushes until reload");
                tokio::spawn(remind_operator(
                    self.runner.sink().clone(),
                    self.notice_interval,
                    token.child_token(),
                ));
                Vec::new()
            }
            FeedState::Unavailable => Vec::new(),
        }
    }

    pub(crate) async fn run_once(&self, token: &CancellationToken) -> DrainReport {
        let (feed, live) = tokio::join!(self.check_feed(token), self.checker.check_live());
        let tasks: Vec<PushTask> = feed.into_iter().chain(live).collect();
        self.runner.drain(tasks).await
    }

    pub(crate) async fn run(self, period: Duration, token: CancellationToken) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = self.run_once(&token).await;
            if report.total() > 0 {
                debug!(
                    "Feed cycle delivered {} messages ({} failed)",
                    report.delivered, report.failed
                );
            }

            // Nothing left to do on this timer.
            if !self.monitor.is_available() && self.checker.config().live.is_empty() {
                break;
            }
        }
        debug!("Feed cycle stopped");
    }
}
