//! Sequential task runner.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use super::task::PushTask;
use crate::adapters::MessageSink;

/// Pause between two consecutive deliveries.
pub const DEFAULT_TASK_DELAY: Duration = Duration::from_secs(1);

/// Outcome of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Delivers tasks one at a time with a fixed pause in between.
///
/// Each task is awaited to completion before the next one starts, so
/// deliveries from one cycle never overlap.
pub struct TaskRunner {
    sink: Arc<dyn MessageSink>,
    delay: Duration,
}

impl TaskRunner {
    pub fn new(sink: Arc<dyn MessageSink>, delay: Duration) -> Self {
        Self { sink, delay }
    }

    pub fn sink(&self) -> &Arc<dyn MessageSink> {
        &self.sink
    }

    pub async fn drain(&self, tasks: Vec<PushTask>) -> DrainReport {
        let mut report = DrainReport::default();
        if tasks.is_empty() {
            return report;
        }

        debug!("Draining {} push tasks", tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            if task.execute(self.sink.as_ref()).await {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}
