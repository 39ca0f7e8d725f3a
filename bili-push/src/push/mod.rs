//! Push pipeline.
//!
//! - `checks`: per-content-type checks that turn new content into tasks
//! - `runner`: sequential delivery with a fixed pause between messages
//! - `feed`: feed availability latch, operator reminders and spam filtering
//! - `scheduler`: poll and feed timers, rebuilt on every config reload

pub mod checks;
mod cycle;
pub mod feed;
pub mod live_state;
pub mod message;
pub mod runner;
pub mod scheduler;
pub mod task;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use checks::PushChecker;
pub use feed::{FeedMonitor, FeedState, SpamFilter};
pub use live_state::LiveStatusStore;
pub use runner::{DrainReport, TaskRunner};
pub use scheduler::{PushScheduler, SchedulerConfig, TimerPlan};
pub use task::{PushKind, PushTask};
pub use types::{DynamicPost, LiveRoom, LiveStatus, PostKind, RenderedDynamic};
