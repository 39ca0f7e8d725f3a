//! Bilibili push scheduler.
//!
//! Watches Bilibili creators for new dynamics, live broadcasts and
//! season/series episodes and pushes notifications to group chats.

pub mod adapters;
pub mod config;
pub mod error;
pub mod logging;
pub mod push;

pub use error::{Error, Result};
