//! Background Tasks Module
//!
//! Contains background tasks that run alongside the cache.
//!
//! # Tasks
//! - TTL Sweeper: Removes expired, unclaimed entries at configured intervals

mod sweeper;

pub use sweeper::spawn_sweeper_task;
