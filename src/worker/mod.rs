//! Search units and the pool that runs them.
//!
//! This module provides:
//! - The unit <-> coordinator message protocol
//! - Search units (batch generation and pattern search)
//! - A thread pool that merges unit messages over one channel

mod message;
mod pool;
mod unit;

pub use message::{BatchResult, ErrorReport, Progress, SearchMode, SearchRequest, UnitMessage};
pub use pool::WorkerPool;
pub use unit::{sub_batches, SearchUnit};
