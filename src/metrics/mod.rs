//! Aggregation of raw per-process samples into running statistics.
//!
//! - [`RunningStat`]: constant-size min/max/average accumulator.
//! - [`ProcessRecord`]: everything known about one PID during the run.
//! - [`ProcessStore`]: the PID → record map; records are never removed.
//! - [`MetricEngine`]: turns consecutive raw samples into rates.
mod engine;
mod record;
mod running_stat;
mod store;

pub use engine::MetricEngine;
pub use record::{CurrentValues, ProcessRecord};
pub use running_stat::{RunningStat, StatSummary};
pub use store::ProcessStore;
