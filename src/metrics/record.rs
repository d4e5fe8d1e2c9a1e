use std::time::{Duration, Instant};

use crate::procfs::RawSample;

use super::RunningStat;

/// Values computed during the most recent tick that sampled the process.
///
/// A rate is `None` when it could not be computed that tick (first sample,
/// missing I/O counters, counter regression).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurrentValues {
    pub cpu_percent: Option<f64>,
    pub memory_mb: Option<f64>,
    pub disk_bps: Option<f64>,
    pub transfer_bps: Option<f64>,
}

/// Accumulated statistics and lifecycle metadata of one PID.
///
/// The identity (name, parent) is the one observed first; a PID reused by
/// another process during the run continues the same record.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub(super) pid: u32,
    pub(super) ppid: u32,
    pub(super) name: String,
    pub(super) first_seen: Instant,
    pub(super) last_seen: Instant,
    pub(super) last_sample: Option<RawSample>,
    pub(super) cpu_percent: RunningStat,
    pub(super) memory_mb: RunningStat,
    pub(super) disk_bps: RunningStat,
    pub(super) transfer_bps: RunningStat,
    pub(super) current: CurrentValues,
    pub(super) samples: u64,
    pub(super) io_unavailable: u64,
}

impl ProcessRecord {
    pub(super) fn new(pid: u32, ppid: u32, name: String, seen_at: Instant) -> Self {
        Self {
            pid,
            ppid,
            name,
            first_seen: seen_at,
            last_seen: seen_at,
            last_sample: None,
            cpu_percent: RunningStat::default(),
            memory_mb: RunningStat::default(),
            disk_bps: RunningStat::default(),
            transfer_bps: RunningStat::default(),
            current: CurrentValues::default(),
            samples: 0,
            io_unavailable: 0,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn ppid(&self) -> u32 {
        self.ppid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first_seen(&self) -> Instant {
        self.first_seen
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Time between the first and the most recent sighting.
    pub fn observed_for(&self) -> Duration {
        self.last_seen.saturating_duration_since(self.first_seen)
    }

    /// The sample the next delta will be computed against.
    pub fn last_sample(&self) -> Option<&RawSample> {
        self.last_sample.as_ref()
    }

    /// CPU usage in percent of one core.
    pub fn cpu_percent(&self) -> &RunningStat {
        &self.cpu_percent
    }

    /// Resident memory in MiB.
    pub fn memory_mb(&self) -> &RunningStat {
        &self.memory_mb
    }

    /// Storage throughput (`read_bytes` + `write_bytes`) in bytes per second.
    pub fn disk_bps(&self) -> &RunningStat {
        &self.disk_bps
    }

    /// Transfer throughput (`rchar` + `wchar`) in bytes per second.
    pub fn transfer_bps(&self) -> &RunningStat {
        &self.transfer_bps
    }

    pub fn current(&self) -> &CurrentValues {
        &self.current
    }

    /// Number of ticks that successfully sampled this process.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Number of those ticks whose `/proc/<pid>/io` was unreadable.
    pub fn io_unavailable(&self) -> u64 {
        self.io_unavailable
    }
}
