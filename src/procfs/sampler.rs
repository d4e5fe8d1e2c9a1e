use std::path::PathBuf;
use std::time::Instant;

use crate::error::ResultOkLogExt;
use crate::fsutil;

use super::io::IoCounters;
use super::parser::{KeyValueStat, SingleLineStat};
use super::stat::ProcStat;
use super::{SampleError, StatParseError};

/// Instantaneous counters of one process at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Monotonic capture time.
    pub timestamp: Instant,
    /// Cumulative user + kernel CPU time in clock ticks.
    pub cpu_ticks: u64,
    /// Resident memory in bytes.
    pub rss_bytes: u64,
    /// I/O counters, absent when `/proc/<pid>/io` was unreadable.
    pub io: Option<IoCounters>,
}

/// A [`RawSample`] together with the identity of the sampled process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub name: String,
    pub ppid: u32,
    pub raw: RawSample,
}

/// Reads the counters of a single process.
pub trait RawSampler {
    /// Samples `pid`, or returns `None` if the process is gone (or its
    /// CPU/memory record is unreadable, which is treated the same way).
    fn sample(&self, pid: u32) -> Option<ProcessSample>;
}

/// [`RawSampler`] backed by a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcfsSampler {
    proc_root: PathBuf,
    page_size: u64,
}

impl ProcfsSampler {
    /// Constructs a sampler reading below `proc_root` (normally `/proc`).
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self::with_page_size(proc_root, super::page_size())
    }

    pub fn with_page_size(proc_root: impl Into<PathBuf>, page_size: u64) -> Self {
        Self {
            proc_root: proc_root.into(),
            page_size,
        }
    }

    fn read_stat(&self, pid: u32) -> Result<ProcStat, SampleError> {
        self.read_file(pid, "stat", |reader| ProcStat::from_reader(reader))
    }

    fn read_io(&self, pid: u32) -> Result<IoCounters, SampleError> {
        self.read_file(pid, "io", |reader| IoCounters::from_reader(reader))
    }

    fn read_file<T>(
        &self,
        pid: u32,
        file: &str,
        parse: impl FnOnce(&mut std::io::BufReader<std::fs::File>) -> Result<T, StatParseError>,
    ) -> Result<T, SampleError> {
        let path = self.proc_root.join(pid.to_string()).join(file);
        let mut reader = fsutil::open_file_reader(&path)?;
        parse(&mut reader).map_err(|source| SampleError::Parse { path, source })
    }
}

impl RawSampler for ProcfsSampler {
    fn sample(&self, pid: u32) -> Option<ProcessSample> {
        let stat = self.read_stat(pid).ok_log(log::Level::Trace)?;
        let io = self.read_io(pid).ok_log(log::Level::Trace);
        let timestamp = Instant::now();

        Some(ProcessSample {
            raw: RawSample {
                timestamp,
                cpu_ticks: stat.cpu_ticks(),
                rss_bytes: stat.rss_pages.saturating_mul(self.page_size),
                io,
            },
            name: stat.name,
            ppid: stat.ppid,
        })
    }
}
