//! Rendering of per-tick snapshots and of the final report.
//!
//! Exactly one [`Presenter`] is chosen at startup via [`select`]:
//!
//! - [`TablePresenter`]: silent while sampling, fixed-width table at the end.
//! - [`LivePresenter`]: top-like full-screen view redrawn every tick.
//! - [`JsonPresenter`]: machine-readable final report.
mod json;
mod live;
mod table;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, OutputFormat};
use crate::metrics::{ProcessRecord, ProcessStore, StatSummary};
use crate::sampling::RunReport;

pub use json::JsonPresenter;
pub use live::{LivePresenter, is_quit, live_lines};
pub use table::{TablePresenter, write_table};

/// State of the store right after a tick.
#[derive(Debug)]
pub struct Snapshot<'a> {
    /// 1-based number of the tick that produced this snapshot.
    pub tick: u64,
    /// Processes successfully sampled during this tick.
    pub tracked_now: usize,
    /// Every record of the run so far, ordered by PID.
    pub records: Vec<&'a ProcessRecord>,
}

/// What is being monitored, shown before sampling starts.
#[derive(Debug, Clone)]
pub struct RunHeader {
    /// Human readable target, e.g. `service=nginx.service`.
    pub target: String,
    pub control_group: PathBuf,
    pub interval: Duration,
    pub duration: Option<Duration>,
}

/// Final statistics of one process.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    pub pid: u32,
    pub name: String,
    pub ppid: u32,
    pub samples: u64,
    pub observed_secs: f64,
    pub cpu_percent: Option<StatSummary>,
    pub memory_mb: Option<StatSummary>,
    pub disk_bps: Option<StatSummary>,
    pub transfer_bps: Option<StatSummary>,
    pub io_unavailable_samples: u64,
}

impl From<&ProcessRecord> for ProcessSummary {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            pid: record.pid(),
            name: record.name().to_owned(),
            ppid: record.ppid(),
            samples: record.samples(),
            observed_secs: record.observed_for().as_secs_f64(),
            cpu_percent: record.cpu_percent().summary(),
            memory_mb: record.memory_mb().summary(),
            disk_bps: record.disk_bps().summary(),
            transfer_bps: record.transfer_bps().summary(),
            io_unavailable_samples: record.io_unavailable(),
        }
    }
}

/// The final report of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub control_group: PathBuf,
    pub config: Config,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub interrupted: bool,
    /// Ordered by PID ascending.
    pub processes: Vec<ProcessSummary>,
}

impl Summary {
    pub fn new(
        control_group: &Path,
        config: &Config,
        report: &RunReport,
        store: &ProcessStore,
    ) -> Self {
        Self {
            control_group: control_group.to_path_buf(),
            config: config.clone(),
            ticks: report.ticks,
            elapsed_secs: report.elapsed.as_secs_f64(),
            interrupted: report.interrupted,
            processes: store
                .snapshot()
                .into_iter()
                .map(ProcessSummary::from)
                .collect(),
        }
    }

    /// Number of processes with at least one unreadable `/proc/<pid>/io`.
    pub fn io_unavailable(&self) -> usize {
        self.processes
            .iter()
            .filter(|p| p.io_unavailable_samples > 0)
            .count()
    }
}

/// Output strategy of a run.
pub trait Presenter {
    /// Called once after the control group was resolved, before the first
    /// tick.
    fn begin(&mut self, _header: &RunHeader) -> io::Result<()> {
        Ok(())
    }

    /// Called after every tick.
    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()>;

    /// Called once after the loop stopped, including after an interruption.
    fn render_final(&mut self, summary: &Summary) -> io::Result<()>;
}

/// Picks the presenter for `config`.
///
/// The live view takes over the terminal immediately and starts a key
/// watcher that cancels `cancel` when the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be switched to raw mode.
pub fn select(config: &Config, cancel: &CancellationToken) -> io::Result<Box<dyn Presenter>> {
    if config.live {
        return Ok(Box::new(LivePresenter::new(cancel.clone())?));
    }
    Ok(match config.format {
        OutputFormat::Table => Box::new(TablePresenter::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonPresenter::new(io::stdout())),
    })
}

/// `min/max/avg` with two decimals, `-` when nothing was observed.
pub(crate) fn format_triplet(summary: Option<StatSummary>) -> String {
    match summary {
        Some(s) => format!("{:.2}/{:.2}/{:.2}", s.min, s.max, s.avg),
        None => "-".to_owned(),
    }
}

/// First `max` characters of `name`.
pub(crate) fn truncate(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Target;
    use crate::procfs::{IoCounters, RawSample};
    use std::time::Instant;

    pub(crate) fn config() -> Config {
        Config {
            target: Target::Service("demo.service".to_owned()),
            interval: Duration::from_millis(500),
            duration: None,
            live: false,
            format: OutputFormat::Table,
            cgroup_root: None,
            proc_root: PathBuf::from("/proc"),
        }
    }

    /// Two processes: pid 10 sampled twice with I/O, pid 20 once without.
    pub(crate) fn store() -> ProcessStore {
        let engine = crate::metrics::MetricEngine::new(100);
        let mut store = ProcessStore::default();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);

        for (at, ticks, io) in [(t0, 0, 0), (t1, 50, 2048)] {
            let record = store.upsert(10, "nginx: master process", 1, at);
            engine.observe(
                record,
                RawSample {
                    timestamp: at,
                    cpu_ticks: ticks,
                    rss_bytes: 8 * 1024 * 1024,
                    io: Some(IoCounters {
                        rchar: io,
                        read_bytes: io / 2,
                        ..IoCounters::default()
                    }),
                },
            );
        }

        let record = store.upsert(20, "worker", 10, t1);
        engine.observe(
            record,
            RawSample {
                timestamp: t1,
                cpu_ticks: 5,
                rss_bytes: 4 * 1024 * 1024,
                io: None,
            },
        );
        store
    }

    pub(crate) fn summary() -> Summary {
        let report = RunReport {
            ticks: 2,
            elapsed: Duration::from_secs(1),
            interrupted: true,
        };
        Summary::new(
            Path::new("/sys/fs/cgroup/system.slice/demo.service"),
            &config(),
            &report,
            &store(),
        )
    }

    #[test]
    fn test_summary_from_store() {
        let summary = summary();
        assert_eq!(summary.processes.len(), 2);
        assert_eq!(summary.processes[0].pid, 10);
        assert_eq!(summary.processes[0].samples, 2);
        assert_eq!(summary.processes[0].observed_secs, 1.0);
        assert!(summary.processes[0].cpu_percent.is_some());
        assert!(summary.processes[1].cpu_percent.is_none());
        assert_eq!(summary.io_unavailable(), 1);
        assert!(summary.interrupted);
    }

    #[test]
    fn test_format_triplet() {
        let s = StatSummary {
            min: 1.0,
            max: 3.456,
            avg: 2.0,
        };
        assert_eq!(format_triplet(Some(s)), "1.00/3.46/2.00");
        assert_eq!(format_triplet(None), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("abcdefghijklmnopqrstuvwxyz", 20), "abcdefghijklmnopqrst");
        assert_eq!(truncate("äöüäöü", 3), "äöü");
    }
}
