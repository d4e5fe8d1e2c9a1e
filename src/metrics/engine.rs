use crate::procfs::RawSample;

use super::{CurrentValues, ProcessRecord};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Rates derived from two consecutive samples.
#[derive(Debug, Clone, Copy, Default)]
struct Rates {
    cpu_percent: Option<f64>,
    disk_bps: Option<f64>,
    transfer_bps: Option<f64>,
}

/// Converts consecutive raw samples of a process into statistics.
#[derive(Debug, Clone, Copy)]
pub struct MetricEngine {
    ticks_per_second: f64,
}

impl MetricEngine {
    /// Constructs an engine for CPU counters expressed in `ticks_per_second`
    /// (`_SC_CLK_TCK`).
    pub fn new(ticks_per_second: u64) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(1) as f64,
        }
    }

    /// Folds `sample` into `record`.
    ///
    /// Memory is observed on every call. Rates need a previous sample of the
    /// same record and a positive elapsed time; each rate is skipped on its
    /// own when its counters went backwards or (for I/O) either sample lacks
    /// I/O counters. The sample always becomes the new reference for the
    /// next call.
    pub fn observe(&self, record: &mut ProcessRecord, sample: RawSample) {
        let memory_mb = sample.rss_bytes as f64 / BYTES_PER_MB;
        let rates = record
            .last_sample
            .as_ref()
            .and_then(|prior| self.rates(prior, &sample))
            .unwrap_or_default();

        record.samples += 1;
        if sample.io.is_none() {
            record.io_unavailable += 1;
        }
        record.last_sample = Some(sample);

        record.memory_mb.observe(memory_mb);
        if let Some(cpu) = rates.cpu_percent {
            record.cpu_percent.observe(cpu);
        }
        if let Some(disk) = rates.disk_bps {
            record.disk_bps.observe(disk);
        }
        if let Some(transfer) = rates.transfer_bps {
            record.transfer_bps.observe(transfer);
        }
        record.current = CurrentValues {
            cpu_percent: rates.cpu_percent,
            memory_mb: Some(memory_mb),
            disk_bps: rates.disk_bps,
            transfer_bps: rates.transfer_bps,
        };
    }

    fn rates(&self, prior: &RawSample, current: &RawSample) -> Option<Rates> {
        let elapsed = current
            .timestamp
            .saturating_duration_since(prior.timestamp)
            .as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }

        let cpu_percent = counter_rate(prior.cpu_ticks, current.cpu_ticks, elapsed)
            .map(|ticks| ticks / self.ticks_per_second * 100.0);

        let (disk_bps, transfer_bps) = match (prior.io, current.io) {
            (Some(prior), Some(current)) => (
                counter_rate(prior.disk_total(), current.disk_total(), elapsed),
                counter_rate(prior.transfer_total(), current.transfer_total(), elapsed),
            ),
            _ => (None, None),
        };

        Some(Rates {
            cpu_percent,
            disk_bps,
            transfer_bps,
        })
    }
}

/// Per-second rate of a monotonically increasing counter, or `None` if it
/// went backwards (e.g. the PID now belongs to another process).
#[inline]
fn counter_rate(prior: u64, current: u64, elapsed_secs: f64) -> Option<f64> {
    current
        .checked_sub(prior)
        .map(|delta| delta as f64 / elapsed_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ProcessStore;
    use crate::procfs::IoCounters;
    use std::time::{Duration, Instant};

    const TICKS: u64 = 100;
    const MB: u64 = 1024 * 1024;

    fn sample(at: Instant, cpu_ticks: u64, rss_mb: u64, io: Option<(u64, u64)>) -> RawSample {
        RawSample {
            timestamp: at,
            cpu_ticks,
            rss_bytes: rss_mb * MB,
            io: io.map(|(disk, transfer)| IoCounters {
                read_bytes: disk,
                write_bytes: 0,
                rchar: transfer,
                wchar: 0,
            }),
        }
    }

    fn feed(samples: Vec<RawSample>) -> ProcessRecord {
        let engine = MetricEngine::new(TICKS);
        let mut store = ProcessStore::default();
        let start = samples[0].timestamp;
        let record = store.upsert(100, "svc", 1, start);
        for s in samples {
            engine.observe(record, s);
        }
        record.clone()
    }

    #[test]
    fn test_first_sample_only_observes_memory() {
        let t0 = Instant::now();
        let record = feed(vec![sample(t0, 500, 50, Some((10, 20)))]);

        assert_eq!(record.memory_mb().count(), 1);
        assert_eq!(record.cpu_percent().count(), 0);
        assert_eq!(record.disk_bps().count(), 0);
        assert_eq!(record.transfer_bps().count(), 0);
        assert!(record.last_sample().is_some());
        assert_eq!(record.current().cpu_percent, None);
        assert_eq!(record.current().memory_mb, Some(50.0));
    }

    #[test]
    fn test_one_core_second_per_second_is_100_percent() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let record = feed(vec![
            sample(t0, 1000, 10, None),
            sample(t1, 1000 + TICKS, 10, None),
        ]);

        let cpu = record.cpu_percent().summary().unwrap();
        assert!((cpu.avg - 100.0).abs() < 1e-9);
        assert_eq!(record.cpu_percent().count(), 1);
    }

    #[test]
    fn test_cpu_may_exceed_one_core() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(500);
        let record = feed(vec![sample(t0, 0, 10, None), sample(t1, 150, 10, None)]);

        let cpu = record.cpu_percent().summary().unwrap();
        assert!((cpu.max - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_io_rates() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(2);
        let record = feed(vec![
            sample(t0, 0, 10, Some((1000, 5000))),
            sample(t1, 0, 10, Some((3000, 9000))),
        ]);

        assert_eq!(record.disk_bps().summary().unwrap().avg, 1000.0);
        assert_eq!(record.transfer_bps().summary().unwrap().avg, 2000.0);
    }

    #[test]
    fn test_negative_io_delta_is_not_observed() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let record = feed(vec![
            sample(t0, 10, 10, Some((5000, 5000))),
            sample(t1, 20, 10, Some((100, 100))),
        ]);

        assert_eq!(record.disk_bps().count(), 0);
        assert_eq!(record.transfer_bps().count(), 0);
        assert_eq!(record.cpu_percent().count(), 1);
    }

    #[test]
    fn test_negative_cpu_delta_is_not_observed() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let record = feed(vec![sample(t0, 900, 10, None), sample(t1, 5, 10, None)]);

        assert_eq!(record.cpu_percent().count(), 0);
        assert_eq!(record.last_sample().unwrap().cpu_ticks, 5);
    }

    #[test]
    fn test_missing_io_on_either_side_skips_io_rates() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let t2 = t1 + Duration::from_secs(1);
        let record = feed(vec![
            sample(t0, 0, 10, Some((0, 0))),
            sample(t1, 100, 10, None),
            sample(t2, 200, 10, Some((100, 100))),
        ]);

        assert_eq!(record.cpu_percent().count(), 2);
        assert_eq!(record.disk_bps().count(), 0);
        assert_eq!(record.transfer_bps().count(), 0);
        assert_eq!(record.io_unavailable(), 1);
        assert_eq!(record.samples(), 3);
    }

    #[test]
    fn test_zero_elapsed_skips_rates_but_replaces_last_sample() {
        let t0 = Instant::now();
        let record = feed(vec![sample(t0, 0, 10, None), sample(t0, 100, 20, None)]);

        assert_eq!(record.cpu_percent().count(), 0);
        assert_eq!(record.memory_mb().count(), 2);
        assert_eq!(record.last_sample().unwrap().cpu_ticks, 100);
    }

    #[test]
    fn test_memory_statistics() {
        let t0 = Instant::now();
        let record = feed(vec![
            sample(t0, 0, 10, None),
            sample(t0 + Duration::from_secs(1), 0, 30, None),
            sample(t0 + Duration::from_secs(2), 0, 20, None),
        ]);

        let memory = record.memory_mb().summary().unwrap();
        assert_eq!(memory.min, 10.0);
        assert_eq!(memory.max, 30.0);
        assert_eq!(memory.avg, 20.0);
    }
}
