//! The tick-driven loop tying discovery, sampling and aggregation together.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::cgroup::ProcessSetDiscoverer;
use crate::metrics::{MetricEngine, ProcessStore};
use crate::presenter::{Presenter, Snapshot};
use crate::procfs::RawSampler;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Number of fully processed ticks.
    pub ticks: u64,
    /// Wall-clock time from the first tick until the loop stopped.
    pub elapsed: Duration,
    /// `true` if the run was cancelled rather than reaching its duration.
    pub interrupted: bool,
}

/// Drives discovery, sampling and aggregation at a fixed cadence.
///
/// Cancellation is only observed between ticks, so the store is never left
/// with a partially processed tick.
#[derive(Debug)]
pub struct SamplingLoop<D, S> {
    discoverer: D,
    sampler: S,
    engine: MetricEngine,
    interval: Duration,
    duration: Option<Duration>,
    cancel: CancellationToken,
}

impl<D, S> SamplingLoop<D, S>
where
    D: ProcessSetDiscoverer,
    S: RawSampler,
{
    pub fn new(
        discoverer: D,
        sampler: S,
        engine: MetricEngine,
        interval: Duration,
        duration: Option<Duration>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            discoverer,
            sampler,
            engine,
            interval,
            duration,
            cancel,
        }
    }

    /// Runs until the configured duration elapses or the token is cancelled.
    ///
    /// After every tick the presenter receives a snapshot of the store.
    ///
    /// # Errors
    ///
    /// Only presenter failures (e.g. the terminal went away) are returned;
    /// per-process problems are absorbed by [`SamplingLoop::tick`].
    pub async fn run(
        &self,
        store: &mut ProcessStore,
        presenter: &mut dyn Presenter,
    ) -> std::io::Result<RunReport> {
        let started = Instant::now();
        // A deadline beyond what `Instant` can represent never arrives.
        let deadline = self
            .duration
            .and_then(|duration| started.checked_add(duration));
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks = 0;
        let interrupted = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break true,
                _ = sleep_until(deadline) => break false,
                _ = interval.tick() => {}
            }

            let before = std::time::Instant::now();
            let tracked_now = self.tick(store);
            ticks += 1;
            log::trace!(
                "tick {ticks}: sampled {tracked_now} processes in {} µs",
                before.elapsed().as_micros()
            );

            presenter.render(&Snapshot {
                tick: ticks,
                tracked_now,
                records: store.snapshot(),
            })?;
        };

        let report = RunReport {
            ticks,
            elapsed: started.elapsed(),
            interrupted,
        };
        log::debug!("Sampling stopped: {report:?}");
        Ok(report)
    }

    /// Processes one tick: discovers the current PIDs, samples each of them
    /// and folds the samples into `store`.
    ///
    /// Returns the number of processes sampled successfully.
    pub fn tick(&self, store: &mut ProcessStore) -> usize {
        let pids = self.discoverer.discover();
        if pids.is_empty() {
            log::trace!("no processes in control group");
        }

        let mut sampled = 0;
        for pid in pids {
            let Some(sample) = self.sampler.sample(pid) else {
                log::trace!("pid {pid} vanished before it could be sampled");
                continue;
            };
            let record = store.upsert(pid, &sample.name, sample.ppid, sample.raw.timestamp);
            self.engine.observe(record, sample.raw);
            sampled += 1;
        }
        sampled
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
