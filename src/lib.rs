//! Unit Monitor: per-process resource statistics for a systemd service.
//!
//! This library resolves the control group of a service, samples CPU, memory
//! and I/O counters of every process inside it at a fixed interval and reports
//! min/max/average statistics per process once sampling stops.
use std::path::PathBuf;

use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use cgroup::{
    CgroupDiscoverer, CgroupPathResolver, ControlGroupSource, LiteralControlGroup,
    SystemdControlGroup,
};
use config::{Config, Target};
use metrics::{MetricEngine, ProcessStore};
use presenter::{RunHeader, Summary};
use procfs::ProcfsSampler;
use sampling::SamplingLoop;

pub use error::Error;

pub mod cgroup;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod metrics;
pub mod mountinfo;
pub mod presenter;
pub mod procfs;
pub mod sampling;

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Number of distinct processes with statistics.
    pub records: usize,
    pub ticks: u64,
}

impl Outcome {
    /// `0` if at least one process was observed, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.records > 0 { 0 } else { 1 }
    }
}

/// Runs one monitoring session as described by `config`.
///
/// Resolves the control group, samples until the configured duration elapses
/// or SIGINT/SIGTERM (or `q` in the live view) arrives and hands the final
/// summary to the selected presenter.
///
/// # Returns
///
/// The number of observed processes and ticks. An empty result is not an
/// error; use [`Outcome::exit_code`] to map it to a process exit code.
///
/// # Errors
///
/// - [`Error::Resolution`] if the control group cannot be determined or does
///   not exist.
/// - [`Error::Signal`] if the signal handlers cannot be installed.
/// - [`Error::Output`] if the terminal or stdout fails.
pub async fn run(config: Config) -> Result<Outcome, Error> {
    let source: Box<dyn ControlGroupSource> = match &config.target {
        Target::Service(service) => Box::new(SystemdControlGroup::new(service.clone())),
        Target::ControlGroup(identifier) => Box::new(LiteralControlGroup(identifier.clone())),
    };
    let identifier = source.control_group()?;
    log::debug!("Control group of {}: {identifier}", config.target);

    let resolver = CgroupPathResolver::new(cgroup_root(&config));
    let control_group = resolver.resolve(&identifier)?;
    log::debug!("Final control group path: {}", control_group.display());

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone()).map_err(Error::Signal)?;

    let mut presenter = presenter::select(&config, &cancel)?;
    presenter.begin(&RunHeader {
        target: config.target.to_string(),
        control_group: control_group.clone(),
        interval: config.interval,
        duration: config.duration,
    })?;

    let sampling = SamplingLoop::new(
        CgroupDiscoverer::new(control_group.clone()),
        ProcfsSampler::new(config.proc_root.clone()),
        MetricEngine::new(procfs::ticks_per_second()),
        config.interval,
        config.duration,
        cancel.clone(),
    );
    let mut store = ProcessStore::default();
    log::debug!(
        "Sampling every {:?} for {:?}",
        config.interval,
        config.duration
    );
    let report = sampling.run(&mut store, presenter.as_mut()).await?;
    cancel.cancel();

    let summary = Summary::new(&control_group, &config, &report, &store);
    presenter.render_final(&summary)?;

    Ok(Outcome {
        records: summary.processes.len(),
        ticks: report.ticks,
    })
}

/// `--cgroup-root`, else the `cgroup2` mount from mountinfo, else the
/// conventional mount point.
fn cgroup_root(config: &Config) -> PathBuf {
    if let Some(root) = &config.cgroup_root {
        return root.clone();
    }

    let mountinfo = config.proc_root.join("self/mountinfo");
    match mountinfo::detect_cgroup2_mount_point(&mountinfo) {
        Ok(root) => root,
        Err(err) => {
            log::warn!(
                "Failed to detect cgroup2 mount point ({err}), falling back to {}",
                mountinfo::DEFAULT_CGROUP2_ROOT
            );
            PathBuf::from(mountinfo::DEFAULT_CGROUP2_ROOT)
        }
    }
}

/// Cancels `cancel` on the first SIGINT or SIGTERM.
///
/// The task ends on its own once `cancel` is cancelled for another reason.
fn spawn_signal_handler(cancel: CancellationToken) -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => log::debug!("Received SIGINT, stopping"),
            _ = sigterm.recv() => log::debug!("Received SIGTERM, stopping"),
            _ = cancel.cancelled() => return,
        }
        cancel.cancel();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgroup::ResolutionError;
    use crate::config::OutputFormat;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(root: &TempDir, cgroup: &str) -> Config {
        Config {
            target: Target::ControlGroup(cgroup.to_owned()),
            interval: Duration::from_millis(10),
            duration: Some(Duration::from_millis(60)),
            live: false,
            format: OutputFormat::Json,
            cgroup_root: Some(root.path().to_path_buf()),
            proc_root: PathBuf::from("/proc"),
        }
    }

    fn cgroup_with_pids(pids: &str) -> TempDir {
        let root = TempDir::new().unwrap();
        let group = root.path().join("system.slice/demo.service");
        std::fs::create_dir_all(&group).unwrap();
        std::fs::write(group.join("cgroup.procs"), pids).unwrap();
        root
    }

    #[test]
    fn test_outcome_exit_code() {
        let outcome = Outcome {
            records: 0,
            ticks: 4,
        };
        assert_eq!(outcome.exit_code(), 1);

        let outcome = Outcome {
            records: 3,
            ticks: 4,
        };
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_run_samples_current_process() {
        let root = cgroup_with_pids(&format!("{}\n", std::process::id()));
        let outcome = run(config(&root, "/system.slice/demo.service"))
            .await
            .unwrap();

        assert_eq!(outcome.records, 1);
        assert!(outcome.ticks >= 1);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_run_with_empty_group_collects_nothing() {
        let root = cgroup_with_pids("");
        let outcome = run(config(&root, "system.slice/demo.service"))
            .await
            .unwrap();

        assert_eq!(outcome.records, 0);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_run_with_missing_group_fails() {
        let root = cgroup_with_pids("");
        let err = run(config(&root, "/system.slice/missing.service"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::MissingPath { .. })
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_explicit_cgroup_root_wins() {
        let root = TempDir::new().unwrap();
        let config = config(&root, "/x");
        assert_eq!(cgroup_root(&config), root.path());
    }

    #[test]
    fn test_cgroup_root_falls_back_without_mountinfo() {
        let root = TempDir::new().unwrap();
        let mut config = config(&root, "/x");
        config.cgroup_root = None;
        config.proc_root = root.path().join("no-proc");
        assert_eq!(
            cgroup_root(&config),
            PathBuf::from(mountinfo::DEFAULT_CGROUP2_ROOT)
        );
    }
}
