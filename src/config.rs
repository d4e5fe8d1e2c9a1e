//! Command-line surface and the validated run configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser, ValueEnum};
use serde::{Serialize, Serializer};

/// Track CPU, memory and I/O of every process in a systemd service's cgroup.
#[derive(Parser, Debug, Clone)]
#[command(name = "unit-monitor", version)]
#[command(group(ArgGroup::new("target").required(true).args(["service", "cgroup"])))]
pub struct Args {
    /// systemd unit to inspect (example: nginx.service)
    #[arg(short, long, env = "UNIT_MONITOR_SERVICE")]
    pub service: Option<String>,

    /// Control group to inspect, relative to the cgroup root (skips systemctl)
    #[arg(long, env = "UNIT_MONITOR_CGROUP")]
    pub cgroup: Option<String>,

    /// Sampling interval in seconds
    #[arg(short, long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub interval: f64,

    /// Total runtime in seconds; 0 runs until interrupted
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub duration: f64,

    /// Show a top-like view that refreshes every tick (press q to stop)
    #[arg(long)]
    pub live: bool,

    /// Format of the final report
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Mount point of the cgroup v2 hierarchy (detected from mountinfo if omitted)
    #[arg(long, env = "CGROUP_ROOT")]
    pub cgroup_root: Option<PathBuf>,

    /// Mount point of procfs
    #[arg(long, env = "PROC_ROOT", default_value = "/proc")]
    pub proc_root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed-width table
    Table,
    /// Pretty-printed JSON document
    Json,
}

/// What to monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// A systemd unit whose `ControlGroup` property is looked up.
    Service(String),
    /// A control-group identifier used verbatim.
    ControlGroup(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Service(service) => write!(f, "service={service}"),
            Target::ControlGroup(cgroup) => write!(f, "cgroup={cgroup}"),
        }
    }
}

/// Validated configuration of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub target: Target,
    #[serde(rename = "interval_secs", serialize_with = "serialize_secs")]
    pub interval: Duration,
    /// `None` runs until interrupted.
    #[serde(rename = "duration_secs", serialize_with = "serialize_opt_secs")]
    pub duration: Option<Duration>,
    pub live: bool,
    pub format: OutputFormat,
    pub cgroup_root: Option<PathBuf>,
    pub proc_root: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--interval must be > 0, got {0}")]
    NonPositiveInterval(f64),
    #[error("--interval {0} is out of range")]
    IntervalOutOfRange(f64),
    #[error("--interval {0} is shorter than one nanosecond")]
    IntervalTooShort(f64),
    #[error("--duration must be >= 0, got {0}")]
    NegativeDuration(f64),
    #[error("--duration {0} is out of range")]
    DurationOutOfRange(f64),
    #[error("exactly one of --service and --cgroup is required")]
    MissingTarget,
    #[error("--live cannot be combined with --format json")]
    LiveJson,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let interval = parse_interval(args.interval)?;
        let duration = parse_duration(args.duration)?;

        let target = match (args.service, args.cgroup) {
            (Some(service), None) => Target::Service(service),
            (None, Some(cgroup)) => Target::ControlGroup(cgroup),
            _ => return Err(ConfigError::MissingTarget),
        };

        if args.live && args.format == OutputFormat::Json {
            return Err(ConfigError::LiveJson);
        }

        Ok(Self {
            target,
            interval,
            duration,
            live: args.live,
            format: args.format,
            cgroup_root: args.cgroup_root,
            proc_root: args.proc_root,
        })
    }
}

fn parse_interval(secs: f64) -> Result<Duration, ConfigError> {
    if secs.is_nan() || secs <= 0.0 {
        return Err(ConfigError::NonPositiveInterval(secs));
    }
    let interval =
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::IntervalOutOfRange(secs))?;
    if interval.is_zero() {
        return Err(ConfigError::IntervalTooShort(secs));
    }
    Ok(interval)
}

fn parse_duration(secs: f64) -> Result<Option<Duration>, ConfigError> {
    if secs.is_nan() || secs < 0.0 {
        return Err(ConfigError::NegativeDuration(secs));
    }
    if secs == 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|_| ConfigError::DurationOutOfRange(secs))
}

fn serialize_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

fn serialize_opt_secs<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_some(&value.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}
