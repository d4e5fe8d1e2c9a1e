use std::process::ExitCode;

use clap::Parser;
use unit_monitor::Error;
use unit_monitor::config::{Args, Config};

/// Entry point for the Unit Monitor resource tracker.
///
/// Parses the command line, samples every process in the service's control
/// group and prints per-process min/max/average statistics when sampling
/// stops.
///
/// # Exit codes
///
/// - `0`: at least one process was observed.
/// - `1`: nothing was observed, or the control group could not be resolved.
/// - `2`: invalid arguments.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug unit-monitor --service nginx.service --interval 1 --duration 30
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let config = match Config::try_from(Args::parse()) {
        Ok(config) => config,
        Err(err) => return fail(Error::from(err)),
    };

    match unit_monitor::run(config).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => fail(err),
    }
}

fn fail(err: Error) -> ExitCode {
    log::error!("{err}");
    ExitCode::from(err.exit_code())
}
