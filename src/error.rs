use std::io;

use crate::cgroup::ResolutionError;
use crate::config::ConfigError;

/// Errors that abort a monitoring run.
///
/// Everything that can go wrong for a single process during a single tick is
/// absorbed by the sampling loop and never shows up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Configuration problems exit with `2`, everything else means that no
    /// data could be collected and exits with `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) => 2,
            Error::Resolution(_) | Error::Signal(_) | Error::Output(_) => 1,
        }
    }
}

pub trait ResultOkLogExt<T, E> {
    /// Converts the result into an [`Option`], logging the error at `level`.
    fn ok_log(self, level: log::Level) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, level: log::Level) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::log!(level, "{err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = Error::Config(ConfigError::NonPositiveInterval(0.0));
        assert_eq!(err.exit_code(), 2);

        let err = Error::Resolution(ResolutionError::EmptyIdentifier);
        assert_eq!(err.exit_code(), 1);

        let err = Error::Output(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_ok_log_passes_values_through() {
        let ok: Result<u32, io::Error> = Ok(7);
        assert_eq!(ok.ok_log(log::Level::Trace), Some(7));

        let err: Result<u32, io::Error> = Err(io::Error::other("boom"));
        assert_eq!(err.ok_log(log::Level::Trace), None);
    }
}
