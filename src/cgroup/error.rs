use std::path::PathBuf;

/// Errors that prevent mapping a service onto a cgroup directory.
///
/// All of them are fatal for the run: without a base path no process can
/// ever be discovered.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("control-group identifier is empty")]
    EmptyIdentifier,
    #[error("control-group identifier `{0}` refers to the root of the hierarchy")]
    RootIdentifier(String),
    #[error("control-group identifier `{0}` must not contain `..` components")]
    InvalidIdentifier(String),
    #[error("cgroup path `{path}` does not exist")]
    MissingPath { path: PathBuf },
    #[error("cgroup path `{path}` is not a directory")]
    NotADirectory { path: PathBuf },
    #[error("failed to read metadata of cgroup path `{path}`: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run `{program}`: {source}")]
    ServiceManagerUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` failed for service `{service}` ({status}): {stderr}")]
    ServiceManager {
        program: String,
        service: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("service `{service}` has no control group (is it loaded and running?)")]
    NoControlGroup { service: String },
}

pub type Result<T> = std::result::Result<T, ResolutionError>;
