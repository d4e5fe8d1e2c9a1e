//! Locating the cgroup v2 hierarchy through `/proc/<pid>/mountinfo`.
mod detect;
mod error;
mod parser;

pub use detect::{DEFAULT_CGROUP2_ROOT, detect_cgroup2_mount_point};
pub use error::{Error, Result};
