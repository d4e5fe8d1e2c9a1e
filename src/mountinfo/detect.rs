use crate::fsutil;

use super::parser::parse_mount_entry;
use super::{Error, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Where systemd mounts the unified hierarchy on virtually every distribution.
pub const DEFAULT_CGROUP2_ROOT: &str = "/sys/fs/cgroup";

/// Detects the cgroup v2 mount point by parsing a Linux `mountinfo` file.
///
/// The first entry with filesystem type `cgroup2` wins.
///
/// # Arguments
///
/// * `path` - Path to a mountinfo file (e.g., `/proc/self/mountinfo`).
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file can't be opened.
/// - [`Error::ReadLine`] if reading from the file fails.
/// - [`Error::Parse`] if a line is malformed.
/// - [`Error::MissingCgroup2Mount`] if no `cgroup2` mount is found.
///
/// # Example
///
/// ```no_run
/// use unit_monitor::mountinfo::detect_cgroup2_mount_point;
///
/// let root = detect_cgroup2_mount_point("/proc/self/mountinfo").unwrap();
/// println!("cgroup2 root: {}", root.display());
/// ```
pub fn detect_cgroup2_mount_point(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let reader = fsutil::open_file_reader(path)?;

    find_cgroup2_mount_point(reader, path)
}

fn find_cgroup2_mount_point<R: BufRead>(mut reader: R, origin: &Path) -> Result<PathBuf> {
    let mut line = String::with_capacity(256);
    let mut lineno = 0;

    while reader
        .read_line(&mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        lineno += 1;
        let entry = parse_mount_entry(line.trim_end()).map_err(|source| Error::Parse {
            path: origin.to_path_buf(),
            line: lineno,
            source,
        })?;
        if entry.fs_type == "cgroup2" {
            log::debug!("Found `cgroup2` mount point: {}", entry.mount_point);
            return Ok(PathBuf::from(entry.mount_point.into_owned()));
        }

        line.clear();
    }

    Err(Error::MissingCgroup2Mount {
        path: origin.to_path_buf(),
    })
}
