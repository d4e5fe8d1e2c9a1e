use std::collections::{BTreeSet, VecDeque};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::fsutil;

/// Lists the processes that currently belong to the monitored service.
pub trait ProcessSetDiscoverer {
    /// Returns the PIDs present right now, de-duplicated and ascending.
    ///
    /// An empty set is a valid answer: the service may have no live
    /// processes at this instant.
    fn discover(&self) -> BTreeSet<u32>;
}

/// Discovers PIDs by reading `cgroup.procs` in a cgroup v2 directory and all
/// of its nested groups.
#[derive(Debug, Clone)]
pub struct CgroupDiscoverer {
    base: PathBuf,
}

impl CgroupDiscoverer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ProcessSetDiscoverer for CgroupDiscoverer {
    fn discover(&self) -> BTreeSet<u32> {
        let mut pids = BTreeSet::new();
        let mut stack = VecDeque::new();
        stack.push_back(self.base.clone());

        while let Some(path) = stack.pop_back() {
            read_pids_into(&path, &mut pids);

            // Groups come and go while we walk; a vanished directory just
            // contributes nothing.
            let Ok(entries) = std::fs::read_dir(&path) else {
                log::trace!("cgroup {} vanished during discovery", path.display());
                continue;
            };
            for entry in entries.map_while(Result::ok) {
                if entry.file_type().is_ok_and(|ft| ft.is_dir()) {
                    stack.push_back(entry.path());
                }
            }
        }

        pids
    }
}

#[inline]
fn read_pids_into(path: &Path, pids: &mut BTreeSet<u32>) {
    let reader = match fsutil::open_file_reader(path.join("cgroup.procs")) {
        Ok(reader) => reader,
        // Groups removed while walking are expected; anything else (e.g.
        // missing permissions) silently hides processes and is worth a warning.
        Err(err) if err.is_not_found() => {
            log::trace!("{err}");
            return;
        }
        Err(err) => {
            log::warn!("{err}");
            return;
        }
    };

    for line in reader.lines().map_while(Result::ok) {
        if let Ok(pid) = line.trim().parse::<u32>() {
            pids.insert(pid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_procs(dir: &Path, contents: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("cgroup.procs"), contents).unwrap();
    }

    #[test]
    fn test_discover_single_group() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "10\n20\n");

        let pids = CgroupDiscoverer::new(root.path()).discover();
        assert_eq!(pids.into_iter().collect::<Vec<_>>(), vec![10, 20]);
    }

    #[test]
    fn test_discover_nested_groups_deduplicated() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "30\n10\n");
        write_procs(&root.path().join("worker"), "40\n10\n");
        write_procs(&root.path().join("worker/inner"), "50\n");

        let pids = CgroupDiscoverer::new(root.path()).discover();
        assert_eq!(pids.into_iter().collect::<Vec<_>>(), vec![10, 30, 40, 50]);
    }

    #[test]
    fn test_discover_empty_group() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "");

        assert!(CgroupDiscoverer::new(root.path()).discover().is_empty());
    }

    #[test]
    fn test_discover_vanished_group() {
        let root = tempfile::tempdir().unwrap();
        let gone = root.path().join("gone.service");

        assert!(CgroupDiscoverer::new(gone).discover().is_empty());
    }

    #[test]
    fn test_discover_ignores_garbage_lines() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "12\nnot-a-pid\n\n 13 \n");

        let pids = CgroupDiscoverer::new(root.path()).discover();
        assert_eq!(pids.into_iter().collect::<Vec<_>>(), vec![12, 13]);
    }
}
