use std::collections::BTreeMap;
use std::time::Instant;

use super::ProcessRecord;

/// Owns one [`ProcessRecord`] per PID ever observed during the run.
///
/// Records are never removed: a process that exits keeps its statistics
/// until the final report.
#[derive(Debug, Default)]
pub struct ProcessStore {
    records: BTreeMap<u32, ProcessRecord>,
}

impl ProcessStore {
    /// Returns the record of `pid`, creating it on first sight.
    ///
    /// Name and parent are only taken from the first call; later calls just
    /// move the last-seen timestamp forward.
    pub fn upsert(&mut self, pid: u32, name: &str, ppid: u32, seen_at: Instant) -> &mut ProcessRecord {
        let record = self.records.entry(pid).or_insert_with(|| {
            log::debug!("Tracking new process pid={pid} name={name} ppid={ppid}");
            ProcessRecord::new(pid, ppid, name.to_owned(), seen_at)
        });
        record.last_seen = record.last_seen.max(seen_at);
        record
    }

    pub fn record(&mut self, pid: u32) -> Option<&mut ProcessRecord> {
        self.records.get_mut(&pid)
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessRecord> {
        self.records.get(&pid)
    }

    /// All records ordered by PID ascending.
    pub fn snapshot(&self) -> Vec<&ProcessRecord> {
        self.records.values().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_upsert_creates_once() {
        let mut store = ProcessStore::default();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);

        store.upsert(10, "first", 1, t0);
        let record = store.upsert(10, "renamed", 2, t1);
        assert_eq!(record.name(), "first");
        assert_eq!(record.ppid(), 1);
        assert_eq!(record.first_seen(), t0);
        assert_eq!(record.last_seen(), t1);
        assert_eq!(record.observed_for(), Duration::from_secs(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_is_ordered_by_pid() {
        let mut store = ProcessStore::default();
        let now = Instant::now();
        for pid in [300, 5, 42] {
            store.upsert(pid, "p", 1, now);
        }

        let pids: Vec<u32> = store.snapshot().iter().map(|r| r.pid()).collect();
        assert_eq!(pids, vec![5, 42, 300]);
    }

    #[test]
    fn test_record_lookup() {
        let mut store = ProcessStore::default();
        assert!(store.is_empty());
        assert!(store.record(1).is_none());

        store.upsert(1, "init", 0, Instant::now());
        assert_eq!(store.record(1).map(|r| r.pid()), Some(1));
        assert_eq!(store.get(1).map(|r| r.name()), Some("init"));
    }
}
