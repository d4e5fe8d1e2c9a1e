//! Parsing of `/proc/<pid>/io`.
//!
//! ```text
//! rchar: 323934931
//! wchar: 323929600
//! syscr: 632687
//! syscw: 632675
//! read_bytes: 0
//! write_bytes: 323932160
//! cancelled_write_bytes: 0
//! ```
//!
//! `read_bytes`/`write_bytes` count what actually hit the storage layer,
//! `rchar`/`wchar` count every byte passed through `read(2)`/`write(2)` and
//! friends, including pipes, sockets and page-cache hits.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use super::parser::KeyValueStat;

/// Cumulative I/O counters of one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IoCounters {
    /// Bytes read through any I/O path.
    pub rchar: u64,
    /// Bytes written through any I/O path.
    pub wchar: u64,
    /// Bytes fetched from the storage layer.
    pub read_bytes: u64,
    /// Bytes sent to the storage layer.
    pub write_bytes: u64,
}

impl IoCounters {
    /// Total bytes moved to or from storage.
    pub fn disk_total(&self) -> u64 {
        self.read_bytes.saturating_add(self.write_bytes)
    }

    /// Total bytes moved through any I/O path.
    pub fn transfer_total(&self) -> u64 {
        self.rchar.saturating_add(self.wchar)
    }

    fn set_rchar(&mut self, rchar: u64) {
        self.rchar = rchar;
    }

    fn set_wchar(&mut self, wchar: u64) {
        self.wchar = wchar;
    }

    fn set_read_bytes(&mut self, read_bytes: u64) {
        self.read_bytes = read_bytes;
    }

    fn set_write_bytes(&mut self, write_bytes: u64) {
        self.write_bytes = write_bytes;
    }
}

type Setter = fn(&mut IoCounters, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(4);

    m.insert("rchar", IoCounters::set_rchar);
    m.insert("wchar", IoCounters::set_wchar);
    m.insert("read_bytes", IoCounters::set_read_bytes);
    m.insert("write_bytes", IoCounters::set_write_bytes);

    m
});

impl KeyValueStat for IoCounters {
    const SEPARATOR: char = ':';
    const ALLOW_DUPLICATE_KEYS: bool = false;

    #[inline]
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}
