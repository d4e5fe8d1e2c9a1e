//! Per-process counters read from procfs.
//!
//! Two files are read for every tracked PID on every tick:
//!
//! - `/proc/<pid>/stat`: name, parent PID, CPU ticks and resident set size.
//!   Required: if it cannot be read the process is treated as gone.
//! - `/proc/<pid>/io`: cumulative storage and transfer byte counters.
//!   Optional: it is only readable for processes of the same user (or with
//!   `CAP_SYS_PTRACE`), so a failure merely drops the I/O part of the sample.
mod error;
mod io;
mod parser;
mod sampler;
mod stat;
mod sysconf;

pub use error::{SampleError, StatParseError};
pub use io::IoCounters;
pub use parser::{KeyValueStat, SingleLineStat};
pub use sampler::{ProcessSample, ProcfsSampler, RawSample, RawSampler};
pub use stat::ProcStat;
pub use sysconf::{page_size, ticks_per_second};
