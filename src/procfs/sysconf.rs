//! Kernel constants needed to turn procfs counters into units.

/// Fallback for `_SC_CLK_TCK`; `USER_HZ` is 100 on every mainstream architecture.
const DEFAULT_TICKS_PER_SECOND: u64 = 100;
const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Clock ticks per second used by `utime`/`stime` in `/proc/<pid>/stat`.
pub fn ticks_per_second() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads a constant.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    positive_or(ticks, DEFAULT_TICKS_PER_SECOND)
}

/// Size of a memory page in bytes, the unit of `rss` in `/proc/<pid>/stat`.
pub fn page_size() -> u64 {
    // SAFETY: see above.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    positive_or(size, DEFAULT_PAGE_SIZE)
}

fn positive_or(value: libc::c_long, fallback: u64) -> u64 {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .unwrap_or_else(|| {
            log::warn!("sysconf returned {value}, falling back to {fallback}");
            fallback
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_positive() {
        assert!(ticks_per_second() > 0);
        assert!(page_size() > 0);
    }

    #[test]
    fn test_positive_or_falls_back() {
        assert_eq!(positive_or(-1, 100), 100);
        assert_eq!(positive_or(0, 4096), 4096);
        assert_eq!(positive_or(250, 100), 250);
    }
}
