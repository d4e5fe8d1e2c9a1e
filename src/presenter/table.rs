use std::io::{self, Write};

use super::{Presenter, RunHeader, Snapshot, Summary, format_triplet, truncate};

const TABLE_HEADER: &str = "PID      NAME                 PPID     \
    CPU%(min/max/avg)          MEM_MB(min/max/avg)      \
    DISK_Bps(min/max/avg)      XFER_Bps(min/max/avg)";

pub(crate) const NO_DATA: &str = "No matching process data collected.";

/// Batch output: a banner up front, nothing per tick, a table at the end.
#[derive(Debug)]
pub struct TablePresenter<W: Write> {
    out: W,
}

impl<W: Write> TablePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TablePresenter<W> {
    fn begin(&mut self, header: &RunHeader) -> io::Result<()> {
        writeln!(
            self.out,
            "Tracking {} interval={:.2}s",
            header.target,
            header.interval.as_secs_f64()
        )?;
        match header.duration {
            Some(duration) => writeln!(self.out, "Will stop after {:.1}s.", duration.as_secs_f64())?,
            None => writeln!(self.out, "Press Ctrl+C to stop.")?,
        }
        self.out.flush()
    }

    fn render(&mut self, _snapshot: &Snapshot<'_>) -> io::Result<()> {
        Ok(())
    }

    fn render_final(&mut self, summary: &Summary) -> io::Result<()> {
        write_table(&mut self.out, summary)?;
        self.out.flush()
    }
}

/// Writes the final statistics table of `summary` to `out`.
///
/// Rows are ordered by PID. Statistics without a single observation are
/// printed as `-`.
///
/// # Errors
///
/// Propagates write failures of `out`.
pub fn write_table<W: Write + ?Sized>(out: &mut W, summary: &Summary) -> io::Result<()> {
    if summary.processes.is_empty() {
        return writeln!(out, "{NO_DATA}");
    }

    writeln!(out)?;
    writeln!(out, "{TABLE_HEADER}")?;
    for p in &summary.processes {
        writeln!(
            out,
            "{:<8} {:<20} {:<8} {:<24} {:<25} {:<24} {}",
            p.pid,
            truncate(&p.name, 20),
            p.ppid,
            format_triplet(p.cpu_percent),
            format_triplet(p.memory_mb),
            format_triplet(p.disk_bps),
            format_triplet(p.transfer_bps),
        )?;
    }

    let io_unavailable = summary.io_unavailable();
    if io_unavailable > 0 {
        writeln!(out)?;
        writeln!(
            out,
            "Note: /proc/<pid>/io was unreadable for {io_unavailable} process(es); \
             their DISK/XFER statistics are incomplete. Run with sufficient privileges \
             to read them."
        )?;
    }
    Ok(())
}
