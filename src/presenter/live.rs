use std::cmp::Ordering;
use std::io::{self, Stdout, Write};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style::Print};
use tokio_util::sync::CancellationToken;

use super::{Presenter, RunHeader, Snapshot, Summary, truncate, write_table};
use crate::error::ResultOkLogExt;
use crate::metrics::ProcessRecord;

const KEY_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Full-screen view of the current values, redrawn after every tick.
///
/// Owns the terminal from construction until [`Presenter::render_final`] (or
/// drop), whichever comes first.
#[derive(Debug)]
pub struct LivePresenter {
    out: Stdout,
    status: String,
    watcher: Option<KeyWatcher>,
    active: bool,
}

impl LivePresenter {
    /// Switches the terminal to raw mode on the alternate screen and starts a
    /// key watcher that cancels `cancel` on `q`, `Q` or Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout is not a terminal that supports raw mode.
    pub fn new(cancel: CancellationToken) -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(out, EnterAlternateScreen, cursor::Hide) {
            terminal::disable_raw_mode().ok_log(log::Level::Warn);
            return Err(err);
        }

        Ok(Self {
            out,
            status: String::new(),
            watcher: Some(KeyWatcher::spawn(cancel)),
            active: true,
        })
    }

    fn restore(&mut self) -> io::Result<()> {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Presenter for LivePresenter {
    fn begin(&mut self, header: &RunHeader) -> io::Result<()> {
        self.status = format!(
            "{} interval={:.2}s",
            header.target,
            header.interval.as_secs_f64()
        );
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        let lines = live_lines(&self.status, snapshot, width, height);

        queue!(self.out, Clear(ClearType::All))?;
        for (row, line) in (0u16..).zip(lines) {
            queue!(self.out, cursor::MoveTo(0, row), Print(line))?;
        }
        self.out.flush()
    }

    fn render_final(&mut self, summary: &Summary) -> io::Result<()> {
        self.restore()?;
        write_table(&mut self.out, summary)?;
        self.out.flush()
    }
}

impl Drop for LivePresenter {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            log::warn!("Failed to restore terminal: {err}");
        }
    }
}

/// Builds the screen content of one live frame.
///
/// The first line is the status line, the second the column header, followed
/// by one line per record ordered by current CPU and then current memory,
/// both descending. Rows that do not fit into `height` (keeping the last line
/// free) are dropped and every line is clipped to `width - 1` characters.
pub fn live_lines(status: &str, snapshot: &Snapshot<'_>, width: u16, height: u16) -> Vec<String> {
    let max_lines = usize::from(height.saturating_sub(1)).max(2);
    let max_chars = usize::from(width.saturating_sub(1));

    let mut records = snapshot.records.clone();
    records.sort_by(|a, b| by_current_usage(b, a));

    let mut lines = Vec::with_capacity(max_lines);
    lines.push(format!(
        "{status} tracked_now={} q=quit Ctrl+C=stop",
        snapshot.tracked_now
    ));
    lines.push(format!(
        "{:<8} {:<20} {:<8} {:>8} {:>9} {:>10} {:>10}",
        "PID", "NAME", "PPID", "CPU%", "MEM_MB", "DISK_Bps", "XFER_Bps"
    ));
    lines.extend(
        records
            .iter()
            .take(max_lines.saturating_sub(2))
            .map(|record| live_row(record)),
    );

    for line in &mut lines {
        let clipped = truncate(line, max_chars).len();
        line.truncate(clipped);
    }
    lines
}

fn live_row(record: &ProcessRecord) -> String {
    let current = record.current();
    format!(
        "{:<8} {:<20} {:<8} {:>8} {:>9} {:>10} {:>10}",
        record.pid(),
        truncate(record.name(), 20),
        record.ppid(),
        format_current(current.cpu_percent),
        format_current(current.memory_mb),
        format_current(current.disk_bps),
        format_current(current.transfer_bps),
    )
}

fn format_current(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.2}"))
}

fn by_current_usage(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    let key = |r: &ProcessRecord| {
        let current = r.current();
        (
            current.cpu_percent.unwrap_or(0.0),
            current.memory_mb.unwrap_or(0.0),
        )
    };
    let (a_cpu, a_mem) = key(a);
    let (b_cpu, b_mem) = key(b);
    a_cpu.total_cmp(&b_cpu).then(a_mem.total_cmp(&b_mem))
}

/// Returns `true` for the keys that end a live session.
///
/// Raw mode swallows SIGINT, so Ctrl+C arrives here as a key event.
pub fn is_quit(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Blocking thread polling the keyboard while the live view is active.
#[derive(Debug)]
struct KeyWatcher {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl KeyWatcher {
    fn spawn(cancel: CancellationToken) -> Self {
        // Child token: stops the watcher when the run is cancelled elsewhere,
        // while stopping the watcher alone leaves the run untouched.
        let stop = cancel.child_token();
        let thread_stop = stop.clone();
        let handle = std::thread::spawn(move || watch_keys(&cancel, &thread_stop));
        Self { stop, handle }
    }

    fn stop(self) {
        self.stop.cancel();
        if self.handle.join().is_err() {
            log::warn!("Key watcher thread panicked");
        }
    }
}

fn watch_keys(cancel: &CancellationToken, stop: &CancellationToken) {
    while !stop.is_cancelled() {
        match event::poll(KEY_POLL_TIMEOUT) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => {
                log::warn!("Keyboard polling failed: {err}");
                return;
            }
        }
        match event::read() {
            Ok(Event::Key(key)) if is_quit(&key) => {
                log::debug!("Quit requested from keyboard");
                cancel.cancel();
                return;
            }
            Ok(_) => {}
            Err(err) => {
                log::warn!("Failed to read keyboard event: {err}");
                return;
            }
        }
    }
}
