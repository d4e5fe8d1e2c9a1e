use std::io::{self, Write};

use super::{Presenter, Snapshot, Summary};

/// Writes the final report as a pretty-printed JSON document and nothing
/// else, so the output can be piped into other tools.
#[derive(Debug)]
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn render(&mut self, _snapshot: &Snapshot<'_>) -> io::Result<()> {
        Ok(())
    }

    fn render_final(&mut self, summary: &Summary) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, summary)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
