use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};

use super::ContentView;
use crate::launch::{DocumentLocation, LoadStatus};

/// Line-oriented view for non-interactive output.
pub struct PlainView<W: Write> {
    out: W,
    interrupted: Arc<AtomicBool>,
}

impl<W: Write> PlainView<W> {
    pub fn new(out: W, interrupted: Arc<AtomicBool>) -> Self {
        Self { out, interrupted }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ContentView for PlainView<W> {
    fn show_status(&mut self, status: &LoadStatus) -> Result<()> {
        writeln!(self.out, "status: {}", status).context("write status")?;
        self.out.flush().context("flush")
    }

    fn show_document(&mut self, url: &str, location: &DocumentLocation) -> Result<()> {
        writeln!(self.out, "open: {} ({})", url, location.path.display())
            .context("write document")?;
        self.out.flush().context("flush")
    }

    fn poll_quit(&mut self, timeout: Duration) -> Result<bool> {
        if self.interrupted.load(Ordering::Acquire) {
            return Ok(true);
        }
        std::thread::sleep(timeout);
        Ok(self.interrupted.load(Ordering::Acquire))
    }
}
