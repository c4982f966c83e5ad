use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use anyhow::{Context, Result};

/// Flag that can be claimed exactly once and is never reset.
pub struct OneShot {
    fired: AtomicBool,
}

impl OneShot {
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// True for the first caller only.
    pub fn claim(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Default for OneShot {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `f` on a named thread if `guard` has not fired yet.
pub fn spawn_once<T, F>(guard: &OneShot, name: &str, f: F) -> Result<Option<JoinHandle<T>>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    if !guard.claim() {
        return Ok(None);
    }
    let handle = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .with_context(|| format!("spawn {} thread", name))?;
    Ok(Some(handle))
}
