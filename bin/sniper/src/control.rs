//! File-sentinel lifecycle control (§15).
//!
//! The dependency stack carries no IPC/signal-sending crate, so `stop`
//! communicates with a running `start` over two marker files under
//! `<data_dir>/control/` rather than a socket or PID signal:
//!
//! - `running`: written when `start` begins, removed on clean exit. Its
//!   presence is what `sniper health`, run standalone, can't see (that case
//!   falls back to a config-only self-check); a future remote-health mode
//!   would read it.
//! - `stop_requested`: touched by `sniper stop`; `start` polls for it
//!   alongside real `tokio::signal` handling and treats it exactly like
//!   SIGINT/SIGTERM.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct ControlDir {
    root: PathBuf,
}

impl ControlDir {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("control"),
        }
    }

    fn running_marker(&self) -> PathBuf {
        self.root.join("running")
    }

    fn stop_sentinel(&self) -> PathBuf {
        self.root.join("stop_requested")
    }

    /// Creates the control directory and the `running` marker. Called once
    /// at the top of `start`.
    pub fn mark_running(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let _ = std::fs::remove_file(self.stop_sentinel());
        std::fs::write(self.running_marker(), std::process::id().to_string())
    }

    /// Removes the `running` marker on clean exit.
    pub fn mark_stopped(&self) {
        let _ = std::fs::remove_file(self.running_marker());
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_sentinel().exists()
    }

    /// Best-effort: touches the stop sentinel regardless of whether a
    /// `running` marker exists (§15 "absence of a running instance is not
    /// an error").
    pub fn request_stop(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.stop_sentinel(), "")
    }

    pub fn is_running(&self) -> bool {
        self.running_marker().exists()
    }
}

/// How often [`ControlDir::stop_requested`] is polled by the main select
/// loop, alongside the real OS signal handlers.
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_request_is_visible_without_a_running_instance() {
        let dir = tempdir();
        let control = ControlDir::new(&dir);
        assert!(!control.is_running());
        control.request_stop().unwrap();
        assert!(control.stop_requested());
    }

    #[test]
    fn mark_running_then_stopped_round_trips() {
        let dir = tempdir();
        let control = ControlDir::new(&dir);
        control.mark_running().unwrap();
        assert!(control.is_running());
        control.mark_stopped();
        assert!(!control.is_running());
    }

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("sniper-control-test-{}", std::process::id()));
        dir.push(uniquify());
        dir
    }

    fn uniquify() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::Relaxed).to_string()
    }
}
