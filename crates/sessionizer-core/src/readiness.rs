//! Waiting for a freshly spawned shell before typing into it.
//!
//! Interactive shells print terminal-capability queries while they start.
//! Keys sent before that finishes end up mixed with those sequences, so the
//! layout engine pauses, clears the pane, and pauses again. How long to
//! pause is a [`PaneReadiness`] strategy.

use std::thread;
use std::time::Duration;

use tracing::trace;

/// Decides how long to wait around the `clear` sent to a new pane.
pub trait PaneReadiness {
    /// Block until the pane's shell has had time to start.
    fn settle(&self, pane_id: &str);

    /// Block after `clear` was sent, before further commands.
    fn after_clear(&self, pane_id: &str);
}

impl<R: PaneReadiness + ?Sized> PaneReadiness for &R {
    fn settle(&self, pane_id: &str) {
        (**self).settle(pane_id)
    }

    fn after_clear(&self, pane_id: &str) {
        (**self).after_clear(pane_id)
    }
}

/// Sleep fixed intervals; there is no way to observe the shell directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    /// Wait before `clear`.
    pub settle: Duration,
    /// Wait after `clear`.
    pub after_clear: Duration,
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(200),
            after_clear: Duration::from_millis(50),
        }
    }
}

impl FixedDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_after_clear(mut self, after_clear: Duration) -> Self {
        self.after_clear = after_clear;
        self
    }
}

impl PaneReadiness for FixedDelay {
    fn settle(&self, pane_id: &str) {
        trace!(pane = %pane_id, delay = ?self.settle, "waiting for shell");
        thread::sleep(self.settle);
    }

    fn after_clear(&self, pane_id: &str) {
        trace!(pane = %pane_id, delay = ?self.after_clear, "waiting after clear");
        thread::sleep(self.after_clear);
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl PaneReadiness for NoDelay {
    fn settle(&self, _pane_id: &str) {}

    fn after_clear(&self, _pane_id: &str) {}
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_default_delays() {
        let delay = FixedDelay::default();
        assert_eq!(delay.settle, Duration::from_millis(200));
        assert_eq!(delay.after_clear, Duration::from_millis(50));
    }

    #[test]
    fn test_builder() {
        let delay = FixedDelay::new()
            .with_settle(Duration::from_millis(5))
            .with_after_clear(Duration::from_millis(1));
        assert_eq!(delay.settle, Duration::from_millis(5));
        assert_eq!(delay.after_clear, Duration::from_millis(1));
    }

    #[test]
    fn test_fixed_delay_sleeps() {
        let delay = FixedDelay::new()
            .with_settle(Duration::from_millis(10))
            .with_after_clear(Duration::from_millis(5));
        let start = Instant::now();
        delay.settle("%0");
        delay.after_clear("%0");
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
