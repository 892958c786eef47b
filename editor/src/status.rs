//! Where editor commands report to the user.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

/// A status bar that commands report finished edits to.
pub trait StatusSink: Send + Sync {
    /// Shows `text` for `duration`.
    fn show_tip(&self, duration: Duration, text: &str);
    /// Requests a redraw of the status bar.
    fn invalidate(&self);
}

/// Writes tips to the log. Used by the command line binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn show_tip(&self, duration: Duration, text: &str) {
        log::info!("{text} ({}ms)", duration.as_millis());
    }

    fn invalidate(&self) {
        log::trace!("Status bar invalidated");
    }
}

/// A shown tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTip {
    pub text: String,
    pub duration: Duration,
}

/// Keeps the most recent tips in memory.
#[derive(Debug)]
pub struct StatusBuffer {
    state: Mutex<StatusBufferState>,
}

#[derive(Debug)]
struct StatusBufferState {
    tips: VecDeque<StatusTip>,
    max_capacity: usize,
    invalidations: usize,
}

impl StatusBuffer {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            state: Mutex::new(StatusBufferState {
                tips: VecDeque::with_capacity(max_capacity.min(64)),
                max_capacity: max_capacity.max(1),
                invalidations: 0,
            }),
        }
    }

    /// Tips in the order they were shown, oldest first.
    pub fn tips(&self) -> Vec<StatusTip> {
        self.state.lock().tips.iter().cloned().collect()
    }

    pub fn last_tip(&self) -> Option<StatusTip> {
        self.state.lock().tips.back().cloned()
    }

    pub fn invalidations(&self) -> usize {
        self.state.lock().invalidations
    }
}

impl Default for StatusBuffer {
    fn default() -> Self {
        Self::new(64)
    }
}

impl StatusSink for StatusBuffer {
    fn show_tip(&self, duration: Duration, text: &str) {
        let mut state = self.state.lock();
        if state.tips.len() >= state.max_capacity {
            state.tips.pop_front();
        }
        state.tips.push_back(StatusTip {
            text: text.to_owned(),
            duration,
        });
    }

    fn invalidate(&self) {
        self.state.lock().invalidations += 1;
    }
}
