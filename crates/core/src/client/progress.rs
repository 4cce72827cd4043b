//! Optimistic progress while a request is in flight.
//!
//! The server gives no progress signal, so the bar is advanced on a timer up
//! to a ceiling and only jumps to 100 when the response arrives.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Ticker timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_step")]
    pub step: u8,
    /// Simulated progress never goes past this value.
    #[serde(default = "default_ceiling")]
    pub ceiling: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            step: default_step(),
            ceiling: default_ceiling(),
        }
    }
}

fn default_tick_ms() -> u64 {
    200
}

fn default_step() -> u8 {
    10
}

fn default_ceiling() -> u8 {
    90
}

impl ProgressConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Next simulated value. Stays put once the ceiling is reached.
    pub fn advance(&self, current: u8) -> u8 {
        if current >= self.ceiling {
            current
        } else {
            current.saturating_add(self.step).min(self.ceiling)
        }
    }
}

/// A periodic task that stops when dropped.
///
/// The first tick fires one period after start. The tick closure returns
/// `false` to end the task early.
#[derive(Debug)]
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if !tick() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
