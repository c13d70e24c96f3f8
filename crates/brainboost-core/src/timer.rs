//! Cooperative timers driven by the caller once per second.
//!
//! Nothing here owns a thread or reads the clock. A front end calls `tick()`
//! from its own loop, or `advance(secs)` with measured wall time.

use std::fmt;

/// Counts down from a fixed limit. Declares time-up for Result Keeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    limit: u32,
    elapsed: u32,
}

impl Countdown {
    pub fn new(limit_secs: u32) -> Self {
        Self {
            limit: limit_secs,
            elapsed: 0,
        }
    }

    /// Advance one second. Returns true once the limit is reached.
    pub fn tick(&mut self) -> bool {
        self.advance(1)
    }

    /// Advance by `secs`, clamped at the limit. Returns true once expired.
    pub fn advance(&mut self, secs: u32) -> bool {
        self.elapsed = self.elapsed.saturating_add(secs).min(self.limit);
        self.is_expired()
    }

    pub fn remaining(&self) -> u32 {
        self.limit - self.elapsed
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.limit
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_clock(self.remaining()))
    }
}

/// Counts up with lap marks. Tracks Associative Chaining play time and the
/// memorization phase within it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed: u32,
    last_mark: u32,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.advance(1);
    }

    pub fn advance(&mut self, secs: u32) {
        self.elapsed = self.elapsed.saturating_add(secs);
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Seconds since the previous mark (or the start), then set a new mark.
    pub fn lap(&mut self) -> u32 {
        let lap = self.elapsed - self.last_mark;
        self.last_mark = self.elapsed;
        lap
    }
}

impl fmt::Display for Stopwatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_clock(self.elapsed))
    }
}

/// `mm:ss`, minutes unbounded.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
