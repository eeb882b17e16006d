//! # Feedback Loop Detector
//!
//! Caps repeated emissions of one `(event type, source)` pair so a handler
//! that re-emits its own trigger cannot cascade forever.
//!
//! ## Tolerance Policy
//!
//! Counting uses a sliding window per key: the first admission opens the
//! window, every admission inside it counts toward the ceiling, and a key
//! whose window has aged out starts over at zero. Bursts faster than the
//! window share one ceiling; emissions spaced wider than the window never
//! accumulate.

use crate::events::EventType;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Refusal returned when a key reaches the ceiling inside its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopRefused {
    /// The event type that hit the ceiling.
    pub event_type: EventType,
    /// The origin it hit the ceiling from.
    pub source: String,
    /// Emissions admitted for the key in the current window.
    pub count: u32,
}

impl std::fmt::Display for LoopRefused {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feedback loop on {:?} from '{}': {} emissions inside the window",
            self.event_type, self.source, self.count
        )
    }
}

impl std::error::Error for LoopRefused {}

struct LoopEntry {
    count: u32,
    window_start: Instant,
}

/// Per-key emission counter with a sliding admission window.
pub struct LoopDetector {
    entries: HashMap<(EventType, String), LoopEntry>,
    ceiling: u32,
    window: Duration,
    last_gc: Instant,
}

impl LoopDetector {
    /// Default ceiling on emissions of one key inside one window.
    pub const DEFAULT_CEILING: u32 = 25;

    /// Default sliding window duration.
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

    /// Expired entries are swept at this multiple of the window.
    const GC_WINDOW_MULTIPLE: u32 = 4;

    /// Create a detector with default ceiling and window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_CEILING, Self::DEFAULT_WINDOW)
    }

    /// Create a detector with a custom ceiling and window.
    #[must_use]
    pub fn with_config(ceiling: u32, window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ceiling,
            window,
            last_gc: Instant::now(),
        }
    }

    /// Admit or refuse one emission of `(event_type, source)`.
    ///
    /// Returns the key's admission count for the current window. A key at
    /// the ceiling is refused until its window ages out.
    pub fn admit(&mut self, event_type: EventType, source: &str) -> Result<u32, LoopRefused> {
        let now = Instant::now();

        if now.duration_since(self.last_gc) > self.window * Self::GC_WINDOW_MULTIPLE {
            self.sweep(now);
            self.last_gc = now;
        }

        let entry = self
            .entries
            .entry((event_type, source.to_owned()))
            .or_insert(LoopEntry {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.ceiling {
            return Err(LoopRefused {
                event_type,
                source: source.to_owned(),
                count: entry.count,
            });
        }

        entry.count += 1;
        Ok(entry.count)
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    /// Forget every key.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries whose window aged out; they would restart at zero anyway.
    fn sweep(&mut self, now: Instant) {
        let window = self.window;
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < window);
    }
}

impl Default for LoopDetector {
    fn default() -> Self {
        Self::new()
    }
}
