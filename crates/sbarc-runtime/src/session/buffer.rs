//! Bounded per-session output history.

use sbarc_core::{DEFAULT_RETAINED_LINES, OutputEvent};
use std::collections::VecDeque;

/// Ring buffer of a session's most recent events, oldest dropped first.
#[derive(Debug)]
pub struct OutputBuffer {
    events: VecDeque<OutputEvent>,
    capacity: usize,
    dropped: u64,
}

impl OutputBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_RETAINED_LINES)),
            capacity,
            dropped: 0,
        }
    }

    /// Add an event, removing the oldest if at capacity.
    pub fn push(&mut self, event: OutputEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn to_vec(&self) -> Vec<OutputEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded to stay within capacity.
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_RETAINED_LINES)
    }
}
