//! Rolling window of the most recent classifications.

use crate::contract::StressLevel;

pub const TREND_WINDOW: usize = 5;

/// Fixed-capacity ring of the last [`TREND_WINDOW`] levels, oldest evicted first.
#[derive(Debug, Clone, Default)]
pub struct TrendTracker {
    slots: [Option<StressLevel>; TREND_WINDOW],
    /// Index the next append writes to.
    head: usize,
    len: usize,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, level: StressLevel) {
        self.slots[self.head] = Some(level);
        self.head = (self.head + 1) % TREND_WINDOW;
        self.len = (self.len + 1).min(TREND_WINDOW);
    }

    /// Exactly [`TREND_WINDOW`] slots, empty slots first, then oldest to newest.
    pub fn snapshot(&self) -> [Option<StressLevel>; TREND_WINDOW] {
        let mut view = [None; TREND_WINDOW];
        let pad = TREND_WINDOW - self.len;
        for (offset, level) in self.iter().enumerate() {
            view[pad + offset] = Some(level);
        }
        view
    }

    /// Stored levels, oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = StressLevel> + '_ {
        let start = (self.head + TREND_WINDOW - self.len) % TREND_WINDOW;
        (0..self.len).filter_map(move |i| self.slots[(start + i) % TREND_WINDOW])
    }

    pub fn latest(&self) -> Option<StressLevel> {
        if self.len == 0 {
            return None;
        }
        self.slots[(self.head + TREND_WINDOW - 1) % TREND_WINDOW]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
