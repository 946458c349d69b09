use embassy_time::{Duration, Instant};

use crate::DEBOUNCE_THRESHOLD;

/// Outcome of running an edge through a [`Debouncer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Debounce {
    Accept,
    Reject,
}

/// Per-line debounce filter.
///
/// Every edge restamps the filter, accepted or not. A burst of contact bounce therefore keeps
/// pushing the quiet window out and collapses into the one edge that opened it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: Duration,
    /// `None` until the first edge arrives
    last_trigger: Option<Instant>,
}

impl Debouncer {
    pub const fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_trigger: None,
        }
    }

    /// Stamps the filter with `now` and reports whether the edge made it through.
    ///
    /// The first edge a line ever sees is accepted. A timestamp earlier than the previous one
    /// counts as zero elapsed time.
    pub fn check(&mut self, now: Instant) -> Debounce {
        let previous = self.last_trigger.replace(now);
        match previous {
            None => Debounce::Accept,
            Some(last) => {
                let elapsed = now
                    .checked_duration_since(last)
                    .unwrap_or(Duration::from_ticks(0));
                if elapsed < self.threshold {
                    Debounce::Reject
                } else {
                    Debounce::Accept
                }
            }
        }
    }

    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_THRESHOLD)
    }
}
