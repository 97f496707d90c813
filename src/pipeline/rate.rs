use std::time::Duration;

/// What the orchestrator sleeps after a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Regular spacing between batches.
    Short(Duration),
    /// The request budget was used up; the counter has been reset.
    Long(Duration),
}

impl Pause {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Short(d) | Self::Long(d) => *d,
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Self::Long(_))
    }
}

/// Counts records sent to the external service since the last long pause.
///
/// Every attempted batch counts, committed or not: the quota is shared no
/// matter how the batch ended.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests_before_pause: usize,
    delay_between_batches: Duration,
    long_pause: Duration,
    sent: usize,
}

impl RateLimiter {
    pub fn new(
        max_requests_before_pause: usize,
        delay_between_batches: Duration,
        long_pause: Duration,
    ) -> Self {
        Self {
            max_requests_before_pause,
            delay_between_batches,
            long_pause,
            sent: 0,
        }
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Account for `records` sent and decide the next sleep.
    pub fn record(&mut self, records: usize) -> Pause {
        self.sent = self.sent.saturating_add(records);
        if self.sent >= self.max_requests_before_pause {
            self.sent = 0;
            Pause::Long(self.long_pause)
        } else {
            Pause::Short(self.delay_between_batches)
        }
    }
}
