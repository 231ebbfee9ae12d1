use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Booking;

/// A candidate start time of fixed duration. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    available: bool,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
            available: true,
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_blocked_by(&self, booking: &Booking) -> bool {
        booking.blocks(self.start, self.end)
    }
}
