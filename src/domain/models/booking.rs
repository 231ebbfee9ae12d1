use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, Service};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Failed => "failed",
        }
    }

    /// Pending and confirmed bookings hold their interval; the rest release it.
    pub fn reserves_slot(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            "failed" => Ok(BookingStatus::Failed),
            other => Err(DomainError::internal(format!(
                "unknown booking status '{}'",
                other
            ))),
        }
    }
}

/// A reservation of one worker for the interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    id: String,
    service_id: String,
    worker_id: String,
    customer_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: BookingStatus,
    payment_id: Option<String>,
}

impl Booking {
    /// A new pending booking; `end` is derived from the service duration.
    pub fn pending(
        service: &Service,
        worker_id: impl Into<String>,
        customer_id: impl Into<String>,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            service_id: service.id().to_string(),
            worker_id: worker_id.into(),
            customer_id: customer_id.into(),
            start,
            end: start + service.duration(),
            status: BookingStatus::Pending,
            payment_id: None,
        }
    }

    /// Reconstitutes from persisted data (used by adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: String,
        service_id: String,
        worker_id: String,
        customer_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
        payment_id: Option<String>,
    ) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::internal(format!(
                "booking {} ends before it starts",
                id
            )));
        }
        Ok(Self {
            id,
            service_id,
            worker_id,
            customer_id,
            start,
            end,
            status,
            payment_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    pub fn reserves_slot(&self) -> bool {
        self.status.reserves_slot()
    }

    /// Half-open interval overlap against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }

    /// True when this booking blocks `[start, end)` for its worker.
    pub fn blocks(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.reserves_slot() && self.overlaps(start, end)
    }

    pub fn matches_duration(&self, service: &Service) -> bool {
        self.end - self.start == service.duration()
    }

    pub(crate) fn confirm(&mut self, payment_id: Option<String>) {
        self.status = BookingStatus::Confirmed;
        if payment_id.is_some() {
            self.payment_id = payment_id;
        }
    }

    pub(crate) fn fail(&mut self) {
        self.status = BookingStatus::Failed;
    }

    pub(crate) fn cancel(&mut self) {
        self.status = BookingStatus::Cancelled;
    }
}
