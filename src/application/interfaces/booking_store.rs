use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Booking, DomainError, Service, SessionContext};

/// Authoritative booking persistence.
///
/// Implementations must apply the no-overlap rule atomically: two pending or
/// confirmed bookings of the same worker never share any part of their
/// `[start, end)` intervals. A violating request fails with
/// [`DomainError::Conflict`].
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Creates a pending booking of `service` for `[start, start + duration)`.
    async fn create_booking(
        &self,
        service: &Service,
        worker_id: &str,
        start: DateTime<Utc>,
        ctx: &SessionContext,
    ) -> Result<Booking, DomainError>;

    /// Bookings of `worker_id` that intersect `[from, to)`, in any status.
    async fn list_bookings(
        &self,
        worker_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        ctx: &SessionContext,
    ) -> Result<Vec<Booking>, DomainError>;

    /// Releases the booking's interval. Cancelling twice is not an error.
    async fn cancel_booking(
        &self,
        booking_id: &str,
        ctx: &SessionContext,
    ) -> Result<Booking, DomainError>;
}
