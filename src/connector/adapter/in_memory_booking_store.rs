use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::BookingStore;
use crate::domain::{Booking, DomainError, Service, SessionContext};

/// [`BookingStore`] held in memory.
///
/// The overlap check and the insert happen under one lock, so concurrent
/// creations for the same worker cannot both succeed.
pub struct InMemoryBookingStore {
    bookings: Arc<Mutex<Vec<Booking>>>,
    create_calls: AtomicUsize,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self {
            bookings: Arc::new(Mutex::new(Vec::new())),
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Seeds existing bookings, e.g. ones made by other customers.
    pub fn with_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        Self {
            bookings: Arc::new(Mutex::new(bookings.into_iter().collect())),
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `create_booking` calls received, accepted or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.bookings.lock().await.clone()
    }

    pub async fn get(&self, booking_id: &str) -> Option<Booking> {
        self.bookings
            .lock()
            .await
            .iter()
            .find(|b| b.id() == booking_id)
            .cloned()
    }
}

impl Default for InMemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create_booking(
        &self,
        service: &Service,
        worker_id: &str,
        start: DateTime<Utc>,
        ctx: &SessionContext,
    ) -> Result<Booking, DomainError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let booking = Booking::pending(service, worker_id, ctx.customer_id(), start);

        let mut bookings = self.bookings.lock().await;
        let taken = bookings
            .iter()
            .any(|b| b.worker_id() == worker_id && b.blocks(booking.start(), booking.end()));
        if taken {
            debug!("Worker {} already booked at {}", worker_id, start);
            return Err(DomainError::conflict(worker_id, start));
        }

        bookings.push(booking.clone());
        debug!("Stored booking {} for worker {}", booking.id(), worker_id);
        Ok(booking)
    }

    async fn list_bookings(
        &self,
        worker_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        _ctx: &SessionContext,
    ) -> Result<Vec<Booking>, DomainError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .iter()
            .filter(|b| b.worker_id() == worker_id && b.overlaps(from, to))
            .cloned()
            .collect())
    }

    async fn cancel_booking(
        &self,
        booking_id: &str,
        _ctx: &SessionContext,
    ) -> Result<Booking, DomainError> {
        let mut bookings = self.bookings.lock().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id() == booking_id)
            .ok_or_else(|| DomainError::not_found(format!("booking {booking_id}")))?;
        booking.cancel();
        Ok(booking.clone())
    }
}
