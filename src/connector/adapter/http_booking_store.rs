use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::api_client::{error_message, read_json, unexpected_status};
use super::wire::{BookingDto, CreateBookingRequest};
use super::ApiClient;
use crate::application::BookingStore;
use crate::domain::{Booking, DomainError, Service, SessionContext};

/// [`BookingStore`] backed by the booking backend.
///
/// The backend enforces the no-overlap rule; `409 Conflict` on creation
/// becomes [`DomainError::Conflict`].
pub struct HttpBookingStore {
    client: Arc<ApiClient>,
}

impl HttpBookingStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BookingStore for HttpBookingStore {
    async fn create_booking(
        &self,
        service: &Service,
        worker_id: &str,
        start: DateTime<Utc>,
        ctx: &SessionContext,
    ) -> Result<Booking, DomainError> {
        let body = CreateBookingRequest {
            service_id: service.id().to_string(),
            worker_id: worker_id.to_string(),
            start,
        };
        let request = self.client.post("/bookings", Some(ctx)).json(&body);
        let response = self.client.send(request, "create booking").await?;

        match response.status() {
            status if status.is_success() => {
                let dto: BookingDto = read_json(response, "create booking").await?;
                debug!("Backend accepted booking {} ({})", dto.id, dto.status);
                dto.into_created(service, worker_id, start, ctx.customer_id())
            }
            StatusCode::CONFLICT => {
                let reason = error_message(response).await;
                warn!("Backend rejected overlapping booking for worker {}: {}", worker_id, reason);
                Err(DomainError::conflict(worker_id, start))
            }
            status => Err(unexpected_status("create booking", status, response).await),
        }
    }

    async fn list_bookings(
        &self,
        worker_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        ctx: &SessionContext,
    ) -> Result<Vec<Booking>, DomainError> {
        let request = self
            .client
            .get(&format!("/workers/{worker_id}/bookings"), Some(ctx))
            .query(&[
                ("from", from.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("to", to.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ]);
        let dtos: Vec<BookingDto> = self.client.fetch(request, "list bookings").await?;

        dtos.into_iter().map(BookingDto::into_domain).collect()
    }

    async fn cancel_booking(
        &self,
        booking_id: &str,
        ctx: &SessionContext,
    ) -> Result<Booking, DomainError> {
        let request = self
            .client
            .post(&format!("/bookings/{booking_id}/cancel"), Some(ctx));
        let dto: BookingDto = self.client.fetch(request, "cancel booking").await?;

        dto.into_domain()
    }
}
