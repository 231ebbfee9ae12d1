use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use tracing::debug;

use super::api_client::{error_message, read_json, unexpected_status};
use super::wire::{PaymentRequest, PaymentResponse};
use super::ApiClient;
use crate::application::PaymentGateway;
use crate::domain::{DomainError, PaymentMethod, PaymentResult, SessionContext};

/// [`PaymentGateway`] backed by `POST /payments`.
///
/// `402` and `422` are declines. Any other non-2xx status leaves the outcome
/// unknown and is reported as a network error.
pub struct HttpPaymentGateway {
    client: Arc<ApiClient>,
}

impl HttpPaymentGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn capture(
        &self,
        booking_id: &str,
        amount: Decimal,
        method: PaymentMethod,
        ctx: &SessionContext,
    ) -> Result<PaymentResult, DomainError> {
        let body = PaymentRequest {
            booking_id: booking_id.to_string(),
            amount,
            method,
        };
        let request = self.client.post("/payments", Some(ctx)).json(&body);
        let response = self.client.send(request, "capture payment").await?;

        match response.status() {
            status if status.is_success() => {
                let dto: PaymentResponse = read_json(response, "capture payment").await?;
                debug!("Payment {} for booking {} is {}", dto.id, booking_id, dto.status);
                dto.into_domain()
            }
            StatusCode::PAYMENT_REQUIRED | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(DomainError::payment(error_message(response).await))
            }
            status => Err(unexpected_status("capture payment", status, response).await),
        }
    }
}
