use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{DomainError, PaymentMethod, PaymentResult, SessionContext};

/// Captures payments for bookings.
///
/// `capture` must be idempotent per booking id: repeating it for a booking that
/// already has a final outcome returns that outcome instead of charging again.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn capture(
        &self,
        booking_id: &str,
        amount: Decimal,
        method: PaymentMethod,
        ctx: &SessionContext,
    ) -> Result<PaymentResult, DomainError>;
}
