use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::PaymentGateway;
use crate::domain::{DomainError, PaymentMethod, PaymentResult, SessionContext};

/// Scripted outcome for the next capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Capture,
    Decline(String),
    /// The gateway charges but the answer is lost in transit.
    LoseResponse,
    /// The request never reaches the gateway.
    Unreachable,
    /// The gateway answers after the given delay.
    Delay(Duration),
}

/// [`PaymentGateway`] held in memory, for offline runs and tests.
///
/// Captures succeed unless an outcome has been queued with
/// [`push_outcome`](Self::push_outcome). Captures are serialized, and a
/// booking with a final outcome is never charged twice.
pub struct InMemoryPaymentGateway {
    settled: Mutex<HashMap<String, PaymentResult>>,
    script: Mutex<VecDeque<CaptureOutcome>>,
    requests: AtomicUsize,
    charges: AtomicUsize,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self {
            settled: Mutex::new(HashMap::new()),
            script: Mutex::new(VecDeque::new()),
            requests: AtomicUsize::new(0),
            charges: AtomicUsize::new(0),
        }
    }

    pub async fn push_outcome(&self, outcome: CaptureOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Capture requests received.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Distinct charges actually made.
    pub fn charges(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }

    pub async fn outcome_for(&self, booking_id: &str) -> Option<PaymentResult> {
        self.settled.lock().await.get(booking_id).cloned()
    }
}

impl Default for InMemoryPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn capture(
        &self,
        booking_id: &str,
        amount: Decimal,
        method: PaymentMethod,
        _ctx: &SessionContext,
    ) -> Result<PaymentResult, DomainError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let mut settled = self.settled.lock().await;
        if let Some(previous) = settled.get(booking_id) {
            debug!("Booking {} already settled; replaying outcome", booking_id);
            return Ok(previous.clone());
        }

        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(CaptureOutcome::Capture);
        let lose_response = outcome == CaptureOutcome::LoseResponse;

        let result = match outcome {
            CaptureOutcome::Unreachable => {
                return Err(DomainError::network("payment gateway unreachable"));
            }
            CaptureOutcome::Delay(delay) => {
                tokio::time::sleep(delay).await;
                PaymentResult::captured(Uuid::new_v4().to_string())
            }
            CaptureOutcome::Decline(reason) => PaymentResult::failed(Uuid::new_v4().to_string(), reason),
            CaptureOutcome::Capture | CaptureOutcome::LoseResponse => {
                PaymentResult::captured(Uuid::new_v4().to_string())
            }
        };

        if result.is_captured() {
            self.charges.fetch_add(1, Ordering::SeqCst);
            debug!("Charged {} ({}) for booking {}", amount, method, booking_id);
        }
        settled.insert(booking_id.to_string(), result.clone());

        if lose_response {
            return Err(DomainError::network("payment response lost in transit"));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_is_idempotent_per_booking() {
        let gateway = InMemoryPaymentGateway::new();
        let ctx = SessionContext::new("c1");

        let first = gateway
            .capture("bk1", Decimal::new(30, 0), PaymentMethod::Online, &ctx)
            .await
            .unwrap();
        let second = gateway
            .capture("bk1", Decimal::new(30, 0), PaymentMethod::Online, &ctx)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(gateway.requests(), 2);
        assert_eq!(gateway.charges(), 1);
    }

    #[tokio::test]
    async fn test_lost_response_is_replayed_on_retry() {
        let gateway = InMemoryPaymentGateway::new();
        let ctx = SessionContext::new("c1");
        gateway.push_outcome(CaptureOutcome::LoseResponse).await;

        let err = gateway
            .capture("bk1", Decimal::new(30, 0), PaymentMethod::Online, &ctx)
            .await
            .unwrap_err();
        assert!(err.is_network());

        let retried = gateway
            .capture("bk1", Decimal::new(30, 0), PaymentMethod::Online, &ctx)
            .await
            .unwrap();
        assert!(retried.is_captured());
        assert_eq!(gateway.charges(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_records_nothing() {
        let gateway = InMemoryPaymentGateway::new();
        let ctx = SessionContext::new("c1");
        gateway.push_outcome(CaptureOutcome::Unreachable).await;

        assert!(gateway
            .capture("bk1", Decimal::new(30, 0), PaymentMethod::Deposit, &ctx)
            .await
            .unwrap_err()
            .is_network());
        assert!(gateway.outcome_for("bk1").await.is_none());
        assert_eq!(gateway.charges(), 0);
    }

    #[tokio::test]
    async fn test_decline_is_final() {
        let gateway = InMemoryPaymentGateway::new();
        let ctx = SessionContext::new("c1");
        gateway
            .push_outcome(CaptureOutcome::Decline("card expired".into()))
            .await;

        let result = gateway
            .capture("bk1", Decimal::new(30, 0), PaymentMethod::Online, &ctx)
            .await
            .unwrap();

        assert!(!result.is_captured());
        assert_eq!(result.message.as_deref(), Some("card expired"));
        assert_eq!(gateway.charges(), 0);
    }
}
