use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A bookable service offered by a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    id: String,
    business_id: String,
    /// Services performed by one specific worker carry that worker's id.
    worker_id: Option<String>,
    name: String,
    price: Decimal,
    currency: String,
    duration_minutes: u32,
}

impl Service {
    pub fn new(
        id: impl Into<String>,
        business_id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        currency: impl Into<String>,
        duration_minutes: u32,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        if duration_minutes == 0 {
            return Err(DomainError::validation(format!(
                "service {} must have a positive duration",
                id
            )));
        }
        if price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "service {} has a negative price: {}",
                id, price
            )));
        }

        Ok(Self {
            id,
            business_id: business_id.into(),
            worker_id: None,
            name: name.into(),
            price,
            currency: currency.into(),
            duration_minutes,
        })
    }

    pub fn with_worker(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn business_id(&self) -> &str {
        &self.business_id
    }

    pub fn worker_id(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn has_fixed_worker(&self) -> bool {
        self.worker_id.is_some()
    }

    pub fn price_label(&self) -> String {
        format!("{:.2} {}", self.price, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_creation() {
        let service = Service::new("s1", "b1", "Signature Cut", Decimal::new(3000, 2), "EUR", 45)
            .unwrap()
            .with_worker("w1");

        assert_eq!(service.duration(), Duration::minutes(45));
        assert_eq!(service.worker_id(), Some("w1"));
        assert!(service.has_fixed_worker());
        assert_eq!(service.price_label(), "30.00 EUR");
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = Service::new("s1", "b1", "Nothing", Decimal::ONE, "EUR", 0).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = Service::new("s1", "b1", "Refund", Decimal::new(-5, 0), "EUR", 30).unwrap_err();
        assert!(err.is_validation());

        assert!(Service::new("s2", "b1", "Free", Decimal::ZERO, "EUR", 30).is_ok());
    }
}
