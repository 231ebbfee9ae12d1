use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Full price captured online.
    Online,
    /// Settled at the venue; no capture call.
    Cash,
    /// Partial prepayment between 10% and 100% of the price.
    Deposit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Deposit => "deposit",
        }
    }

    pub fn requires_capture(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(PaymentMethod::Online),
            "cash" => Ok(PaymentMethod::Cash),
            "deposit" => Ok(PaymentMethod::Deposit),
            other => Err(DomainError::validation(format!(
                "unknown payment method '{}' (expected online, cash or deposit)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Captured,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, PaymentStatus::Captured | PaymentStatus::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "captured" | "succeeded" => Ok(PaymentStatus::Captured),
            "failed" | "declined" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::internal(format!(
                "unknown payment status '{}'",
                other
            ))),
        }
    }
}

/// What a gateway reports back for one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub message: Option<String>,
}

impl PaymentResult {
    pub fn captured(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: payment_id.into(),
            status: PaymentStatus::Captured,
            message: None,
        }
    }

    pub fn failed(payment_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            payment_id: payment_id.into(),
            status: PaymentStatus::Failed,
            message: Some(message.into()),
        }
    }

    pub fn is_captured(&self) -> bool {
        self.status == PaymentStatus::Captured
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: String,
    booking_id: String,
    amount: Decimal,
    method: PaymentMethod,
    status: PaymentStatus,
}

impl Payment {
    pub fn new(booking_id: impl Into<String>, amount: Decimal, method: PaymentMethod) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.into(),
            amount,
            method,
            status: PaymentStatus::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn booking_id(&self) -> &str {
        &self.booking_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Records the gateway outcome. Captured and failed payments are immutable.
    pub fn record(&mut self, result: &PaymentResult) -> Result<(), DomainError> {
        if self.status.is_final() {
            return Err(DomainError::internal(format!(
                "payment {} is already {}",
                self.id, self.status
            )));
        }
        if !result.payment_id.is_empty() {
            self.id = result.payment_id.clone();
        }
        self.status = result.status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_is_immutable_once_final() {
        let mut payment = Payment::new("bk1", Decimal::new(30, 0), PaymentMethod::Online);
        assert_eq!(payment.status(), PaymentStatus::Pending);

        payment.record(&PaymentResult::captured("pay_1")).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Captured);
        assert_eq!(payment.id(), "pay_1");

        let err = payment
            .record(&PaymentResult::failed("pay_1", "late decline"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(payment.status(), PaymentStatus::Captured);
    }

    #[test]
    fn test_pending_result_keeps_payment_open() {
        let mut payment = Payment::new("bk1", Decimal::new(30, 0), PaymentMethod::Deposit);
        payment
            .record(&PaymentResult {
                payment_id: "pay_2".to_string(),
                status: PaymentStatus::Pending,
                message: None,
            })
            .unwrap();

        assert!(payment.record(&PaymentResult::captured("pay_2")).is_ok());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("Online".parse::<PaymentMethod>().unwrap(), PaymentMethod::Online);
        assert_eq!("deposit".parse::<PaymentMethod>().unwrap(), PaymentMethod::Deposit);
        assert!("card".parse::<PaymentMethod>().unwrap_err().is_validation());
        assert!(!PaymentMethod::Cash.requires_capture());
        assert!(PaymentMethod::Online.requires_capture());
    }
}
