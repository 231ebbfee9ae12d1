use rust_decimal::Decimal;

use crate::domain::{DomainError, PaymentMethod};

/// Smallest deposit accepted, as a fraction of the service price (0.10).
pub const DEPOSIT_MIN_RATIO: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Inclusive `(min, max)` deposit range for `price`.
pub fn deposit_bounds(price: Decimal) -> (Decimal, Decimal) {
    (price * DEPOSIT_MIN_RATIO, price)
}

/// Checks `amount` against the rules for `method` before anything is sent to a gateway.
///
/// - `Online` settles the full price, so the amount must equal it.
/// - `Deposit` accepts any amount in `[0.10 * price, price]`.
/// - `Cash` is held to the full price as well. This is a local policy: cash is
///   settled at the venue, and rejecting other amounts keeps what the booking
///   shows consistent with the price.
pub fn validate_payment_amount(
    method: PaymentMethod,
    amount: Decimal,
    price: Decimal,
) -> Result<Decimal, DomainError> {
    if amount < Decimal::ZERO {
        return Err(DomainError::validation(format!(
            "payment amount must not be negative, got {}",
            amount
        )));
    }

    match method {
        PaymentMethod::Online | PaymentMethod::Cash => {
            if amount != price {
                return Err(DomainError::validation(format!(
                    "{} payments must cover the full price {}, got {}",
                    method, price, amount
                )));
            }
        }
        PaymentMethod::Deposit => {
            let (min, max) = deposit_bounds(price);
            if amount < min || amount > max {
                return Err(DomainError::validation(format!(
                    "deposit must be between {} and {}, got {}",
                    min.normalize(),
                    max.normalize(),
                    amount
                )));
            }
        }
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_deposit_boundaries_are_inclusive() {
        let price = dec("40.00");

        assert!(validate_payment_amount(PaymentMethod::Deposit, dec("4.00"), price).is_ok());
        assert!(validate_payment_amount(PaymentMethod::Deposit, dec("40.00"), price).is_ok());
        assert!(validate_payment_amount(PaymentMethod::Deposit, dec("20"), price).is_ok());
    }

    #[test]
    fn test_deposit_outside_range_rejected() {
        let price = dec("40.00");

        let below = validate_payment_amount(PaymentMethod::Deposit, dec("3.99"), price);
        let above = validate_payment_amount(PaymentMethod::Deposit, dec("40.01"), price);

        assert!(below.unwrap_err().is_validation());
        assert!(above.unwrap_err().is_validation());
    }

    #[test]
    fn test_online_requires_full_price() {
        let price = dec("25.50");

        assert!(validate_payment_amount(PaymentMethod::Online, dec("25.5"), price).is_ok());
        assert!(validate_payment_amount(PaymentMethod::Online, dec("25.49"), price)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_cash_held_to_full_price() {
        let price = dec("25.50");

        assert_eq!(validate_payment_amount(PaymentMethod::Cash, price, price).unwrap(), price);
        assert!(validate_payment_amount(PaymentMethod::Cash, dec("10"), price)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = validate_payment_amount(PaymentMethod::Deposit, dec("-1"), dec("0")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_deposit_bounds() {
        let (min, max) = deposit_bounds(dec("35"));
        assert_eq!(min, dec("3.5"));
        assert_eq!(max, dec("35"));
    }
}
