//! Shared catalog for use case tests: one barber shop open 09:00-19:00 UTC.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::connector::InMemoryBusinessDirectory;
use crate::domain::{Business, DayHours, OperatingHours, Service, Worker};

pub fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

/// Thursday 2026-03-05, 08:00 UTC.
pub fn now() -> DateTime<Utc> {
    at("2026-03-05T08:00:00Z")
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
}

pub fn shop() -> Business {
    let hours = DayHours::new(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
    )
    .unwrap();
    Business::new("b1", "Sharp Cuts", "barber", chrono_tz::UTC)
        .with_hours(OperatingHours::every_day(hours))
}

/// 45 minutes, 30.00 EUR, performed by w1 and w2.
pub fn haircut() -> Service {
    Service::new("s1", "b1", "Haircut", Decimal::new(3000, 2), "EUR", 45).unwrap()
}

/// 30 minutes, 20.00 EUR, only with w2.
pub fn beard_trim() -> Service {
    Service::new("s2", "b1", "Beard trim", Decimal::new(2000, 2), "EUR", 30)
        .unwrap()
        .with_worker("w2")
}

pub fn directory() -> Arc<InMemoryBusinessDirectory> {
    Arc::new(
        InMemoryBusinessDirectory::new()
            .with_business(shop())
            .with_business(Business::new("b2", "Calm Spa", "spa", chrono_tz::UTC))
            .with_service(haircut())
            .with_service(beard_trim())
            .with_worker(Worker::new("w1", "b1", "Ana", ["s1".to_string()]))
            .with_worker(Worker::new(
                "w2",
                "b1",
                "Ben",
                ["s1".to_string(), "s2".to_string()],
            )),
    )
}
