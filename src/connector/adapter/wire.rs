//! JSON shapes exchanged with the booking backend. Field names are camelCase.
//! The same shapes describe an offline catalog file.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Booking, BookingStatus, Business, DayHours, DomainError, OperatingHours, PaymentMethod,
    PaymentResult, PaymentStatus, Service, Worker,
};

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDto {
    pub id: String,
    pub name: String,
    pub category: String,
    /// IANA zone name. Missing means UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Weekdays without an entry are closed.
    #[serde(default)]
    pub hours: Vec<DayHoursDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHoursDto {
    /// `mon`, `tuesday`, ... (case-insensitive).
    pub weekday: String,
    /// `HH:MM`
    pub open: String,
    pub close: String,
}

impl BusinessDto {
    pub fn from_domain(business: &Business) -> Self {
        let hours = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter_map(|day| {
            business.hours().for_weekday(day).map(|h| DayHoursDto {
                weekday: day.to_string().to_lowercase(),
                open: h.open().format(TIME_FORMAT).to_string(),
                close: h.close().format(TIME_FORMAT).to_string(),
            })
        })
        .collect();

        Self {
            id: business.id().to_string(),
            name: business.name().to_string(),
            category: business.category().to_string(),
            timezone: Some(business.timezone().name().to_string()),
            hours,
        }
    }

    pub fn into_domain(self) -> Result<Business, DomainError> {
        let timezone = match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Tz::UTC,
            Some(name) => name.parse::<Tz>().map_err(|_| {
                DomainError::validation(format!("business {}: unknown timezone {}", self.id, name))
            })?,
        };

        let mut hours = OperatingHours::new();
        for entry in &self.hours {
            let weekday = entry.weekday.trim().parse::<Weekday>().map_err(|_| {
                DomainError::validation(format!(
                    "business {}: unknown weekday {}",
                    self.id, entry.weekday
                ))
            })?;
            let day = DayHours::new(parse_time(&self.id, &entry.open)?, parse_time(&self.id, &entry.close)?)?;
            hours.set_day(weekday, Some(day));
        }

        Ok(Business::new(self.id, self.name, self.category, timezone).with_hours(hours))
    }
}

fn parse_time(business_id: &str, value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        DomainError::validation(format!("business {}: invalid time {}", business_id, value))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDto {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl ServiceDto {
    pub fn from_domain(service: &Service) -> Self {
        Self {
            id: service.id().to_string(),
            name: service.name().to_string(),
            price: service.price(),
            duration_minutes: service.duration_minutes(),
            worker_id: service.worker_id().map(str::to_string),
            currency: Some(service.currency().to_string()),
        }
    }

    pub fn into_domain(self, business_id: &str, default_currency: &str) -> Result<Service, DomainError> {
        let currency = self
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| default_currency.to_string());
        let service = Service::new(
            self.id,
            business_id,
            self.name,
            self.price,
            currency,
            self.duration_minutes,
        )?;
        Ok(match self.worker_id {
            Some(worker_id) => service.with_worker(worker_id),
            None => service,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub service_ids: Vec<String>,
}

impl WorkerDto {
    pub fn from_domain(worker: &Worker) -> Self {
        Self {
            id: worker.id().to_string(),
            name: worker.name().to_string(),
            service_ids: worker.service_ids().iter().cloned().collect(),
        }
    }

    pub fn into_domain(self, business_id: &str) -> Worker {
        Worker::new(self.id, business_id, self.name, self.service_ids)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub worker_id: String,
    pub start: DateTime<Utc>,
}

/// A booking as returned by the backend. Creation responses may omit fields
/// that the request already determines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

impl BookingDto {
    pub fn from_domain(booking: &Booking) -> Self {
        Self {
            id: booking.id().to_string(),
            status: booking.status().as_str().to_string(),
            service_id: Some(booking.service_id().to_string()),
            worker_id: Some(booking.worker_id().to_string()),
            customer_id: Some(booking.customer_id().to_string()),
            start: Some(booking.start()),
            end: Some(booking.end()),
            payment_id: booking.payment_id().map(str::to_string),
        }
    }

    /// Fills fields a creation response left out from the request that produced it.
    pub fn into_created(
        mut self,
        service: &Service,
        worker_id: &str,
        start: DateTime<Utc>,
        customer_id: &str,
    ) -> Result<Booking, DomainError> {
        let start = *self.start.get_or_insert(start);
        self.end.get_or_insert(start + service.duration());
        self.service_id.get_or_insert_with(|| service.id().to_string());
        self.worker_id.get_or_insert_with(|| worker_id.to_string());
        self.customer_id.get_or_insert_with(|| customer_id.to_string());
        self.into_domain()
    }

    pub fn into_domain(self) -> Result<Booking, DomainError> {
        let id = self.id;
        let missing = |field: &str| DomainError::internal(format!("booking {} has no {}", id, field));
        let status = self.status.parse::<BookingStatus>()?;
        let service_id = self.service_id.ok_or_else(|| missing("serviceId"))?;
        let worker_id = self.worker_id.ok_or_else(|| missing("workerId"))?;
        let customer_id = self.customer_id.unwrap_or_default();
        let start = self.start.ok_or_else(|| missing("start"))?;
        let end = self.end.ok_or_else(|| missing("end"))?;

        Booking::reconstitute(
            id.to_string(),
            service_id,
            worker_id,
            customer_id,
            start,
            end,
            status,
            self.payment_id,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub booking_id: String,
    /// The payments API takes amounts as JSON numbers, like service prices.
    /// Two-decimal amounts round-trip exactly through f64 at these magnitudes.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub status: String,
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PaymentResponse {
    pub fn from_domain(result: &PaymentResult) -> Self {
        Self {
            id: result.payment_id.clone(),
            status: result.status.as_str().to_string(),
            message: result.message.clone(),
        }
    }

    pub fn into_domain(self) -> Result<PaymentResult, DomainError> {
        let status = self.status.parse::<PaymentStatus>()?;
        Ok(PaymentResult {
            payment_id: self.id,
            status,
            message: self.message,
        })
    }
}

/// One business with everything it offers, as stored in a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryDto {
    #[serde(flatten)]
    pub business: BusinessDto,
    #[serde(default)]
    pub services: Vec<ServiceDto>,
    #[serde(default)]
    pub workers: Vec<WorkerDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDto {
    #[serde(default)]
    pub businesses: Vec<CatalogEntryDto>,
}
