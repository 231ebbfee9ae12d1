use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::domain::DomainError;

/// Opening window for a single weekday, in business-local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    open: NaiveTime,
    close: NaiveTime,
}

impl DayHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, DomainError> {
        if open >= close {
            return Err(DomainError::validation(format!(
                "opening time {} must be before closing time {}",
                open.format("%H:%M"),
                close.format("%H:%M")
            )));
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }
}

/// Per-weekday hours. A weekday without an entry is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatingHours {
    days: [Option<DayHours>; 7],
}

impl OperatingHours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same hours Monday through Sunday.
    pub fn every_day(hours: DayHours) -> Self {
        Self {
            days: [Some(hours); 7],
        }
    }

    pub fn with_day(mut self, weekday: Weekday, hours: DayHours) -> Self {
        self.set_day(weekday, Some(hours));
        self
    }

    pub fn set_day(&mut self, weekday: Weekday, hours: Option<DayHours>) {
        self.days[weekday.num_days_from_monday() as usize] = hours;
    }

    pub fn for_weekday(&self, weekday: Weekday) -> Option<DayHours> {
        self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn is_closed_all_week(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    id: String,
    name: String,
    category: String,
    hours: OperatingHours,
    timezone: Tz,
}

impl Business {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        timezone: Tz,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            hours: OperatingHours::new(),
            timezone,
        }
    }

    pub fn with_hours(mut self, hours: OperatingHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn hours(&self) -> &OperatingHours {
        &self.hours
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Hours that apply on `date` (a business-local calendar date).
    pub fn hours_on(&self, date: NaiveDate) -> Option<DayHours> {
        self.hours.for_weekday(date.weekday())
    }

    /// The calendar date of `now` as seen from the business's timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    /// UTC bounds `[start, end)` of the business-local calendar day `date`.
    pub fn day_window(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = date.succ_opt().unwrap_or(date);
        (self.local_midnight(date), self.local_midnight(next))
    }

    fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        self.timezone
            .from_local_datetime(&midnight)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}
