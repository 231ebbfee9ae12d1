use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::domain::{Booking, Business, DayHours, DomainError, Service, TimeSlot};

/// Grid granularity used when the caller does not pick one.
pub const DEFAULT_SLOT_STEP_MINUTES: u32 = 30;

/// Coarsest grid accepted: one slot per day.
pub const MAX_SLOT_STEP_MINUTES: u32 = 24 * 60;

/// Computes the offerable start times for one worker, service and date.
///
/// The output is a point-in-time snapshot: the booking store re-validates the
/// chosen slot on submission, since another client may book concurrently.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    date: NaiveDate,
    hours: Option<DayHours>,
    timezone: Tz,
    duration_minutes: u32,
    step_minutes: u32,
    now: DateTime<Utc>,
    busy: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

impl SlotGenerator {
    pub fn new(business: &Business, service: &Service, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            date,
            hours: business.hours_on(date),
            timezone: business.timezone(),
            duration_minutes: service.duration_minutes(),
            step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            now,
            busy: Vec::new(),
        }
    }

    pub fn with_step(mut self, step_minutes: u32) -> Result<Self, DomainError> {
        if step_minutes == 0 {
            return Err(DomainError::validation("slot step must be at least one minute"));
        }
        if step_minutes > MAX_SLOT_STEP_MINUTES {
            return Err(DomainError::validation(format!(
                "slot step must be at most {} minutes, got {}",
                MAX_SLOT_STEP_MINUTES, step_minutes
            )));
        }
        self.step_minutes = step_minutes;
        Ok(self)
    }

    /// Registers the worker's existing bookings. Only pending and confirmed
    /// bookings of `worker_id` block time.
    pub fn with_bookings<'a>(
        mut self,
        worker_id: &str,
        bookings: impl IntoIterator<Item = &'a Booking>,
    ) -> Self {
        self.busy.extend(
            bookings
                .into_iter()
                .filter(|b| b.worker_id() == worker_id && b.reserves_slot())
                .map(|b| (b.start(), b.end())),
        );
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    /// Available slots in ascending order. Calling again restarts the sequence.
    pub fn slots(&self) -> Slots<'_> {
        Slots::new(self, false)
    }

    /// Every grid slot, with taken or past ones marked unavailable.
    pub fn grid(&self) -> Slots<'_> {
        Slots::new(self, true)
    }

    fn is_today(&self) -> bool {
        self.now.with_timezone(&self.timezone).date_naive() == self.date
    }

    fn is_busy(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.busy.iter().any(|(b_start, b_end)| start < *b_end && *b_start < end)
    }

    fn to_instant(&self, minute_of_day: u32) -> Option<DateTime<Utc>> {
        let time = NaiveTime::from_num_seconds_from_midnight_opt(minute_of_day * 60, 0)?;
        // Wall-clock times inside a DST gap have no instant and are skipped.
        self.timezone
            .from_local_datetime(&self.date.and_time(time))
            .earliest()
            .map(|t| t.with_timezone(&Utc))
    }

    fn close_instant(&self, hours: &DayHours) -> Option<DateTime<Utc>> {
        self.timezone
            .from_local_datetime(&self.date.and_time(hours.close()))
            .latest()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl<'a> IntoIterator for &'a SlotGenerator {
    type Item = TimeSlot;
    type IntoIter = Slots<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots()
    }
}

/// Lazy, finite iterator over the slot grid of a [`SlotGenerator`].
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    generator: &'a SlotGenerator,
    include_unavailable: bool,
    is_today: bool,
    close: Option<DateTime<Utc>>,
    cursor: Option<u32>,
    last_start: Option<u32>,
}

impl<'a> Slots<'a> {
    fn new(generator: &'a SlotGenerator, include_unavailable: bool) -> Self {
        let (cursor, last_start, close) = match generator.hours {
            Some(hours) => {
                let open = minute_of_day(hours.open());
                let close_minute = minute_of_day(hours.close());
                let last_start = close_minute
                    .checked_sub(generator.duration_minutes)
                    .filter(|last| *last >= open);
                (Some(open), last_start, generator.close_instant(&hours))
            }
            None => (None, None, None),
        };

        Self {
            generator,
            include_unavailable,
            is_today: generator.is_today(),
            close,
            cursor,
            last_start,
        }
    }
}

impl Iterator for Slots<'_> {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        let last_start = self.last_start?;
        let duration = Duration::minutes(i64::from(self.generator.duration_minutes));

        while let Some(minute) = self.cursor.filter(|m| *m <= last_start) {
            self.cursor = minute.checked_add(self.generator.step_minutes);

            let Some(start) = self.generator.to_instant(minute) else {
                continue;
            };
            let slot = TimeSlot::new(start, duration);
            if self.close.is_some_and(|close| slot.end() > close) {
                continue;
            }

            let taken = self.generator.is_busy(slot.start(), slot.end());
            let past = self.is_today && slot.start() <= self.generator.now;

            if !taken && !past {
                return Some(slot);
            }
            if self.include_unavailable {
                return Some(slot.unavailable());
            }
        }

        None
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
