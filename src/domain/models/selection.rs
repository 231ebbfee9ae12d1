use std::fmt;

use chrono::NaiveDate;

use super::TimeSlot;

/// Position in the dependent selection chain, upstream first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainLevel {
    Category,
    Business,
    Service,
    Worker,
    Date,
    Slot,
}

impl ChainLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainLevel::Category => "category",
            ChainLevel::Business => "business",
            ChainLevel::Service => "service",
            ChainLevel::Worker => "worker",
            ChainLevel::Date => "date",
            ChainLevel::Slot => "slot",
        }
    }
}

impl fmt::Display for ChainLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's current choices. Every write goes through [`Selection::invalidate_after`]
/// so a downstream value can never outlive a change upstream of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    category: Option<String>,
    business_id: Option<String>,
    service_id: Option<String>,
    worker_id: Option<String>,
    date: Option<NaiveDate>,
    slot: Option<TimeSlot>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn business_id(&self) -> Option<&str> {
        self.business_id.as_deref()
    }

    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    pub fn worker_id(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn slot(&self) -> Option<&TimeSlot> {
        self.slot.as_ref()
    }

    /// The most upstream level that is still unset.
    pub fn first_missing(&self) -> Option<ChainLevel> {
        if self.category.is_none() {
            Some(ChainLevel::Category)
        } else if self.business_id.is_none() {
            Some(ChainLevel::Business)
        } else if self.service_id.is_none() {
            Some(ChainLevel::Service)
        } else if self.worker_id.is_none() {
            Some(ChainLevel::Worker)
        } else if self.date.is_none() {
            Some(ChainLevel::Date)
        } else if self.slot.is_none() {
            Some(ChainLevel::Slot)
        } else {
            None
        }
    }

    pub fn has_all_levels(&self) -> bool {
        self.first_missing().is_none()
    }

    /// Clears every level strictly downstream of `level`.
    pub fn invalidate_after(&mut self, level: ChainLevel) {
        if level < ChainLevel::Business {
            self.business_id = None;
        }
        if level < ChainLevel::Service {
            self.service_id = None;
        }
        if level < ChainLevel::Worker {
            self.worker_id = None;
        }
        if level < ChainLevel::Date {
            self.date = None;
        }
        if level < ChainLevel::Slot {
            self.slot = None;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn set_category(&mut self, category: String) {
        self.invalidate_after(ChainLevel::Category);
        self.category = Some(category);
    }

    pub(crate) fn set_business(&mut self, business_id: String) {
        self.invalidate_after(ChainLevel::Business);
        self.business_id = Some(business_id);
    }

    pub(crate) fn set_service(&mut self, service_id: String) {
        self.invalidate_after(ChainLevel::Service);
        self.service_id = Some(service_id);
    }

    pub(crate) fn set_worker(&mut self, worker_id: String) {
        self.invalidate_after(ChainLevel::Worker);
        self.worker_id = Some(worker_id);
    }

    pub(crate) fn set_date(&mut self, date: NaiveDate) {
        self.invalidate_after(ChainLevel::Date);
        self.date = Some(date);
    }

    pub(crate) fn set_slot(&mut self, slot: TimeSlot) {
        self.slot = Some(slot);
    }

    pub(crate) fn clear_slot(&mut self) {
        self.invalidate_after(ChainLevel::Date);
    }
}
