use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::application::{BookingStore, BusinessDirectory};
use crate::domain::{
    Business, ChainLevel, DomainError, Selection, Service, SessionContext, SlotGenerator, TimeSlot,
    Worker, DEFAULT_SLOT_STEP_MINUTES,
};

/// A complete, mutually consistent selection ready for submission.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSelection<'a> {
    pub business: &'a Business,
    pub service: &'a Service,
    pub worker: &'a Worker,
    pub date: NaiveDate,
    pub slot: &'a TimeSlot,
}

/// Walks the category → business → service → worker → date → slot chain.
///
/// Candidate sets come from the [`BusinessDirectory`]; every upstream change
/// invalidates what was chosen downstream of it, including the cached slot
/// snapshot.
pub struct SelectionResolver {
    directory: Arc<dyn BusinessDirectory>,
    selection: Selection,
    businesses: Vec<Business>,
    services: Vec<Service>,
    workers: Vec<Worker>,
    offered: Option<Vec<TimeSlot>>,
    step_minutes: u32,
}

impl SelectionResolver {
    pub fn new(directory: Arc<dyn BusinessDirectory>) -> Self {
        Self {
            directory,
            selection: Selection::new(),
            businesses: Vec::new(),
            services: Vec::new(),
            workers: Vec::new(),
            offered: None,
            step_minutes: DEFAULT_SLOT_STEP_MINUTES,
        }
    }

    pub fn with_step(mut self, step_minutes: u32) -> Self {
        self.step_minutes = step_minutes;
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn business(&self) -> Option<&Business> {
        let id = self.selection.business_id()?;
        self.businesses.iter().find(|b| b.id() == id)
    }

    pub fn service(&self) -> Option<&Service> {
        let id = self.selection.service_id()?;
        self.services.iter().find(|s| s.id() == id)
    }

    pub fn worker(&self) -> Option<&Worker> {
        let id = self.selection.worker_id()?;
        self.workers.iter().find(|w| w.id() == id)
    }

    /// Workers allowed to perform the selected service.
    pub fn candidate_workers(&self) -> Vec<&Worker> {
        match self.service() {
            Some(service) => self
                .workers
                .iter()
                .filter(|w| worker_can_perform(w, service))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The last slot snapshot, if one is current.
    pub fn offered_slots(&self) -> Option<&[TimeSlot]> {
        self.offered.as_deref()
    }

    pub async fn set_category(&mut self, category: &str) -> Result<(), DomainError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(DomainError::validation("category must not be empty"));
        }

        let businesses = self.directory.list_businesses(category).await?;
        debug!("Category {} has {} businesses", category, businesses.len());

        self.selection.set_category(category.to_string());
        self.businesses = businesses;
        self.invalidate_candidates(ChainLevel::Category);
        Ok(())
    }

    pub async fn set_business(&mut self, business_id: &str) -> Result<(), DomainError> {
        let category = self.require(ChainLevel::Category)?;
        let business = self
            .businesses
            .iter()
            .find(|b| b.id() == business_id && b.category().eq_ignore_ascii_case(category))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "business {} is not offered in category {}",
                    business_id, category
                ))
            })?;
        let business_id = business.id().to_string();

        let services = self.directory.get_services(&business_id).await?;
        let workers = self.directory.get_workers(&business_id).await?;
        debug!(
            "Business {} offers {} services with {} workers",
            business_id,
            services.len(),
            workers.len()
        );

        self.selection.set_business(business_id.clone());
        self.invalidate_candidates(ChainLevel::Business);
        self.services = services
            .into_iter()
            .filter(|s| s.business_id() == business_id)
            .collect();
        self.workers = workers
            .into_iter()
            .filter(|w| w.business_id() == business_id)
            .collect();
        Ok(())
    }

    /// Selects a service. A service bound to one worker selects that worker too.
    pub fn set_service(&mut self, service_id: &str) -> Result<(), DomainError> {
        let business_id = self.require(ChainLevel::Business)?;
        let service = self
            .services
            .iter()
            .find(|s| s.id() == service_id)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "service {} is not offered by business {}",
                    service_id, business_id
                ))
            })?;

        let fixed_worker = match service.worker_id() {
            Some(worker_id) => {
                if !self.workers.iter().any(|w| w.id() == worker_id) {
                    return Err(DomainError::validation(format!(
                        "service {} is bound to worker {}, who is not listed for business {}",
                        service_id, worker_id, business_id
                    )));
                }
                Some(worker_id.to_string())
            }
            None => None,
        };

        self.selection.set_service(service_id.to_string());
        self.invalidate_candidates(ChainLevel::Service);
        if let Some(worker_id) = fixed_worker {
            debug!("Service {} auto-selects worker {}", service_id, worker_id);
            self.selection.set_worker(worker_id);
        }
        Ok(())
    }

    pub fn set_worker(&mut self, worker_id: &str) -> Result<(), DomainError> {
        self.require(ChainLevel::Service)?;
        let service = self
            .service()
            .ok_or_else(|| DomainError::validation("selected service is no longer offered"))?;
        let worker = self
            .workers
            .iter()
            .find(|w| w.id() == worker_id)
            .filter(|w| worker_can_perform(w, service))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "worker {} is not assigned to service {}",
                    worker_id,
                    service.id()
                ))
            })?;
        let worker_id = worker.id().to_string();

        self.selection.set_worker(worker_id);
        self.invalidate_candidates(ChainLevel::Worker);
        Ok(())
    }

    /// Picks the booking date. Dates before "today" in the business's
    /// timezone are rejected.
    pub fn set_date(&mut self, date: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require(ChainLevel::Worker)?;
        let business = self
            .business()
            .ok_or_else(|| DomainError::validation("selected business is no longer listed"))?;

        let today = business.today(now);
        if date < today {
            return Err(DomainError::validation(format!(
                "date {} is in the past for {} (today is {})",
                date,
                business.name(),
                today
            )));
        }

        self.selection.set_date(date);
        self.invalidate_candidates(ChainLevel::Date);
        Ok(())
    }

    /// A generator for the current business, service and date, without bookings.
    pub fn slot_generator(&self, now: DateTime<Utc>) -> Result<SlotGenerator, DomainError> {
        let date = self
            .selection
            .date()
            .ok_or_else(|| missing(ChainLevel::Date))?;
        let business = self.business().ok_or_else(|| missing(ChainLevel::Business))?;
        let service = self.service().ok_or_else(|| missing(ChainLevel::Service))?;

        SlotGenerator::new(business, service, date, now).with_step(self.step_minutes)
    }

    /// Fetches the worker's bookings for the selected date and takes a fresh
    /// slot snapshot. A previously chosen slot survives only if it is still offered.
    pub async fn load_slots(
        &mut self,
        store: &dyn BookingStore,
        ctx: &SessionContext,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        let generator = self.slot_generator(now)?;
        let worker_id = self.require(ChainLevel::Worker)?.to_string();
        let business = self.business().ok_or_else(|| missing(ChainLevel::Business))?;
        let (from, to) = business.day_window(generator.date());

        let bookings = store.list_bookings(&worker_id, from, to, ctx).await?;
        let generator = generator.with_bookings(&worker_id, &bookings);
        let slots: Vec<TimeSlot> = generator.slots().collect();

        info!(
            "Worker {} has {} open slots on {} ({} existing bookings)",
            worker_id,
            slots.len(),
            generator.date(),
            bookings.len()
        );

        if let Some(chosen) = self.selection.slot() {
            if !slots.iter().any(|s| s.start() == chosen.start()) {
                self.selection.clear_slot();
            }
        }
        self.offered = Some(slots.clone());
        Ok(slots)
    }

    /// Chooses a start from the current snapshot.
    pub fn set_slot(&mut self, start: DateTime<Utc>) -> Result<(), DomainError> {
        if self.selection.date().is_none() {
            return Err(missing(ChainLevel::Date));
        }
        let offered = self.offered.as_ref().ok_or_else(|| {
            DomainError::validation("no current slot snapshot; load slots before choosing one")
        })?;
        let slot = offered
            .iter()
            .find(|s| s.start() == start && s.is_available())
            .copied()
            .ok_or_else(|| {
                DomainError::validation(format!("{} is not among the offered slots", start))
            })?;

        self.selection.set_slot(slot);
        Ok(())
    }

    /// Drops the chosen slot and the snapshot it came from, forcing a fresh
    /// [`load_slots`](Self::load_slots) before another slot can be chosen.
    pub fn invalidate_slots(&mut self) {
        self.selection.clear_slot();
        self.offered = None;
    }

    /// Abandons the whole selection. Nothing is sent anywhere.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.businesses.clear();
        self.invalidate_candidates(ChainLevel::Category);
    }

    pub fn is_complete(&self) -> bool {
        self.resolve().is_ok()
    }

    /// Checks that every level is set and that the levels agree with each other.
    pub fn resolve(&self) -> Result<ResolvedSelection<'_>, DomainError> {
        if let Some(level) = self.selection.first_missing() {
            return Err(missing(level));
        }

        let category = self.require(ChainLevel::Category)?;
        let business = self
            .business()
            .filter(|b| b.category().eq_ignore_ascii_case(category))
            .ok_or_else(|| DomainError::validation("selected business does not match the category"))?;
        let service = self
            .service()
            .filter(|s| s.business_id() == business.id())
            .ok_or_else(|| DomainError::validation("selected service does not belong to the business"))?;
        let worker = self
            .worker()
            .filter(|w| w.business_id() == business.id() && worker_can_perform(w, service))
            .ok_or_else(|| DomainError::validation("selected worker cannot perform the service"))?;
        let date = self.selection.date().ok_or_else(|| missing(ChainLevel::Date))?;
        let slot = self.selection.slot().ok_or_else(|| missing(ChainLevel::Slot))?;

        let offered = self
            .offered
            .as_ref()
            .is_some_and(|slots| slots.iter().any(|s| s.start() == slot.start()));
        if !offered {
            return Err(DomainError::validation("selected slot is not in the current snapshot"));
        }
        if slot.duration() != service.duration() {
            return Err(DomainError::validation("selected slot does not match the service duration"));
        }
        if slot.start().with_timezone(&business.timezone()).date_naive() != date {
            return Err(DomainError::validation("selected slot is not on the selected date"));
        }

        Ok(ResolvedSelection {
            business,
            service,
            worker,
            date,
            slot,
        })
    }

    fn require(&self, level: ChainLevel) -> Result<&str, DomainError> {
        let value = match level {
            ChainLevel::Category => self.selection.category(),
            ChainLevel::Business => self.selection.business_id(),
            ChainLevel::Service => self.selection.service_id(),
            ChainLevel::Worker => self.selection.worker_id(),
            ChainLevel::Date | ChainLevel::Slot => None,
        };
        value.ok_or_else(|| missing(level))
    }

    /// Drops candidate sets and snapshots that depend on `level`.
    fn invalidate_candidates(&mut self, level: ChainLevel) {
        if level < ChainLevel::Business {
            self.services.clear();
            self.workers.clear();
        }
        if level < ChainLevel::Slot {
            self.offered = None;
        }
    }
}

fn worker_can_perform(worker: &Worker, service: &Service) -> bool {
    match service.worker_id() {
        Some(fixed) => worker.id() == fixed,
        None => worker.is_assigned_to(service.id()),
    }
}

fn missing(level: ChainLevel) -> DomainError {
    DomainError::validation(format!("selection is incomplete: no {} chosen", level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fixtures::{at, directory, haircut, now, today};
    use crate::connector::InMemoryBookingStore;
    use crate::domain::Booking;

    async fn resolver_at_worker(service: &str, worker: Option<&str>) -> SelectionResolver {
        let mut resolver = SelectionResolver::new(directory());
        resolver.set_category("barber").await.unwrap();
        resolver.set_business("b1").await.unwrap();
        resolver.set_service(service).unwrap();
        if let Some(worker) = worker {
            resolver.set_worker(worker).unwrap();
        }
        resolver
    }

    #[tokio::test]
    async fn test_category_lists_its_businesses() {
        let mut resolver = SelectionResolver::new(directory());
        resolver.set_category(" barber ").await.unwrap();

        assert_eq!(resolver.selection().category(), Some("barber"));
        assert_eq!(resolver.businesses().len(), 1);
        assert!(resolver.set_category("  ").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_business_must_belong_to_category() {
        let mut resolver = SelectionResolver::new(directory());
        resolver.set_category("barber").await.unwrap();

        assert!(resolver.set_business("b2").await.unwrap_err().is_validation());
        resolver.set_business("b1").await.unwrap();
        assert_eq!(resolver.services().len(), 2);
        assert_eq!(resolver.workers().len(), 2);
    }

    #[tokio::test]
    async fn test_business_requires_category() {
        let mut resolver = SelectionResolver::new(directory());
        assert!(resolver.set_business("b1").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_fixed_worker_service_selects_worker() {
        let resolver = resolver_at_worker("s2", None).await;
        assert_eq!(resolver.selection().worker_id(), Some("w2"));
    }

    #[tokio::test]
    async fn test_fixed_worker_service_rejects_other_worker() {
        let mut resolver = resolver_at_worker("s2", None).await;

        assert!(resolver.set_worker("w1").unwrap_err().is_validation());
        assert_eq!(resolver.selection().worker_id(), Some("w2"));
    }

    #[tokio::test]
    async fn test_free_service_needs_worker_choice() {
        let mut resolver = resolver_at_worker("s1", None).await;

        assert!(resolver.selection().worker_id().is_none());
        assert_eq!(resolver.candidate_workers().len(), 2);
        resolver.set_worker("w1").unwrap();
        assert!(resolver.set_worker("w9").unwrap_err().is_validation());
        // A rejected choice keeps the previous one.
        assert_eq!(resolver.selection().worker_id(), Some("w1"));
    }

    #[tokio::test]
    async fn test_past_date_rejected() {
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;

        let yesterday = today().pred_opt().unwrap();
        assert!(resolver.set_date(yesterday, now()).unwrap_err().is_validation());
        resolver.set_date(today(), now()).unwrap();
    }

    #[tokio::test]
    async fn test_load_slots_excludes_booked_interval() {
        let existing = Booking::pending(&haircut(), "w1", "someone", at("2026-03-05T10:00:00Z"));
        let store = InMemoryBookingStore::with_bookings([existing]);
        let ctx = SessionContext::new("c1");
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;
        resolver.set_date(today(), now()).unwrap();

        let slots = resolver.load_slots(&store, &ctx, now()).await.unwrap();
        let starts: Vec<_> = slots.iter().map(|s| s.start()).collect();

        assert!(starts.contains(&at("2026-03-05T09:00:00Z")));
        for taken in ["09:30", "10:00", "10:30"] {
            let start = at(&format!("2026-03-05T{taken}:00Z"));
            assert!(!starts.contains(&start), "{taken} should be taken");
        }
        assert!(starts.contains(&at("2026-03-05T11:00:00Z")));
        assert_eq!(resolver.offered_slots().map(<[TimeSlot]>::len), Some(slots.len()));
    }

    #[tokio::test]
    async fn test_set_slot_requires_snapshot() {
        let store = InMemoryBookingStore::new();
        let ctx = SessionContext::new("c1");
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;
        resolver.set_date(today(), now()).unwrap();

        assert!(resolver.set_slot(at("2026-03-05T09:00:00Z")).unwrap_err().is_validation());

        resolver.load_slots(&store, &ctx, now()).await.unwrap();
        assert!(resolver.set_slot(at("2026-03-05T09:10:00Z")).unwrap_err().is_validation());
        resolver.set_slot(at("2026-03-05T09:00:00Z")).unwrap();

        let resolved = resolver.resolve().unwrap();
        assert_eq!(resolved.worker.id(), "w1");
        assert_eq!(resolved.slot.start(), at("2026-03-05T09:00:00Z"));
        assert!(resolver.is_complete());
    }

    #[tokio::test]
    async fn test_upstream_change_clears_downstream() {
        let store = InMemoryBookingStore::new();
        let ctx = SessionContext::new("c1");
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;
        resolver.set_date(today(), now()).unwrap();
        resolver.load_slots(&store, &ctx, now()).await.unwrap();
        resolver.set_slot(at("2026-03-05T09:00:00Z")).unwrap();

        resolver.set_service("s2").unwrap();

        assert_eq!(resolver.selection().worker_id(), Some("w2"));
        assert!(resolver.selection().date().is_none());
        assert!(resolver.selection().slot().is_none());
        assert!(resolver.offered_slots().is_none());
        assert!(!resolver.is_complete());
    }

    #[tokio::test]
    async fn test_date_change_drops_snapshot() {
        let store = InMemoryBookingStore::new();
        let ctx = SessionContext::new("c1");
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;
        resolver.set_date(today(), now()).unwrap();
        resolver.load_slots(&store, &ctx, now()).await.unwrap();

        resolver.set_date(today().succ_opt().unwrap(), now()).unwrap();

        assert!(resolver.offered_slots().is_none());
        assert!(resolver.set_slot(at("2026-03-06T09:00:00Z")).is_err());
    }

    #[tokio::test]
    async fn test_reload_drops_slot_taken_meanwhile() {
        let store = InMemoryBookingStore::new();
        let ctx = SessionContext::new("c1");
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;
        resolver.set_date(today(), now()).unwrap();
        resolver.load_slots(&store, &ctx, now()).await.unwrap();
        resolver.set_slot(at("2026-03-05T09:00:00Z")).unwrap();

        store
            .create_booking(&haircut(), "w1", at("2026-03-05T09:00:00Z"), &SessionContext::new("other"))
            .await
            .unwrap();
        resolver.load_slots(&store, &ctx, now()).await.unwrap();

        assert!(resolver.selection().slot().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_slots_forces_reload() {
        let store = InMemoryBookingStore::new();
        let ctx = SessionContext::new("c1");
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;
        resolver.set_date(today(), now()).unwrap();
        resolver.load_slots(&store, &ctx, now()).await.unwrap();
        resolver.set_slot(at("2026-03-05T09:00:00Z")).unwrap();

        resolver.invalidate_slots();

        assert!(resolver.selection().slot().is_none());
        assert!(resolver.set_slot(at("2026-03-05T09:00:00Z")).is_err());
        assert_eq!(resolver.selection().date(), Some(today()));
    }

    #[tokio::test]
    async fn test_reset_abandons_everything() {
        let mut resolver = resolver_at_worker("s1", Some("w1")).await;
        resolver.reset();

        assert!(resolver.selection().category().is_none());
        assert!(resolver.businesses().is_empty());
        assert!(resolver.services().is_empty());
        assert_eq!(resolver.selection().first_missing(), Some(ChainLevel::Category));
    }
}
