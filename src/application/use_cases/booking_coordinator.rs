use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::application::{BookingStore, PaymentGateway, SelectionResolver};
use crate::domain::{
    validate_payment_amount, Booking, DomainError, Payment, PaymentMethod, PaymentResult,
    PaymentStatus, Service, SessionContext,
};

/// What the caller asked to book and how it will be paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub service: Service,
    pub worker_id: String,
    pub start: DateTime<Utc>,
    pub method: PaymentMethod,
    pub amount: Decimal,
}

/// Phase of one booking attempt.
///
/// `Idle → Submitting → Created → PaymentPending → Confirmed | Cancelled | Failed`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BookingPhase {
    #[default]
    Idle,
    Submitting {
        request: BookingRequest,
    },
    Created {
        booking: Booking,
        payment: Payment,
    },
    PaymentPending {
        booking: Booking,
        payment: Payment,
    },
    Confirmed {
        booking: Booking,
        payment: Payment,
    },
    Cancelled {
        booking: Booking,
        payment: Option<Payment>,
    },
    Failed {
        booking: Option<Booking>,
        payment: Option<Payment>,
        error: DomainError,
        /// The capture outcome is unknown, so the same payment may be retried.
        payment_retryable: bool,
    },
}

impl BookingPhase {
    pub fn name(&self) -> &'static str {
        match self {
            BookingPhase::Idle => "idle",
            BookingPhase::Submitting { .. } => "submitting",
            BookingPhase::Created { .. } => "created",
            BookingPhase::PaymentPending { .. } => "payment_pending",
            BookingPhase::Confirmed { .. } => "confirmed",
            BookingPhase::Cancelled { .. } => "cancelled",
            BookingPhase::Failed { .. } => "failed",
        }
    }

    /// A collaborator call is outstanding for this attempt.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            BookingPhase::Submitting { .. }
                | BookingPhase::Created { .. }
                | BookingPhase::PaymentPending { .. }
        )
    }

    pub fn booking(&self) -> Option<&Booking> {
        match self {
            BookingPhase::Created { booking, .. }
            | BookingPhase::PaymentPending { booking, .. }
            | BookingPhase::Confirmed { booking, .. }
            | BookingPhase::Cancelled { booking, .. } => Some(booking),
            BookingPhase::Failed { booking, .. } => booking.as_ref(),
            BookingPhase::Idle | BookingPhase::Submitting { .. } => None,
        }
    }

    pub fn payment(&self) -> Option<&Payment> {
        match self {
            BookingPhase::Created { payment, .. }
            | BookingPhase::PaymentPending { payment, .. }
            | BookingPhase::Confirmed { payment, .. } => Some(payment),
            BookingPhase::Cancelled { payment, .. } | BookingPhase::Failed { payment, .. } => {
                payment.as_ref()
            }
            BookingPhase::Idle | BookingPhase::Submitting { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DomainError> {
        match self {
            BookingPhase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// A booking exists server-side that still reserves its slot.
    fn holds_reservation(&self) -> bool {
        match self {
            BookingPhase::Failed {
                booking: Some(_), ..
            } => true,
            BookingPhase::Confirmed { .. } => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingEvent {
    Submit(BookingRequest),
    BookingCreated(Booking),
    BookingRejected(DomainError),
    BeginPayment,
    CaptureSucceeded(PaymentResult),
    CaptureDeclined(PaymentResult),
    /// Transport failure or timeout; the gateway may or may not have captured.
    CaptureUnknown(DomainError),
    CashAcknowledged,
    RetryPayment,
    CancelRequested,
    BookingCancelled(Booking),
    /// The task driving an in-flight phase went away before it settled.
    DriverDropped,
}

/// Side effect the driver performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    CreateBooking(BookingRequest),
    BeginPayment,
    CapturePayment {
        booking_id: String,
        amount: Decimal,
        method: PaymentMethod,
    },
    AcknowledgeCash,
    CancelBooking {
        booking_id: String,
    },
}

/// The state machine: `(phase, event) → (phase, effect)`. Performs no I/O.
pub fn transition(
    phase: &BookingPhase,
    event: BookingEvent,
) -> Result<(BookingPhase, Effect), DomainError> {
    use BookingEvent as E;
    use BookingPhase as P;

    match (phase, event) {
        (p, E::Submit(_)) if p.is_in_flight() => Err(DomainError::InProgress),
        (P::Confirmed { booking, .. }, E::Submit(_)) => Err(DomainError::validation(format!(
            "booking {} is already confirmed; reset the session to book again",
            booking.id()
        ))),
        (p, E::Submit(_)) if p.holds_reservation() => {
            let booking_id = p.booking().map(Booking::id).unwrap_or_default();
            Err(DomainError::validation(format!(
                "booking {} still holds its slot; cancel it before submitting again",
                booking_id
            )))
        }
        (_, E::Submit(request)) => Ok((
            P::Submitting {
                request: request.clone(),
            },
            Effect::CreateBooking(request),
        )),

        (P::Submitting { request }, E::BookingCreated(booking)) => {
            let payment = Payment::new(booking.id(), request.amount, request.method);
            Ok((P::Created { booking, payment }, Effect::BeginPayment))
        }
        (P::Submitting { .. }, E::BookingRejected(error)) => Ok((
            P::Failed {
                booking: None,
                payment: None,
                error,
                payment_retryable: false,
            },
            Effect::None,
        )),

        (P::Created { booking, payment }, E::BeginPayment) => {
            let effect = if payment.method().requires_capture() {
                Effect::CapturePayment {
                    booking_id: booking.id().to_string(),
                    amount: payment.amount(),
                    method: payment.method(),
                }
            } else {
                Effect::AcknowledgeCash
            };
            Ok((
                P::PaymentPending {
                    booking: booking.clone(),
                    payment: payment.clone(),
                },
                effect,
            ))
        }

        (P::PaymentPending { booking, payment }, E::CaptureSucceeded(result)) => {
            let mut payment = payment.clone();
            payment.record(&result)?;
            let mut booking = booking.clone();
            booking.confirm(Some(payment.id().to_string()));
            Ok((P::Confirmed { booking, payment }, Effect::None))
        }
        (P::PaymentPending { booking, payment }, E::CaptureDeclined(result)) => {
            let mut payment = payment.clone();
            payment.record(&result)?;
            let mut booking = booking.clone();
            booking.fail();
            let reason = result
                .message
                .unwrap_or_else(|| format!("payment {} was declined", payment.id()));
            Ok((
                P::Failed {
                    booking: Some(booking),
                    payment: Some(payment),
                    error: DomainError::payment(reason),
                    payment_retryable: false,
                },
                Effect::None,
            ))
        }
        (P::PaymentPending { booking, payment }, E::CaptureUnknown(error)) => Ok((
            P::Failed {
                booking: Some(booking.clone()),
                payment: Some(payment.clone()),
                error,
                payment_retryable: true,
            },
            Effect::None,
        )),
        (P::PaymentPending { booking, payment }, E::CashAcknowledged)
            if payment.method() == PaymentMethod::Cash =>
        {
            let mut booking = booking.clone();
            booking.confirm(None);
            Ok((
                P::Confirmed {
                    booking,
                    payment: payment.clone(),
                },
                Effect::None,
            ))
        }

        (
            P::Failed {
                booking: Some(booking),
                payment: Some(payment),
                payment_retryable: true,
                ..
            },
            E::RetryPayment,
        ) => Ok((
            P::PaymentPending {
                booking: booking.clone(),
                payment: payment.clone(),
            },
            Effect::CapturePayment {
                booking_id: booking.id().to_string(),
                amount: payment.amount(),
                method: payment.method(),
            },
        )),
        (_, E::RetryPayment) => Err(DomainError::validation(
            "payment can only be retried after its outcome was lost in transit",
        )),

        (P::Idle, E::CancelRequested) => Ok((P::Idle, Effect::None)),
        (p, E::CancelRequested) if p.is_in_flight() => Err(DomainError::InProgress),
        (p, E::CancelRequested) if p.holds_reservation() => {
            let booking_id = p.booking().map(Booking::id).unwrap_or_default();
            Ok((
                p.clone(),
                Effect::CancelBooking {
                    booking_id: booking_id.to_string(),
                },
            ))
        }
        (p, E::CancelRequested) if matches!(p, P::Failed { .. } | P::Cancelled { .. }) => {
            Ok((p.clone(), Effect::None))
        }
        (p, E::BookingCancelled(mut booking)) if p.holds_reservation() => {
            booking.cancel();
            Ok((
                P::Cancelled {
                    booking,
                    payment: p.payment().cloned(),
                },
                Effect::None,
            ))
        }

        (P::Submitting { .. }, E::DriverDropped) => Ok((
            P::Failed {
                booking: None,
                payment: None,
                error: DomainError::network(
                    "submission abandoned before the booking outcome was known",
                ),
                payment_retryable: false,
            },
            Effect::None,
        )),
        (
            P::Created { booking, payment } | P::PaymentPending { booking, payment },
            E::DriverDropped,
        ) => Ok((
            P::Failed {
                booking: Some(booking.clone()),
                payment: Some(payment.clone()),
                error: DomainError::network(format!(
                    "payment for booking {} abandoned before its outcome was known",
                    booking.id()
                )),
                payment_retryable: true,
            },
            Effect::None,
        )),

        (p, event) => Err(DomainError::internal(format!(
            "event {:?} is not valid in phase {}",
            event,
            p.name()
        ))),
    }
}

/// Result of a confirmed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub payment: Payment,
}

/// Drives one booking attempt from submission to a terminal phase.
///
/// Collaborator calls are made one at a time, each bounded by the session's
/// deadline. Nothing is retried on the caller's behalf.
pub struct BookingCoordinator {
    store: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
    phase: Mutex<BookingPhase>,
    /// Set while a `Driver` is alive. An in-flight phase without one is abandoned.
    driving: AtomicBool,
}

impl BookingCoordinator {
    pub fn new(store: Arc<dyn BookingStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            store,
            gateway,
            phase: Mutex::new(BookingPhase::Idle),
            driving: AtomicBool::new(false),
        }
    }

    pub async fn phase(&self) -> BookingPhase {
        self.lock_phase().await.clone()
    }

    /// Validates the selection and amount, creates the booking and settles payment.
    ///
    /// On a slot conflict the resolver's slot snapshot is invalidated, so the
    /// caller has to load slots again before resubmitting.
    pub async fn submit(
        &self,
        resolver: &mut SelectionResolver,
        method: PaymentMethod,
        amount: Decimal,
        ctx: &SessionContext,
    ) -> Result<BookingConfirmation, DomainError> {
        if self.lock_phase().await.is_in_flight() {
            return Err(DomainError::InProgress);
        }

        let request = {
            let resolved = resolver.resolve()?;
            let amount = validate_payment_amount(method, amount, resolved.service.price())?;
            BookingRequest {
                service: resolved.service.clone(),
                worker_id: resolved.worker.id().to_string(),
                start: resolved.slot.start(),
                method,
                amount,
            }
        };

        info!(
            "Submitting booking: service={} worker={} start={} method={} amount={}",
            request.service.id(),
            request.worker_id,
            request.start,
            request.method,
            request.amount
        );

        let (effect, _driver) = self.begin(BookingEvent::Submit(request)).await?;
        let phase = self.run(effect, ctx).await?;

        match phase {
            BookingPhase::Confirmed { booking, payment } => {
                info!("Booking {} confirmed", booking.id());
                Ok(BookingConfirmation { booking, payment })
            }
            BookingPhase::Failed { error, .. } => {
                if error.requires_slot_refresh() {
                    warn!("Slot taken by another booking; slot snapshot invalidated");
                    resolver.invalidate_slots();
                }
                Err(error)
            }
            other => Err(DomainError::internal(format!(
                "submission stopped in phase {}",
                other.name()
            ))),
        }
    }

    /// Re-issues capture for the same booking and payment after a capture
    /// whose outcome was lost in transit.
    pub async fn retry_payment(
        &self,
        ctx: &SessionContext,
    ) -> Result<BookingConfirmation, DomainError> {
        let (effect, _driver) = self.begin(BookingEvent::RetryPayment).await?;
        match self.run(effect, ctx).await? {
            BookingPhase::Confirmed { booking, payment } => {
                info!("Booking {} confirmed after payment retry", booking.id());
                Ok(BookingConfirmation { booking, payment })
            }
            BookingPhase::Failed { error, .. } => Err(error),
            other => Err(DomainError::internal(format!(
                "payment retry stopped in phase {}",
                other.name()
            ))),
        }
    }

    /// Cancels the booking this attempt created. Before anything was created
    /// this is a no-op.
    pub async fn cancel(&self, ctx: &SessionContext) -> Result<BookingPhase, DomainError> {
        let effect = self.apply(BookingEvent::CancelRequested).await?;
        self.run(effect, ctx).await
    }

    /// Returns to `Idle` once the attempt is settled. Refused while a call is
    /// outstanding or while a created booking still reserves its slot.
    pub async fn reset(&self) -> Result<(), DomainError> {
        let mut phase = self.lock_phase().await;
        if phase.is_in_flight() {
            return Err(DomainError::InProgress);
        }
        if phase.holds_reservation() && !matches!(*phase, BookingPhase::Confirmed { .. }) {
            return Err(DomainError::validation(
                "a created booking still reserves its slot; cancel it first",
            ));
        }
        *phase = BookingPhase::Idle;
        Ok(())
    }

    async fn apply(&self, event: BookingEvent) -> Result<Effect, DomainError> {
        let mut phase = self.lock_phase().await;
        let (next, effect) = transition(&phase, event)?;
        debug!("Booking phase {} -> {}", phase.name(), next.name());
        *phase = next;
        Ok(effect)
    }

    /// Like `apply`, but claims the attempt for the caller. The returned
    /// driver must live until `run` returns.
    async fn begin(&self, event: BookingEvent) -> Result<(Effect, Driver<'_>), DomainError> {
        let mut phase = self.lock_phase().await;
        let (next, effect) = transition(&phase, event)?;
        debug!("Booking phase {} -> {}", phase.name(), next.name());
        *phase = next;
        self.driving.store(true, Ordering::SeqCst);
        Ok((effect, Driver { coordinator: self }))
    }

    /// Locks the phase, first settling an in-flight phase whose driver was dropped.
    async fn lock_phase(&self) -> MutexGuard<'_, BookingPhase> {
        let mut phase = self.phase.lock().await;
        if !self.driving.load(Ordering::SeqCst) {
            settle_abandoned(&mut phase);
        }
        phase
    }

    /// Performs effects until the machine is quiescent and returns the final phase.
    async fn run(&self, mut effect: Effect, ctx: &SessionContext) -> Result<BookingPhase, DomainError> {
        loop {
            let event = match effect {
                Effect::None => return Ok(self.phase().await),
                Effect::CreateBooking(request) => {
                    let created = with_deadline(
                        ctx,
                        "create booking",
                        self.store
                            .create_booking(&request.service, &request.worker_id, request.start, ctx),
                    )
                    .await;
                    match created {
                        Ok(booking) => {
                            info!("Booking {} created (pending)", booking.id());
                            BookingEvent::BookingCreated(booking)
                        }
                        Err(e) => BookingEvent::BookingRejected(e),
                    }
                }
                Effect::BeginPayment => BookingEvent::BeginPayment,
                Effect::CapturePayment {
                    booking_id,
                    amount,
                    method,
                } => {
                    let captured = with_deadline(
                        ctx,
                        "capture payment",
                        self.gateway.capture(&booking_id, amount, method, ctx),
                    )
                    .await;
                    capture_event(&booking_id, captured)
                }
                Effect::AcknowledgeCash => {
                    debug!("Cash payment acknowledged; no capture issued");
                    BookingEvent::CashAcknowledged
                }
                Effect::CancelBooking { booking_id } => {
                    // A failed cancellation leaves the phase untouched.
                    let cancelled = with_deadline(
                        ctx,
                        "cancel booking",
                        self.store.cancel_booking(&booking_id, ctx),
                    )
                    .await?;
                    info!("Booking {} cancelled", booking_id);
                    BookingEvent::BookingCancelled(cancelled)
                }
            };
            effect = self.apply(event).await?;
        }
    }
}

/// Marks the attempt as driven. Dropping it before the phase settles (the
/// caller's future was cancelled) turns the in-flight phase into `Failed`.
struct Driver<'a> {
    coordinator: &'a BookingCoordinator,
}

impl Drop for Driver<'_> {
    fn drop(&mut self) {
        self.coordinator.driving.store(false, Ordering::SeqCst);
        // If the lock is busy, the next `lock_phase` settles it instead.
        if let Ok(mut phase) = self.coordinator.phase.try_lock() {
            settle_abandoned(&mut phase);
        }
    }
}

fn settle_abandoned(phase: &mut BookingPhase) {
    if !phase.is_in_flight() {
        return;
    }
    if let Ok((next, _)) = transition(phase, BookingEvent::DriverDropped) {
        warn!("Booking attempt abandoned in phase {}; marked {}", phase.name(), next.name());
        *phase = next;
    }
}

fn capture_event(booking_id: &str, captured: Result<PaymentResult, DomainError>) -> BookingEvent {
    match captured {
        Ok(result) if result.status == PaymentStatus::Captured => {
            info!("Payment {} captured for booking {}", result.payment_id, booking_id);
            BookingEvent::CaptureSucceeded(result)
        }
        Ok(result) if result.status == PaymentStatus::Failed => {
            warn!("Payment {} declined for booking {}", result.payment_id, booking_id);
            BookingEvent::CaptureDeclined(result)
        }
        Ok(result) => BookingEvent::CaptureUnknown(DomainError::network(format!(
            "gateway left payment {} pending",
            result.payment_id
        ))),
        Err(DomainError::Payment(reason)) => {
            warn!("Payment declined for booking {}: {}", booking_id, reason);
            BookingEvent::CaptureDeclined(PaymentResult::failed("", reason))
        }
        Err(e) => {
            warn!("Payment outcome unknown for booking {}: {}", booking_id, e);
            BookingEvent::CaptureUnknown(e)
        }
    }
}

async fn with_deadline<T>(
    ctx: &SessionContext,
    what: &str,
    call: impl Future<Output = Result<T, DomainError>>,
) -> Result<T, DomainError> {
    match ctx.deadline() {
        Some(deadline) => tokio::time::timeout(deadline, call).await.map_err(|_| {
            DomainError::network(format!("{} timed out after {:?}", what, deadline))
        })?,
        None => call.await,
    }
}
