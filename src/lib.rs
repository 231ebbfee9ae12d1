pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    transition, BookingConfirmation, BookingCoordinator, BookingEvent, BookingPhase,
    BookingRequest, BookingStore, BusinessDirectory, Effect, PaymentGateway, ResolvedSelection,
    SelectionResolver,
};

pub use cli::{Commands, SelectionArgs};

pub use connector::{
    ApiClient, ApiConfig, CaptureOutcome, Container, ContainerConfig, HttpBookingStore,
    HttpBusinessDirectory, HttpPaymentGateway, InMemoryBookingStore, InMemoryBusinessDirectory,
    InMemoryPaymentGateway, Router,
};

pub use domain::{
    deposit_bounds, validate_payment_amount, Booking, BookingStatus, Business, ChainLevel,
    DayHours, DomainError, OperatingHours, Payment, PaymentMethod, PaymentResult, PaymentStatus,
    Selection, Service, SessionContext, SlotGenerator, Slots, TimeSlot, Worker,
    DEFAULT_SLOT_STEP_MINUTES, DEPOSIT_MIN_RATIO, MAX_SLOT_STEP_MINUTES,
};
