use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::application::{BookingConfirmation, BookingPhase};
use crate::cli::SelectionArgs;
use crate::domain::{Booking, PaymentMethod, PaymentStatus};

use super::super::Container;
use super::select_through_slots;

pub struct BookingController<'a> {
    container: &'a Container,
}

impl<'a> BookingController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn book(
        &self,
        args: SelectionArgs,
        slot: String,
        method: PaymentMethod,
        amount: Option<Decimal>,
    ) -> Result<String> {
        let time = NaiveTime::parse_from_str(slot.trim(), "%H:%M")
            .with_context(|| format!("invalid slot time {slot}, expected HH:MM"))?;
        let (mut resolver, ctx) = select_through_slots(self.container, &args, Utc::now()).await?;

        let (start, price) = {
            let (Some(business), Some(service), Some(slots)) =
                (resolver.business(), resolver.service(), resolver.offered_slots())
            else {
                bail!("selection is incomplete");
            };
            let tz = business.timezone();
            let start = slots
                .iter()
                .map(|s| s.start())
                .find(|start| start.with_timezone(&tz).time() == time)
                .ok_or_else(|| anyhow!("{} is not an open slot", slot))?;
            (start, service.price())
        };
        resolver.set_slot(start)?;

        let coordinator = self.container.coordinator();
        match coordinator
            .submit(&mut resolver, method, amount.unwrap_or(price), &ctx)
            .await
        {
            Ok(confirmation) => Ok(format_confirmation(&confirmation)),
            Err(e) => match coordinator.phase().await {
                BookingPhase::Failed {
                    booking: Some(booking),
                    payment_retryable,
                    ..
                } => Err(anyhow!(e).context(unconfirmed_message(&booking, payment_retryable))),
                _ => Err(e.into()),
            },
        }
    }

    pub async fn cancel(
        &self,
        booking_id: String,
        customer: String,
        token: Option<String>,
    ) -> Result<String> {
        let ctx = self.container.session(&customer, token.as_deref());
        let booking = self
            .container
            .store()
            .cancel_booking(&booking_id, &ctx)
            .await?;
        Ok(format!("Booking {} is {}.", booking.id(), booking.status()))
    }
}

fn unconfirmed_message(booking: &Booking, payment_retryable: bool) -> String {
    if payment_retryable {
        format!(
            "booking {} was created but the payment outcome is unknown; it is still pending",
            booking.id()
        )
    } else {
        format!(
            "booking {} was created but not confirmed; cancel it to release the slot",
            booking.id()
        )
    }
}

fn format_confirmation(confirmation: &BookingConfirmation) -> String {
    let booking = &confirmation.booking;
    let payment = &confirmation.payment;

    let mut output = format!("Booking {} confirmed.\n", booking.id());
    output.push_str(&format!("  Worker:  {}\n", booking.worker_id()));
    output.push_str(&format!(
        "  Time:    {} - {}\n",
        booking.start().format("%Y-%m-%d %H:%M UTC"),
        booking.end().format("%H:%M UTC")
    ));
    let settled = match payment.status() {
        PaymentStatus::Captured => "captured",
        PaymentStatus::Pending => "due at the venue",
        PaymentStatus::Failed => "failed",
    };
    output.push_str(&format!(
        "  Payment: {:.2} {} ({})\n",
        payment.amount(),
        payment.method(),
        settled
    ));
    output
}
