pub mod booking_controller;
pub mod catalog_controller;
pub mod slots_controller;

pub use booking_controller::BookingController;
pub use catalog_controller::CatalogController;
pub use slots_controller::SlotsController;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use crate::application::SelectionResolver;
use crate::cli::SelectionArgs;
use crate::domain::SessionContext;

use super::Container;

/// Walks the selection chain up to the date and loads a fresh slot snapshot.
pub(crate) async fn select_through_slots(
    container: &Container,
    args: &SelectionArgs,
    now: DateTime<Utc>,
) -> Result<(SelectionResolver, SessionContext)> {
    let mut resolver = container.resolver();
    let ctx = container.session(&args.customer, args.token.as_deref());

    resolver.set_category(&args.category).await?;
    resolver.set_business(&args.business).await?;
    resolver.set_service(&args.service)?;
    let worker_preset = resolver.selection().worker_id().is_some();
    match (&args.worker, worker_preset) {
        (Some(worker), _) => resolver.set_worker(worker)?,
        (None, true) => {}
        (None, false) => {
            let candidates: Vec<_> = resolver
                .candidate_workers()
                .iter()
                .map(|w| w.id().to_string())
                .collect();
            bail!(
                "service {} needs a worker; choose one of: {}",
                args.service,
                candidates.join(", ")
            );
        }
    }

    let date = match args.date {
        Some(date) => date,
        None => match resolver.business() {
            Some(business) => business.today(now),
            None => bail!("business {} is no longer listed", args.business),
        },
    };
    resolver.set_date(date, now)?;

    let store = container.store();
    resolver.load_slots(store.as_ref(), &ctx, now).await?;
    Ok((resolver, ctx))
}
