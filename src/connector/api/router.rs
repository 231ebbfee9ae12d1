use anyhow::Result;

use crate::cli::Commands;

use super::container::Container;
use super::controller::{BookingController, CatalogController, SlotsController};

pub struct Router<'a> {
    catalog_controller: CatalogController<'a>,
    slots_controller: SlotsController<'a>,
    booking_controller: BookingController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            catalog_controller: CatalogController::new(container),
            slots_controller: SlotsController::new(container),
            booking_controller: BookingController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Businesses { category } => self.catalog_controller.businesses(category).await,
            Commands::Services { business } => self.catalog_controller.services(business).await,
            Commands::Slots { selection } => self.slots_controller.slots(selection).await,
            Commands::Book {
                selection,
                slot,
                method,
                amount,
            } => {
                self.booking_controller
                    .book(selection, slot, method, amount)
                    .await
            }
            Commands::Cancel {
                booking_id,
                customer,
                token,
            } => {
                self.booking_controller
                    .cancel(booking_id, customer, token)
                    .await
            }
        }
    }
}
