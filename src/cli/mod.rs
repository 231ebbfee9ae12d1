use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use crate::domain::PaymentMethod;

/// The selection chain shared by `slots` and `book`.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    #[arg(short, long)]
    pub category: String,

    #[arg(short, long)]
    pub business: String,

    #[arg(short, long)]
    pub service: String,

    /// Required unless the service is bound to one worker
    #[arg(short, long)]
    pub worker: Option<String>,

    /// Business-local date (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    #[arg(long, default_value = "guest")]
    pub customer: String,

    /// Bearer token for this session; falls back to BOOKING_API_TOKEN
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the businesses of a category
    Businesses {
        #[arg(short, long)]
        category: String,
    },

    /// List a business's services and workers
    Services {
        #[arg(short, long)]
        business: String,
    },

    /// Show the open slots for a worker on a date
    Slots {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Book a slot and settle payment
    Book {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Business-local start time (HH:MM)
        #[arg(long)]
        slot: String,

        #[arg(short, long, default_value = "online")]
        method: PaymentMethod,

        /// Defaults to the service price
        #[arg(short, long)]
        amount: Option<Decimal>,
    },

    /// Cancel an existing booking
    Cancel {
        booking_id: String,

        #[arg(long, default_value = "guest")]
        customer: String,

        #[arg(long)]
        token: Option<String>,
    },
}
