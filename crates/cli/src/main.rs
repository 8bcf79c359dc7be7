//! CRM CLI - Migrations, seeding, mutations and scheduled jobs.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! crm migrate
//!
//! # Load demo customers and products
//! crm seed
//!
//! # Create records
//! crm customer create -n "Ann Lee" -e ann@example.com -p "+1 555 123 4567"
//! crm customer import customers.json
//! crm product create -n Laptop --price 999.99 --stock 5
//! crm order create -c 1 -p 1 -p 2
//!
//! # Run a scheduled job once
//! crm job heartbeat
//! crm job low-stock --threshold 10 --increment 10
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database with demo data
//! - `customer` / `product` / `order` - Run mutations, print results as JSON
//! - `job` - Run one scheduled job

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crm::CrmConfig;
use crm_core::{CustomerId, OrderId, ProductId};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "crm")]
#[command(author, version, about = "CRM backend tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo customers and products
    Seed,
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Run a scheduled job once
    Job {
        #[command(subcommand)]
        job: JobKind,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Create a customer
    Create {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// Optional phone number
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Create customers from a JSON array of `{name, email, phone?}`
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Delete a customer and its orders
    Delete {
        /// Customer ID
        id: CustomerId,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create a product
    Create {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Units on hand (default: 0)
        #[arg(long)]
        stock: Option<i32>,
    },
    /// Change a product's price
    SetPrice {
        /// Product ID
        id: ProductId,

        /// New unit price
        #[arg(long)]
        price: Decimal,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Create an order
    Create {
        /// Customer ID
        #[arg(short, long)]
        customer: CustomerId,

        /// Product ID (repeat for several products)
        #[arg(short, long = "product")]
        products: Vec<ProductId>,

        /// Order date, RFC 3339 (default: now)
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },
    /// Show an order
    Show {
        /// Order ID
        id: OrderId,
    },
}

#[derive(Subcommand)]
enum JobKind {
    /// Log a heartbeat and ping the database
    Heartbeat,
    /// Restock products below a stock threshold
    LowStock {
        /// Restock products with stock below this (default: `LOW_STOCK_THRESHOLD`)
        #[arg(long)]
        threshold: Option<i32>,

        /// Units to add (default: `LOW_STOCK_INCREMENT`)
        #[arg(long)]
        increment: Option<i32>,
    },
    /// Log reminders for recent orders
    OrderReminders {
        /// Look-back window in days (default: `ORDER_REMINDER_WINDOW_DAYS`)
        #[arg(long)]
        days: Option<i64>,
    },
    /// Log customer, order and revenue totals
    Report,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CrmConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _guard = crm::telemetry::init(None);
            tracing::error!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry_guard = crm::telemetry::init(config.sentry.as_ref());

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Mutation(e)) => {
            tracing::debug!(kind = ?e.kind(), "Mutation rejected");
            if let Err(print_err) = commands::print_json(&e.payload()) {
                tracing::error!("Command failed: {print_err}");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &CrmConfig) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run(config).await,
        Commands::Seed => commands::seed::run(config).await,
        Commands::Customer { action } => match action {
            CustomerAction::Create { name, email, phone } => {
                commands::customers::create(config, name, email, phone).await
            }
            CustomerAction::Import { file } => commands::customers::import(config, &file).await,
            CustomerAction::Delete { id } => commands::customers::delete(config, id).await,
        },
        Commands::Product { action } => match action {
            ProductAction::Create { name, price, stock } => {
                commands::products::create(config, name, price, stock).await
            }
            ProductAction::SetPrice { id, price } => {
                commands::products::set_price(config, id, price).await
            }
        },
        Commands::Order { action } => match action {
            OrderAction::Create {
                customer,
                products,
                date,
            } => commands::orders::create(config, customer, products, date).await,
            OrderAction::Show { id } => commands::orders::show(config, id).await,
        },
        Commands::Job { job } => match job {
            JobKind::Heartbeat => commands::jobs::heartbeat(config).await,
            JobKind::LowStock {
                threshold,
                increment,
            } => commands::jobs::low_stock(config, threshold, increment).await,
            JobKind::OrderReminders { days } => commands::jobs::order_reminders(config, days).await,
            JobKind::Report => commands::jobs::report(config).await,
        },
    }
}
