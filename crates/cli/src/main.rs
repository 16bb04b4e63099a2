//! Klarna order management CLI.
//!
//! Runs lifecycle events against orders kept in a YAML file, the same way a
//! shop would fire them, and writes the updated orders back.
//!
//! # Usage
//!
//! ```bash
//! # Capture order 1042 as if it had just been completed
//! kom-cli --orders orders.yaml --settings settings.yaml trigger complete --order 1042
//!
//! # Refund part of a captured order
//! kom-cli trigger refund --order 1042 --amount 50.00 --reason "customer request"
//!
//! # Show the request that would be sent, without sending it
//! kom-cli inspect --order 1042
//! ```
//!
//! # Commands
//!
//! - `trigger cancel|complete|items-saved|refund` - Fire a lifecycle event
//! - `inspect` - Print the resolved endpoint and the retrieve request

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kom::KomConfig;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "kom-cli")]
#[command(author, version, about = "Klarna order management tools")]
struct Cli {
    /// Orders YAML file
    #[arg(long, global = true, default_value = "orders.yaml")]
    orders: PathBuf,

    /// Settings YAML file
    #[arg(long, global = true, default_value = "settings.yaml")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire an order lifecycle event
    Trigger {
        #[command(subcommand)]
        event: Event,
    },
    /// Print the resolved endpoint and request for an order
    Inspect {
        /// Host order ID
        #[arg(short, long)]
        order: i64,
    },
}

#[derive(Subcommand)]
enum Event {
    /// The order was cancelled
    Cancel {
        #[arg(short, long)]
        order: i64,
    },
    /// The order was completed
    Complete {
        #[arg(short, long)]
        order: i64,
    },
    /// The order's line items were saved
    ItemsSaved {
        #[arg(short, long)]
        order: i64,

        /// Treat the edit as coming from a background job
        #[arg(long)]
        background: bool,
    },
    /// A refund was requested
    Refund {
        #[arg(short, long)]
        order: i64,

        /// Amount in major units (e.g. 50.00)
        #[arg(short, long)]
        amount: Decimal,

        /// Reason shown to the customer
        #[arg(short, long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let config = match KomConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kom=info,kom_cli=info".into());
    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &KomConfig) -> Result<(), Box<dyn std::error::Error>> {
    let files = commands::Files {
        orders: cli.orders,
        settings: cli.settings,
    };
    match cli.command {
        Commands::Trigger { event } => {
            let event = match event {
                Event::Cancel { order } => commands::trigger::Event::Cancel(order.into()),
                Event::Complete { order } => commands::trigger::Event::Complete(order.into()),
                Event::ItemsSaved { order, background } => {
                    commands::trigger::Event::ItemsSaved(order.into(), background)
                }
                Event::Refund {
                    order,
                    amount,
                    reason,
                } => commands::trigger::Event::Refund(order.into(), amount, reason),
            };
            commands::trigger::run(&files, config, event).await?;
        }
        Commands::Inspect { order } => commands::inspect::run(&files, config, order.into())?,
    }
    Ok(())
}
