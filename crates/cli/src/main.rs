//! shoecart CLI - manage a local shopping cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! shoecart show
//!
//! # Add one unit of product 1
//! shoecart add 1
//!
//! # Set the quantity of product 1 to 3
//! shoecart update 1 3
//!
//! # Remove product 1
//! shoecart remove 1
//! ```
//!
//! Every command prints the resulting cart as JSON. Failures are reported as
//! notifications on stderr and the process exits with status 1.
//!
//! Configuration is read from the environment, see `shoecart::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shoecart::config::CartConfig;
use shoecart_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shoecart")]
#[command(author, version, about = "Manage a local shopping cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (zero or below is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to warn so notifications show up without drowning the JSON output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shoecart=warn,shoecart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match commands::cart::run(cli.command.into(), &config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(2);
        }
    }
}

impl From<Commands> for commands::cart::CartCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Self::Show,
            Commands::Add { product_id } => Self::Add(product_id),
            Commands::Remove { product_id } => Self::Remove(product_id),
            Commands::Update { product_id, amount } => Self::Update { product_id, amount },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::cart::CartCommand;

    fn parse(args: &[&str]) -> CartCommand {
        Cli::try_parse_from(args).unwrap().command.into()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse(&["shoecart", "show"]), CartCommand::Show);
        assert_eq!(
            parse(&["shoecart", "add", "7"]),
            CartCommand::Add(ProductId::new(7))
        );
        assert_eq!(
            parse(&["shoecart", "remove", "7"]),
            CartCommand::Remove(ProductId::new(7))
        );
    }

    #[test]
    fn test_parse_update_accepts_negative_amount() {
        assert_eq!(
            parse(&["shoecart", "update", "3", "-2"]),
            CartCommand::Update {
                product_id: ProductId::new(3),
                amount: -2,
            }
        );
    }

    #[test]
    fn test_rejects_non_numeric_product_id() {
        assert!(Cli::try_parse_from(["shoecart", "add", "shoe"]).is_err());
    }
}
