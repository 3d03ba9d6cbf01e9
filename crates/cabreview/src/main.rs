// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cabreview - review-request dispatch for taxi companies.
//!
//! This is the operator CLI: it wires configuration, tracing, SQLite storage,
//! the HTTP sender, and the dispatch engine together.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod dispatch;
mod runtime;

use std::path::PathBuf;

use cabreview_config::CabreviewConfig;
use cabreview_core::CabreviewError;
use cabreview_core::types::Integration;
use clap::{Parser, Subcommand};

/// Cabreview - review-request dispatch for taxi companies.
#[derive(Parser, Debug)]
#[command(name = "cabreview", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one trip-completed event and print the response body.
    Dispatch {
        /// Webhook family the event arrived through (generic, cab9, cordic).
        #[arg(long, default_value = "generic")]
        integration: Integration,
        /// JSON object of event fields, or `-` for stdin.
        #[arg(long, default_value = "-")]
        event: String,
    },
    /// Stop further review requests to a number under a client.
    ///
    /// Without `--country` the number must already be in canonical form:
    /// country code and national number, digits only (e.g. 447123456789).
    Stop {
        telephone: String,
        client_id: u64,
        /// ISO-3166 country to normalize a local-format number with first.
        #[arg(long)]
        country: Option<String>,
    },
    /// Print the Review-Master queue id for a pairing code.
    Pair { code: String },
    /// Reload the Review-Master master queue id from storage.
    RefreshMasterQueue,
    /// Print the canonical form of a telephone number (empty if invalid).
    Normalize { telephone: String, country: String },
    /// Load, validate, and print the effective configuration.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Normalize { telephone, country } = &cli.command {
        println!("{}", cabreview_dispatch::telephone::normalize(telephone, country));
        return;
    }

    let loaded = match &cli.config {
        Some(path) => cabreview_config::load_and_validate_path(path),
        None => cabreview_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            cabreview_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: CabreviewConfig) -> Result<(), CabreviewError> {
    match command {
        Commands::Dispatch { integration, event } => {
            dispatch::run_dispatch(&config, integration, &event).await
        }
        Commands::Stop {
            telephone,
            client_id,
            country,
        } => admin::run_stop(&config, &telephone, client_id, country.as_deref()).await,
        Commands::Pair { code } => admin::run_pair(&config, &code).await,
        Commands::RefreshMasterQueue => admin::run_refresh_master_queue(&config).await,
        Commands::CheckConfig => print_config(&config),
        Commands::Normalize { .. } => Ok(()),
    }
}

/// Prints the effective configuration as TOML.
fn print_config(config: &CabreviewConfig) -> Result<(), CabreviewError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| CabreviewError::Internal(format!("failed to render config: {e}")))?;
    println!("# configuration is valid\n{rendered}");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cabreview={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
