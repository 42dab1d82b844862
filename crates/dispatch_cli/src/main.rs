//! Thin outer binary: load configuration, wire a `RouteProvider` and
//! `PersistenceStore`, and run one dispatch batch. The engine itself knows
//! nothing about the CLI, env vars, or logging setup — all of that lives
//! here, the way `stateset-api`'s `main.rs` keeps config-loading,
//! `tracing` init, and adapter wiring out of its services.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use dispatch_core::config::DispatchConfig;
use dispatch_core::dispatcher::run_dispatch;
use dispatch_core::persistence::in_memory::InMemoryStore;
use dispatch_core::route_provider::build_route_provider;

/// Runs a single dispatch batch against the configured Route Provider and
/// Persistence Store.
#[derive(Parser)]
#[command(name = "dispatch_cli", about = "Runs one pizza-delivery dispatch batch")]
struct Cli {
    /// Log filter, e.g. `info`, `dispatch_core=debug`. Defaults to the
    /// `RUST_LOG` env var, then `info`.
    #[arg(long)]
    log_filter: Option<String>,
}

fn init_tracing(filter: Option<String>) {
    let filter = filter
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_filter);

    let config = match DispatchConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let provider = match build_route_provider(&config.route_provider) {
        Ok(provider) => provider,
        Err(err) => {
            error!(error = %err, "failed to build route provider");
            return std::process::ExitCode::FAILURE;
        }
    };

    // No persistence backend is wired up by default (spec.md §6's schema
    // migrations are out of scope); operators running against real state
    // should build with `--features sea-orm-store` and swap this for a
    // `SeaOrmStore` over a real connection.
    let store: Arc<dyn dispatch_core::persistence::PersistenceStore> = Arc::new(InMemoryStore::new());

    info!("starting dispatch run");
    match run_dispatch(&config, store.as_ref(), provider.as_ref(), None).await {
        Ok(outcome) => {
            info!(
                assigned = outcome.assignments.len(),
                deferred = outcome.deferrals.len(),
                "dispatch run complete"
            );
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "dispatch run aborted");
            std::process::ExitCode::FAILURE
        }
    }
}
