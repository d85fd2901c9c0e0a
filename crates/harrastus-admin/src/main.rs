//! Harrastus admin: maintenance jobs run against the catalog database.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use harrastus_core::error::HarrastusError;
use harrastus_core::models::permission::ResourceKind;
use harrastus_db::{DbError, DbManager};
use harrastus_service::{CatalogWriter, EventService, GoogleGeocoder};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[derive(Debug, thiserror::Error)]
enum AdminError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Catalog(#[from] HarrastusError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("harrastus=info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Job failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AdminError> {
    let manager = DbManager::connect(&cli.db.config()).await?;
    let config = cli.service.config();

    if matches!(cli.command, Command::Migrate) {
        manager.migrate().await?;
        return Ok(());
    }
    let (catalog, store) = manager.open_catalog().await?;

    match cli.command {
        Command::Migrate => {}
        Command::RefreshNextEvents { today } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let events = EventService::new(catalog, config);
            let report = events.refresh_all_next_events(today).await?;
            info!(
                %today,
                upcoming = report.upcoming,
                ongoing = report.ongoing,
                none = report.none,
                "Refreshed next events"
            );
        }
        Command::ReconcilePermissions { kind } => {
            let writer: CatalogWriter<_, _, GoogleGeocoder> =
                CatalogWriter::new(catalog, store, None, config);
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => ResourceKind::ALL.to_vec(),
            };
            for kind in kinds {
                writer.reconciler().reconcile_all(kind).await?;
            }
        }
        Command::GeocodeLocations => {
            let geocoder = GoogleGeocoder::from_config(&config)?;
            let writer = CatalogWriter::new(catalog, store, geocoder, config);
            writer.geocode_locations().await?;
        }
    }
    Ok(())
}
