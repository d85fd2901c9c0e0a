//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use harrastus_core::models::permission::ResourceKind;
use harrastus_db::DbConfig;
use harrastus_service::ServiceConfig;

#[derive(Parser, Debug)]
#[command(name = "harrastus-admin")]
#[command(about = "Maintenance jobs for the hobby catalog")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,

    /// Recompute the next-event pointer of every hobby
    RefreshNextEvents {
        /// Day to compute against (default: today, local time)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Bring object permissions in line with ownership
    ReconcilePermissions {
        /// Resource kind to reconcile (default: all kinds)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<ResourceKind>,
    },

    /// Geocode hand-entered locations with missing or (0, 0) coordinates
    GeocodeLocations,
}

#[derive(Args, Debug)]
pub struct DbArgs {
    /// SurrealDB WebSocket address
    #[arg(long, env = "SURREALDB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "SURREALDB_NAMESPACE", default_value = "harrastus")]
    pub db_namespace: String,

    #[arg(long, env = "SURREALDB_DATABASE", default_value = "catalog")]
    pub db_database: String,

    #[arg(long, env = "SURREALDB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long, env = "SURREALDB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,
}

impl DbArgs {
    pub fn config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Maximum events one recurrence request may generate
    #[arg(long, env = "RECURRENCE_CAP", default_value = "50")]
    pub recurrence_cap: usize,

    /// Google Geocoding API key; geocoding is disabled without one
    #[arg(long, env = "GOOGLE_GEOCODING_API_KEY", hide_env_values = true)]
    pub geocoding_api_key: Option<String>,

    #[arg(long, env = "GEOCODING_URL")]
    pub geocoding_url: Option<String>,

    /// Geocoding request timeout in seconds
    #[arg(long, env = "GEOCODING_TIMEOUT_SECS", default_value = "10")]
    pub geocoding_timeout_secs: u64,
}

impl ServiceArgs {
    pub fn config(&self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            recurrence_cap: self.recurrence_cap,
            geocoding_api_key: self.geocoding_api_key.clone(),
            geocoding_url: self
                .geocoding_url
                .clone()
                .unwrap_or(defaults.geocoding_url),
            geocoding_timeout_secs: self.geocoding_timeout_secs,
        }
    }
}

fn parse_kind(raw: &str) -> Result<ResourceKind, String> {
    ResourceKind::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown kind {raw:?}, expected one of {}", known.join(", "))
    })
}
