//! Connecting the catalog to a SurrealDB server.
//!
//! Jobs other than migration open the catalog with
//! [`DbManager::open_catalog`], which refuses to hand out repositories
//! while the schema is behind.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::{info, warn};

use crate::error::DbError;
use crate::repository::{SurrealCatalog, SurrealPermissionStore};
use crate::schema::{check_schema, run_migrations};

/// Where the catalog lives and how to sign in.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address without scheme, e.g. `127.0.0.1:8000`.
    pub url: String,
    /// Namespace holding the catalog database.
    pub namespace: String,
    /// Database holding the catalog tables.
    pub database: String,
    /// Root user the jobs sign in as.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "harrastus".into(),
            database: "catalog".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A signed-in client with the catalog namespace and database selected.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to the catalog database"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self { db })
    }

    /// Bring the schema up to date.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    /// Repositories and permission store over this connection, after
    /// checking that the schema is current.
    pub async fn open_catalog(
        &self,
    ) -> Result<(SurrealCatalog<Client>, SurrealPermissionStore<Client>), DbError> {
        match check_schema(&self.db).await {
            Ok(version) => info!(version, "Catalog schema is current"),
            Err(e) => {
                warn!(error = %e, "Catalog schema check failed");
                return Err(e);
            }
        }
        Ok((
            SurrealCatalog::new(self.db.clone()),
            SurrealPermissionStore::new(self.db.clone()),
        ))
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
