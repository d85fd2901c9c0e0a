//! Schema definitions and migration runner for SurrealDB.
//!
//! Every table is SCHEMAFULL. UUIDs, dates (`YYYY-MM-DD`) and times
//! (`HH:MM:SS`) are stored as strings; the ISO formats keep string
//! ordering equal to chronological ordering. Enums are strings guarded
//! by ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "catalog_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Municipalities and their moderators
-- =======================================================================
DEFINE TABLE municipality SCHEMAFULL;
DEFINE FIELD name ON TABLE municipality TYPE string;
DEFINE INDEX idx_municipality_name ON TABLE municipality COLUMNS name;

-- Record id: <municipality_id>_<user_id>
DEFINE TABLE municipality_moderator SCHEMAFULL;
DEFINE FIELD municipality_id ON TABLE municipality_moderator TYPE string;
DEFINE FIELD user_id ON TABLE municipality_moderator TYPE string;
DEFINE INDEX idx_moderator_municipality ON TABLE municipality_moderator \
    COLUMNS municipality_id;
DEFINE INDEX idx_moderator_user ON TABLE municipality_moderator \
    COLUMNS user_id;

-- =======================================================================
-- Per-object change permissions
-- Record id: <kind>_<user_id>_<resource_id>
-- =======================================================================
DEFINE TABLE object_permission SCHEMAFULL;
DEFINE FIELD kind ON TABLE object_permission TYPE string \
    ASSERT $value IN ['hobby', 'location', 'organizer', 'promotion'];
DEFINE FIELD user_id ON TABLE object_permission TYPE string;
DEFINE FIELD resource_id ON TABLE object_permission TYPE string;
DEFINE FIELD granted_at ON TABLE object_permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_resource ON TABLE object_permission \
    COLUMNS kind, resource_id;
DEFINE INDEX idx_permission_user ON TABLE object_permission \
    COLUMNS kind, user_id;

-- =======================================================================
-- Category and audience taxonomies
-- =======================================================================
DEFINE TABLE hobby_category SCHEMAFULL;
DEFINE FIELD kind ON TABLE hobby_category TYPE string \
    ASSERT $value IN ['Category', 'Audience'];
DEFINE FIELD name ON TABLE hobby_category TYPE string;
DEFINE FIELD name_fi ON TABLE hobby_category TYPE option<string>;
DEFINE FIELD name_en ON TABLE hobby_category TYPE option<string>;
DEFINE FIELD name_sv ON TABLE hobby_category TYPE option<string>;
DEFINE FIELD parent_id ON TABLE hobby_category TYPE option<string>;
DEFINE FIELD cover_image ON TABLE hobby_category TYPE option<string>;
DEFINE FIELD data_source ON TABLE hobby_category TYPE string DEFAULT '';
DEFINE FIELD origin_id ON TABLE hobby_category TYPE option<string>;
DEFINE INDEX idx_category_parent ON TABLE hobby_category COLUMNS parent_id;

-- =======================================================================
-- Locations and organizers
-- =======================================================================
DEFINE TABLE location SCHEMAFULL;
DEFINE FIELD name ON TABLE location TYPE string;
DEFINE FIELD address ON TABLE location TYPE string DEFAULT '';
DEFINE FIELD zip_code ON TABLE location TYPE string DEFAULT '';
DEFINE FIELD city ON TABLE location TYPE string DEFAULT '';
DEFINE FIELD latitude ON TABLE location TYPE option<float> \
    ASSERT $value = NONE OR ($value >= -90 AND $value <= 90);
DEFINE FIELD longitude ON TABLE location TYPE option<float> \
    ASSERT $value = NONE OR ($value >= -180 AND $value <= 180);
DEFINE FIELD municipality_id ON TABLE location TYPE option<string>;
DEFINE FIELD created_by ON TABLE location TYPE option<string>;
DEFINE FIELD data_source ON TABLE location TYPE string DEFAULT '';
DEFINE FIELD origin_id ON TABLE location TYPE option<string>;
DEFINE FIELD created_at ON TABLE location TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE location TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE organizer SCHEMAFULL;
DEFINE FIELD name ON TABLE organizer TYPE string;
DEFINE FIELD municipality_id ON TABLE organizer TYPE option<string>;
DEFINE FIELD created_by ON TABLE organizer TYPE option<string>;
DEFINE FIELD data_source ON TABLE organizer TYPE string DEFAULT '';
DEFINE FIELD origin_id ON TABLE organizer TYPE option<string>;
DEFINE FIELD created_at ON TABLE organizer TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organizer TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Hobbies and their events
-- =======================================================================
DEFINE TABLE hobby SCHEMAFULL;
DEFINE FIELD name ON TABLE hobby TYPE string;
DEFINE FIELD description ON TABLE hobby TYPE string DEFAULT '';
DEFINE FIELD location_id ON TABLE hobby TYPE option<string>;
DEFINE FIELD organizer_id ON TABLE hobby TYPE option<string>;
DEFINE FIELD municipality_id ON TABLE hobby TYPE option<string>;
DEFINE FIELD created_by ON TABLE hobby TYPE option<string>;
DEFINE FIELD categories ON TABLE hobby TYPE array<string> DEFAULT [];
DEFINE FIELD audiences ON TABLE hobby TYPE array<string> DEFAULT [];
DEFINE FIELD price_type ON TABLE hobby TYPE string \
    ASSERT $value IN ['free', 'paid', 'annual', 'seasonal', 'one_time'];
DEFINE FIELD price_amount ON TABLE hobby TYPE int ASSERT $value >= 0;
DEFINE FIELD cover_image ON TABLE hobby TYPE option<string>;
DEFINE FIELD next_event_id ON TABLE hobby TYPE option<string>;
DEFINE FIELD data_source ON TABLE hobby TYPE string DEFAULT '';
DEFINE FIELD origin_id ON TABLE hobby TYPE option<string>;
DEFINE FIELD created_at ON TABLE hobby TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE hobby TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE hobby_event SCHEMAFULL;
DEFINE FIELD hobby_id ON TABLE hobby_event TYPE string;
DEFINE FIELD start_date ON TABLE hobby_event TYPE string;
DEFINE FIELD start_time ON TABLE hobby_event TYPE string;
DEFINE FIELD end_date ON TABLE hobby_event TYPE string;
DEFINE FIELD end_time ON TABLE hobby_event TYPE string;
DEFINE FIELD start_weekday ON TABLE hobby_event TYPE int \
    ASSERT $value >= 1 AND $value <= 7;
DEFINE FIELD recurrence_start_event ON TABLE hobby_event \
    TYPE option<string>;
DEFINE FIELD data_source ON TABLE hobby_event TYPE string DEFAULT '';
DEFINE FIELD origin_id ON TABLE hobby_event TYPE option<string>;
DEFINE FIELD created_at ON TABLE hobby_event TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE hobby_event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_hobby ON TABLE hobby_event COLUMNS hobby_id;

-- =======================================================================
-- Promotions and benefits
-- =======================================================================
DEFINE TABLE promotion SCHEMAFULL;
DEFINE FIELD name ON TABLE promotion TYPE string;
DEFINE FIELD description ON TABLE promotion TYPE string DEFAULT '';
DEFINE FIELD start_date ON TABLE promotion TYPE string;
DEFINE FIELD start_time ON TABLE promotion TYPE string;
DEFINE FIELD end_date ON TABLE promotion TYPE string;
DEFINE FIELD end_time ON TABLE promotion TYPE string;
DEFINE FIELD cover_image ON TABLE promotion TYPE option<string>;
DEFINE FIELD location_id ON TABLE promotion TYPE option<string>;
DEFINE FIELD organizer_id ON TABLE promotion TYPE option<string>;
DEFINE FIELD municipality_id ON TABLE promotion TYPE option<string>;
DEFINE FIELD created_by ON TABLE promotion TYPE option<string>;
DEFINE FIELD available_count ON TABLE promotion TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD used_count ON TABLE promotion TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD created_at ON TABLE promotion TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE promotion TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE benefit SCHEMAFULL;
DEFINE FIELD promotion_id ON TABLE benefit TYPE string;
DEFINE FIELD user_id ON TABLE benefit TYPE option<string>;
DEFINE FIELD created_at ON TABLE benefit TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_benefit_promotion ON TABLE benefit COLUMNS promotion_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Version the newest known migration brings the schema to.
pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Version recorded in `_migration`, or 0 on a fresh database.
pub async fn schema_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

/// Fail unless every known migration has been applied.
pub async fn check_schema<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let current = schema_version(db).await?;
    let required = latest_schema_version();
    if current < required {
        return Err(DbError::SchemaOutdated { current, required });
    }
    Ok(current)
}

/// Apply every migration newer than the recorded schema version.
///
/// Creates the `_migration` tracking table on first run. Running it
/// again on an up-to-date database does nothing.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    let current_version = schema_version(db).await?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}': {e}",
                migration.version, migration.name
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!("recording v{}: {e}", migration.version))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Raw DDL of schema version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
