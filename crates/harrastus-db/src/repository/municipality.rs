//! SurrealDB implementation of [`MunicipalityRepository`].
//!
//! Moderator memberships live in `municipality_moderator` under a
//! deterministic record id, so adding an existing moderator is an
//! idempotent upsert.

use std::collections::BTreeSet;

use harrastus_core::error::HarrastusResult;
use harrastus_core::models::municipality::{CreateMunicipality, Municipality};
use harrastus_core::repository::MunicipalityRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_id;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MunicipalityRowWithId {
    record_id: String,
    name: String,
}

fn membership_key(municipality_id: Uuid, user_id: Uuid) -> String {
    format!("{municipality_id}_{user_id}")
}

#[derive(Clone)]
pub struct SurrealMunicipalityRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMunicipalityRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn moderators_of(&self, municipality_id: Uuid) -> Result<BTreeSet<Uuid>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE user_id FROM municipality_moderator \
                 WHERE municipality_id = $municipality_id",
            )
            .bind(("municipality_id", municipality_id.to_string()))
            .await?;
        let ids: Vec<String> = result.take(0)?;
        ids.iter().map(|id| parse_id("user_id", id)).collect()
    }

    async fn with_moderators(&self, row: MunicipalityRowWithId) -> Result<Municipality, DbError> {
        let id = parse_id("record_id", &row.record_id)?;
        Ok(Municipality {
            id,
            name: row.name,
            moderators: self.moderators_of(id).await?,
        })
    }
}

impl<C: Connection> MunicipalityRepository for SurrealMunicipalityRepository<C> {
    async fn create(&self, input: CreateMunicipality) -> HarrastusResult<Municipality> {
        let id = Uuid::new_v4();
        self.db
            .query("CREATE type::record('municipality', $id) SET name = $name")
            .bind(("id", id.to_string()))
            .bind(("name", input.name.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        Ok(Municipality {
            id,
            name: input.name,
            moderators: BTreeSet::new(),
        })
    }

    async fn get_by_id(&self, id: Uuid) -> HarrastusResult<Municipality> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, name FROM type::record('municipality', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<MunicipalityRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("municipality", id))?;
        Ok(self.with_moderators(row).await?)
    }

    async fn list(&self) -> HarrastusResult<Vec<Municipality>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, name FROM municipality ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<MunicipalityRowWithId> = result.take(0).map_err(DbError::from)?;

        let mut municipalities = Vec::with_capacity(rows.len());
        for row in rows {
            municipalities.push(self.with_moderators(row).await?);
        }
        Ok(municipalities)
    }

    async fn add_moderator(&self, municipality_id: Uuid, user_id: Uuid) -> HarrastusResult<()> {
        // NotFound for an unknown municipality.
        self.get_by_id(municipality_id).await?;
        self.db
            .query(
                "UPSERT type::record('municipality_moderator', $key) SET \
                 municipality_id = $municipality_id, user_id = $user_id",
            )
            .bind(("key", membership_key(municipality_id, user_id)))
            .bind(("municipality_id", municipality_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;
        Ok(())
    }

    async fn remove_moderator(&self, municipality_id: Uuid, user_id: Uuid) -> HarrastusResult<()> {
        self.db
            .query("DELETE type::record('municipality_moderator', $key)")
            .bind(("key", membership_key(municipality_id, user_id)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;
        Ok(())
    }

    async fn get_moderators(&self, municipality_id: Uuid) -> HarrastusResult<BTreeSet<Uuid>> {
        Ok(self.moderators_of(municipality_id).await?)
    }

    async fn get_moderated_by(&self, user_id: Uuid) -> HarrastusResult<Vec<Municipality>> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE municipality_id FROM municipality_moderator \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;

        let mut municipalities = Vec::with_capacity(ids.len());
        for id in &ids {
            let id = parse_id("municipality_id", id)?;
            municipalities.push(self.get_by_id(id).await?);
        }
        municipalities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(municipalities)
    }
}
