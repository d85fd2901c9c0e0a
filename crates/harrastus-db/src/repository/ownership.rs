//! Ownership facts read across the four reconciled tables.

use std::collections::BTreeSet;

use harrastus_core::error::HarrastusResult;
use harrastus_core::models::permission::{OwnedResource, ResourceKind};
use harrastus_core::repository::OwnershipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{id_strs, parse_id, parse_opt_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OwnershipRow {
    record_id: String,
    municipality_id: Option<String>,
    created_by: Option<String>,
}

impl OwnershipRow {
    fn try_into_owned(self, kind: ResourceKind) -> Result<OwnedResource, DbError> {
        Ok(OwnedResource {
            kind,
            id: parse_id("record_id", &self.record_id)?,
            municipality_id: parse_opt_id("municipality_id", self.municipality_id)?,
            created_by: parse_opt_id("created_by", self.created_by)?,
        })
    }
}

/// Table names equal the kinds' wire names.
fn table(kind: ResourceKind) -> &'static str {
    kind.as_str()
}

#[derive(Clone)]
pub struct SurrealOwnershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOwnershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OwnershipRepository for SurrealOwnershipRepository<C> {
    async fn get_owned(&self, kind: ResourceKind, id: Uuid) -> HarrastusResult<OwnedResource> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, municipality_id, created_by \
                 FROM type::record($table, $id)",
            )
            .bind(("table", table(kind).to_string()))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<OwnershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(table(kind), id))?;
        Ok(row.try_into_owned(kind)?)
    }

    async fn list_owned(&self, kind: ResourceKind) -> HarrastusResult<Vec<OwnedResource>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, municipality_id, created_by \
                 FROM type::table($table)",
            )
            .bind(("table", table(kind).to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<OwnershipRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_owned(kind))
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn entitled_ids(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        municipality_ids: &[Uuid],
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE meta::id(id) FROM type::table($table) \
                 WHERE created_by = $user_id OR municipality_id IN $municipality_ids",
            )
            .bind(("table", table(kind).to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("municipality_ids", id_strs(municipality_ids)))
            .await
            .map_err(DbError::from)?;
        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(ids
            .iter()
            .map(|id| parse_id("record_id", id))
            .collect::<Result<BTreeSet<_>, DbError>>()?)
    }
}
