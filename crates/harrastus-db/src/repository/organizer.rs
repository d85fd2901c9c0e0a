//! SurrealDB implementation of [`OrganizerRepository`].

use chrono::{DateTime, Utc};
use harrastus_core::error::HarrastusResult;
use harrastus_core::models::organizer::{CreateOrganizer, Organizer, UpdateOrganizer};
use harrastus_core::repository::OrganizerRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{opt_id_str, parse_id, parse_opt_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrganizerRowWithId {
    record_id: String,
    name: String,
    municipality_id: Option<String>,
    created_by: Option<String>,
    data_source: String,
    origin_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizerRowWithId {
    fn try_into_organizer(self) -> Result<Organizer, DbError> {
        Ok(Organizer {
            id: parse_id("record_id", &self.record_id)?,
            name: self.name,
            municipality_id: parse_opt_id("municipality_id", self.municipality_id)?,
            created_by: parse_opt_id("created_by", self.created_by)?,
            data_source: self.data_source,
            origin_id: self.origin_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealOrganizerRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizerRepository for SurrealOrganizerRepository<C> {
    async fn create(&self, input: CreateOrganizer) -> HarrastusResult<Organizer> {
        let id = Uuid::new_v4();
        self.db
            .query(
                "CREATE type::record('organizer', $id) SET \
                 name = $name, municipality_id = $municipality_id, \
                 created_by = $created_by, \
                 data_source = $data_source, origin_id = $origin_id",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("municipality_id", opt_id_str(input.municipality_id)))
            .bind(("created_by", opt_id_str(input.created_by)))
            .bind(("data_source", input.data_source))
            .bind(("origin_id", input.origin_id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> HarrastusResult<Organizer> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('organizer', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<OrganizerRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("organizer", id))?;
        Ok(row.try_into_organizer()?)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganizer) -> HarrastusResult<Organizer> {
        self.get_by_id(id).await?;

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.municipality_id.is_some() {
            sets.push("municipality_id = $municipality_id");
        }
        if input.created_by.is_some() {
            sets.push("created_by = $created_by");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organizer', $id) SET {}",
            sets.join(", ")
        );
        let mut builder = self.db.query(&query).bind(("id", id.to_string()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(municipality_id) = input.municipality_id {
            builder = builder.bind(("municipality_id", opt_id_str(municipality_id)));
        }
        if let Some(created_by) = input.created_by {
            builder = builder.bind(("created_by", opt_id_str(created_by)));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        self.get_by_id(id).await
    }

    async fn list(&self) -> HarrastusResult<Vec<Organizer>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM organizer ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<OrganizerRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(OrganizerRowWithId::try_into_organizer)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
