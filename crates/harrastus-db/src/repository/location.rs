//! SurrealDB implementation of [`LocationRepository`].

use chrono::{DateTime, Utc};
use harrastus_core::error::HarrastusResult;
use harrastus_core::models::coordinate::Coordinate;
use harrastus_core::models::location::{CreateLocation, Location, UpdateLocation};
use harrastus_core::repository::LocationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{opt_id_str, parse_id, parse_opt_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LocationRowWithId {
    record_id: String,
    name: String,
    address: String,
    zip_code: String,
    city: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    municipality_id: Option<String>,
    created_by: Option<String>,
    data_source: String,
    origin_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LocationRowWithId {
    fn try_into_location(self) -> Result<Location, DbError> {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        };
        Ok(Location {
            id: parse_id("record_id", &self.record_id)?,
            name: self.name,
            address: self.address,
            zip_code: self.zip_code,
            city: self.city,
            coordinates,
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
pub struct SurrealLocationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLocationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LocationRepository for SurrealLocationRepository<C> {
    async fn create(&self, input: CreateLocation) -> HarrastusResult<Location> {
        let id = Uuid::new_v4();
        self.db
            .query(
                "CREATE type::record('location', $id) SET \
                 name = $name, address = $address, \
                 zip_code = $zip_code, city = $city, \
                 latitude = $latitude, longitude = $longitude, \
                 municipality_id = $municipality_id, created_by = $created_by, \
                 data_source = $data_source, origin_id = $origin_id",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .bind(("zip_code", input.zip_code))
            .bind(("city", input.city))
            .bind(("latitude", input.coordinates.map(|c| c.latitude)))
            .bind(("longitude", input.coordinates.map(|c| c.longitude)))
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

    async fn get_by_id(&self, id: Uuid) -> HarrastusResult<Location> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('location', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<LocationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("location", id))?;
        Ok(row.try_into_location()?)
    }

    async fn update(&self, id: Uuid, input: UpdateLocation) -> HarrastusResult<Location> {
        self.get_by_id(id).await?;

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if input.zip_code.is_some() {
            sets.push("zip_code = $zip_code");
        }
        if input.city.is_some() {
            sets.push("city = $city");
        }
        if input.coordinates.is_some() {
            sets.push("latitude = $latitude, longitude = $longitude");
        }
        if input.municipality_id.is_some() {
            sets.push("municipality_id = $municipality_id");
        }
        if input.created_by.is_some() {
            sets.push("created_by = $created_by");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('location', $id) SET {}",
            sets.join(", ")
        );
        let mut builder = self.db.query(&query).bind(("id", id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(address) = input.address {
            builder = builder.bind(("address", address));
        }
        if let Some(zip_code) = input.zip_code {
            builder = builder.bind(("zip_code", zip_code));
        }
        if let Some(city) = input.city {
            builder = builder.bind(("city", city));
        }
        if let Some(coordinates) = input.coordinates {
            builder = builder
                .bind(("latitude", coordinates.map(|c| c.latitude)))
                .bind(("longitude", coordinates.map(|c| c.longitude)));
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

    async fn list(&self) -> HarrastusResult<Vec<Location>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM location ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<LocationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(LocationRowWithId::try_into_location)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
