//! SurrealDB implementation of [`HobbyRepository`].

use chrono::{DateTime, Utc};
use harrastus_core::error::HarrastusResult;
use harrastus_core::models::hobby::{CreateHobby, Hobby, PriceType, UpdateHobby};
use harrastus_core::repository::HobbyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{id_strs, opt_id_str, parse_id, parse_ids, parse_opt_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct HobbyRowWithId {
    record_id: String,
    name: String,
    description: String,
    location_id: Option<String>,
    organizer_id: Option<String>,
    municipality_id: Option<String>,
    created_by: Option<String>,
    categories: Vec<String>,
    audiences: Vec<String>,
    price_type: String,
    price_amount: i64,
    cover_image: Option<String>,
    next_event_id: Option<String>,
    data_source: String,
    origin_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HobbyRowWithId {
    fn try_into_hobby(self) -> Result<Hobby, DbError> {
        let price_type = PriceType::parse(&self.price_type).ok_or_else(|| DbError::InvalidRow {
            field: "price_type",
            reason: format!("unknown price type {}", self.price_type),
        })?;
        Ok(Hobby {
            id: parse_id("record_id", &self.record_id)?,
            name: self.name,
            description: self.description,
            location_id: parse_opt_id("location_id", self.location_id)?,
            organizer_id: parse_opt_id("organizer_id", self.organizer_id)?,
            municipality_id: parse_opt_id("municipality_id", self.municipality_id)?,
            created_by: parse_opt_id("created_by", self.created_by)?,
            categories: parse_ids("categories", &self.categories)?,
            audiences: parse_ids("audiences", &self.audiences)?,
            price_type,
            price_amount: self.price_amount,
            cover_image: self.cover_image,
            next_event_id: parse_opt_id("next_event_id", self.next_event_id)?,
            data_source: self.data_source,
            origin_id: self.origin_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealHobbyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealHobbyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> HobbyRepository for SurrealHobbyRepository<C> {
    async fn create(&self, input: CreateHobby) -> HarrastusResult<Hobby> {
        let id = Uuid::new_v4();
        self.db
            .query(
                "CREATE type::record('hobby', $id) SET \
                 name = $name, description = $description, \
                 location_id = $location_id, organizer_id = $organizer_id, \
                 municipality_id = $municipality_id, created_by = $created_by, \
                 categories = $categories, audiences = $audiences, \
                 price_type = $price_type, price_amount = $price_amount, \
                 cover_image = $cover_image, next_event_id = NONE, \
                 data_source = $data_source, origin_id = $origin_id",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("location_id", opt_id_str(input.location_id)))
            .bind(("organizer_id", opt_id_str(input.organizer_id)))
            .bind(("municipality_id", opt_id_str(input.municipality_id)))
            .bind(("created_by", opt_id_str(input.created_by)))
            .bind(("categories", id_strs(&input.categories)))
            .bind(("audiences", id_strs(&input.audiences)))
            .bind(("price_type", input.price_type.as_str().to_string()))
            .bind(("price_amount", input.price_amount))
            .bind(("cover_image", input.cover_image))
            .bind(("data_source", input.data_source))
            .bind(("origin_id", input.origin_id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> HarrastusResult<Hobby> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('hobby', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<HobbyRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("hobby", id))?;
        Ok(row.try_into_hobby()?)
    }

    async fn update(&self, id: Uuid, input: UpdateHobby) -> HarrastusResult<Hobby> {
        self.get_by_id(id).await?;

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.location_id.is_some() {
            sets.push("location_id = $location_id");
        }
        if input.organizer_id.is_some() {
            sets.push("organizer_id = $organizer_id");
        }
        if input.municipality_id.is_some() {
            sets.push("municipality_id = $municipality_id");
        }
        if input.created_by.is_some() {
            sets.push("created_by = $created_by");
        }
        if input.categories.is_some() {
            sets.push("categories = $categories");
        }
        if input.audiences.is_some() {
            sets.push("audiences = $audiences");
        }
        if input.price_type.is_some() {
            sets.push("price_type = $price_type");
        }
        if input.price_amount.is_some() {
            sets.push("price_amount = $price_amount");
        }
        if input.cover_image.is_some() {
            sets.push("cover_image = $cover_image");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('hobby', $id) SET {}",
            sets.join(", ")
        );
        let mut builder = self.db.query(&query).bind(("id", id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        // Nullable references: Some(None) clears the field.
        if let Some(location_id) = input.location_id {
            builder = builder.bind(("location_id", opt_id_str(location_id)));
        }
        if let Some(organizer_id) = input.organizer_id {
            builder = builder.bind(("organizer_id", opt_id_str(organizer_id)));
        }
        if let Some(municipality_id) = input.municipality_id {
            builder = builder.bind(("municipality_id", opt_id_str(municipality_id)));
        }
        if let Some(created_by) = input.created_by {
            builder = builder.bind(("created_by", opt_id_str(created_by)));
        }
        if let Some(categories) = input.categories {
            builder = builder.bind(("categories", id_strs(&categories)));
        }
        if let Some(audiences) = input.audiences {
            builder = builder.bind(("audiences", id_strs(&audiences)));
        }
        if let Some(price_type) = input.price_type {
            builder = builder.bind(("price_type", price_type.as_str().to_string()));
        }
        if let Some(price_amount) = input.price_amount {
            builder = builder.bind(("price_amount", price_amount));
        }
        if let Some(cover_image) = input.cover_image {
            builder = builder.bind(("cover_image", cover_image));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> HarrastusResult<()> {
        self.get_by_id(id).await?;
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE hobby_event WHERE hobby_id = $id; \
                 DELETE object_permission WHERE kind = 'hobby' AND resource_id = $id; \
                 DELETE type::record('hobby', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;
        Ok(())
    }

    /// Insertion order. Distance ordering is stable, so equally distant
    /// hobbies keep it.
    async fn list(&self) -> HarrastusResult<Vec<Hobby>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM hobby ORDER BY created_at ASC, id ASC")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<HobbyRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(HobbyRowWithId::try_into_hobby)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn set_next_event(&self, id: Uuid, next_event_id: Option<Uuid>) -> HarrastusResult<()> {
        self.db
            .query("UPDATE type::record('hobby', $id) SET next_event_id = $next_event_id")
            .bind(("id", id.to_string()))
            .bind(("next_event_id", opt_id_str(next_event_id)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;
        Ok(())
    }
}
