//! SurrealDB implementation of [`PromotionRepository`].

use chrono::{DateTime, Utc};
use harrastus_core::error::{FieldErrors, HarrastusResult};
use harrastus_core::models::benefit::Benefit;
use harrastus_core::models::promotion::{CreatePromotion, Promotion, UpdatePromotion};
use harrastus_core::repository::PromotionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{date_str, opt_id_str, parse_date, parse_id, parse_opt_id, parse_time, time_str};
use crate::error::DbError;

const PROMOTIONS_USED_UP: &str = "All available promotions have been used";

#[derive(Debug, SurrealValue)]
struct PromotionRowWithId {
    record_id: String,
    name: String,
    description: String,
    start_date: String,
    start_time: String,
    end_date: String,
    end_time: String,
    cover_image: Option<String>,
    location_id: Option<String>,
    organizer_id: Option<String>,
    municipality_id: Option<String>,
    created_by: Option<String>,
    available_count: u32,
    used_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PromotionRowWithId {
    fn try_into_promotion(self) -> Result<Promotion, DbError> {
        Ok(Promotion {
            id: parse_id("record_id", &self.record_id)?,
            name: self.name,
            description: self.description,
            start_date: parse_date("start_date", &self.start_date)?,
            start_time: parse_time("start_time", &self.start_time)?,
            end_date: parse_date("end_date", &self.end_date)?,
            end_time: parse_time("end_time", &self.end_time)?,
            cover_image: self.cover_image,
            location_id: parse_opt_id("location_id", self.location_id)?,
            organizer_id: parse_opt_id("organizer_id", self.organizer_id)?,
            municipality_id: parse_opt_id("municipality_id", self.municipality_id)?,
            created_by: parse_opt_id("created_by", self.created_by)?,
            available_count: self.available_count,
            used_count: self.used_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ClaimedRow {
    used_count: u32,
}

#[derive(Debug, SurrealValue)]
struct BenefitRow {
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SurrealPromotionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPromotionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PromotionRepository for SurrealPromotionRepository<C> {
    async fn create(&self, input: CreatePromotion) -> HarrastusResult<Promotion> {
        let id = Uuid::new_v4();
        self.db
            .query(
                "CREATE type::record('promotion', $id) SET \
                 name = $name, description = $description, \
                 start_date = $start_date, start_time = $start_time, \
                 end_date = $end_date, end_time = $end_time, \
                 cover_image = $cover_image, \
                 location_id = $location_id, organizer_id = $organizer_id, \
                 municipality_id = $municipality_id, created_by = $created_by, \
                 available_count = $available_count, used_count = 0",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("start_date", date_str(input.start_date)))
            .bind(("start_time", time_str(input.start_time)))
            .bind(("end_date", date_str(input.end_date)))
            .bind(("end_time", time_str(input.end_time)))
            .bind(("cover_image", input.cover_image))
            .bind(("location_id", opt_id_str(input.location_id)))
            .bind(("organizer_id", opt_id_str(input.organizer_id)))
            .bind(("municipality_id", opt_id_str(input.municipality_id)))
            .bind(("created_by", opt_id_str(input.created_by)))
            .bind(("available_count", input.available_count))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> HarrastusResult<Promotion> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('promotion', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<PromotionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("promotion", id))?;
        Ok(row.try_into_promotion()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePromotion) -> HarrastusResult<Promotion> {
        self.get_by_id(id).await?;

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.start_date.is_some() {
            sets.push("start_date = $start_date");
        }
        if input.start_time.is_some() {
            sets.push("start_time = $start_time");
        }
        if input.end_date.is_some() {
            sets.push("end_date = $end_date");
        }
        if input.end_time.is_some() {
            sets.push("end_time = $end_time");
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
        if input.available_count.is_some() {
            sets.push("available_count = $available_count");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('promotion', $id) SET {}",
            sets.join(", ")
        );
        let mut builder = self.db.query(&query).bind(("id", id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(start_date) = input.start_date {
            builder = builder.bind(("start_date", date_str(start_date)));
        }
        if let Some(start_time) = input.start_time {
            builder = builder.bind(("start_time", time_str(start_time)));
        }
        if let Some(end_date) = input.end_date {
            builder = builder.bind(("end_date", date_str(end_date)));
        }
        if let Some(end_time) = input.end_time {
            builder = builder.bind(("end_time", time_str(end_time)));
        }
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
        if let Some(available_count) = input.available_count {
            builder = builder.bind(("available_count", available_count));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        self.get_by_id(id).await
    }

    async fn list(&self) -> HarrastusResult<Vec<Promotion>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM promotion \
                 ORDER BY created_at ASC, id ASC",
            )
            .await
            .map_err(DbError::from)?;
        let rows: Vec<PromotionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(PromotionRowWithId::try_into_promotion)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    /// The increment is conditional on `used_count < available_count`, so
    /// concurrent claims can never push the count past the limit.
    async fn claim_benefit(
        &self,
        promotion_id: Uuid,
        user_id: Option<Uuid>,
    ) -> HarrastusResult<Benefit> {
        self.get_by_id(promotion_id).await?;

        let mut result = self
            .db
            .query(
                "UPDATE type::record('promotion', $id) \
                 SET used_count += 1, updated_at = time::now() \
                 WHERE used_count < available_count \
                 RETURN used_count",
            )
            .bind(("id", promotion_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let claimed: Vec<ClaimedRow> = result.take(0).map_err(DbError::from)?;
        if claimed.is_empty() {
            return Err(FieldErrors::non_field(PROMOTIONS_USED_UP).into());
        }

        let id = Uuid::new_v4();
        let mut result = self
            .db
            .query(
                "CREATE type::record('benefit', $id) SET \
                 promotion_id = $promotion_id, user_id = $user_id \
                 RETURN created_at",
            )
            .bind(("id", id.to_string()))
            .bind(("promotion_id", promotion_id.to_string()))
            .bind(("user_id", opt_id_str(user_id)))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<BenefitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("benefit", id))?;

        Ok(Benefit {
            id,
            promotion_id,
            user_id,
            created_at: row.created_at,
        })
    }
}
