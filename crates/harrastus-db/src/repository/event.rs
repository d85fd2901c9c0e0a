//! SurrealDB implementation of [`HobbyEventRepository`].
//!
//! `start_weekday` is always derived from `start_date` here, on create
//! and on update, so callers cannot store an inconsistent weekday.

use chrono::{DateTime, Utc};
use harrastus_core::error::HarrastusResult;
use harrastus_core::models::event::{CreateHobbyEvent, HobbyEvent, UpdateHobbyEvent, iso_weekday};
use harrastus_core::repository::HobbyEventRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{date_str, id_strs, opt_id_str, parse_date, parse_id, parse_opt_id, parse_time, time_str};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct EventRowWithId {
    record_id: String,
    hobby_id: String,
    start_date: String,
    start_time: String,
    end_date: String,
    end_time: String,
    start_weekday: u32,
    recurrence_start_event: Option<String>,
    data_source: String,
    origin_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<HobbyEvent, DbError> {
        let start_date = parse_date("start_date", &self.start_date)?;
        Ok(HobbyEvent {
            id: parse_id("record_id", &self.record_id)?,
            hobby_id: parse_id("hobby_id", &self.hobby_id)?,
            start_date,
            start_time: parse_time("start_time", &self.start_time)?,
            end_date: parse_date("end_date", &self.end_date)?,
            end_time: parse_time("end_time", &self.end_time)?,
            start_weekday: iso_weekday(start_date),
            recurrence_start_event: parse_opt_id(
                "recurrence_start_event",
                self.recurrence_start_event,
            )?,
            data_source: self.data_source,
            origin_id: self.origin_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_EVENT: &str = "SELECT meta::id(id) AS record_id, * FROM";

/// One `CREATE` statement for event number `n` of a batch, with
/// parameters suffixed by `n`.
fn create_statement(n: usize) -> String {
    format!(
        "CREATE type::record('hobby_event', $id_{n}) SET \
         hobby_id = $hobby_id_{n}, \
         start_date = $start_date_{n}, start_time = $start_time_{n}, \
         end_date = $end_date_{n}, end_time = $end_time_{n}, \
         start_weekday = $start_weekday_{n}, \
         recurrence_start_event = $recurrence_start_event_{n}, \
         data_source = $data_source_{n}, origin_id = $origin_id_{n};"
    )
}

#[derive(Clone)]
pub struct SurrealHobbyEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealHobbyEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select(&self, filter: &str, key: &str, value: String) -> Result<Vec<HobbyEvent>, DbError> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_EVENT} hobby_event {filter} ORDER BY start_date ASC, start_time ASC"
            ))
            .bind((key.to_string(), value))
            .await?;
        let rows: Vec<EventRowWithId> = result.take(0)?;
        rows.into_iter().map(EventRowWithId::try_into_event).collect()
    }
}

impl<C: Connection> HobbyEventRepository for SurrealHobbyEventRepository<C> {
    async fn create(&self, input: CreateHobbyEvent) -> HarrastusResult<HobbyEvent> {
        let mut created = self.create_many(vec![input]).await?;
        created
            .pop()
            .ok_or_else(|| DbError::Query("event insert returned no rows".into()).into())
    }

    async fn create_many(&self, inputs: Vec<CreateHobbyEvent>) -> HarrastusResult<Vec<HobbyEvent>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = inputs.iter().map(|_| Uuid::new_v4()).collect();

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for n in 0..inputs.len() {
            sql.push_str(&create_statement(n));
            sql.push('\n');
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut builder = self.db.query(sql);
        for (n, (input, id)) in inputs.into_iter().zip(&ids).enumerate() {
            builder = builder
                .bind((format!("id_{n}"), id.to_string()))
                .bind((format!("hobby_id_{n}"), input.hobby_id.to_string()))
                .bind((format!("start_date_{n}"), date_str(input.start_date)))
                .bind((format!("start_time_{n}"), time_str(input.start_time)))
                .bind((format!("end_date_{n}"), date_str(input.end_date)))
                .bind((format!("end_time_{n}"), time_str(input.end_time)))
                .bind((format!("start_weekday_{n}"), u32::from(input.start_weekday())))
                .bind((
                    format!("recurrence_start_event_{n}"),
                    opt_id_str(input.recurrence_start_event),
                ))
                .bind((format!("data_source_{n}"), input.data_source))
                .bind((format!("origin_id_{n}"), input.origin_id));
        }
        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;
        debug!(count = ids.len(), "Inserted hobby events");

        let mut result = self
            .db
            .query(format!(
                "{SELECT_EVENT} hobby_event WHERE meta::id(id) IN $ids \
                 ORDER BY start_date ASC, start_time ASC"
            ))
            .bind(("ids", id_strs(&ids)))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(EventRowWithId::try_into_event)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn get_by_id(&self, id: Uuid) -> HarrastusResult<HobbyEvent> {
        let mut result = self
            .db
            .query(format!("{SELECT_EVENT} type::record('hobby_event', $id)"))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("hobby_event", id))?;
        Ok(row.try_into_event()?)
    }

    /// Merges the update into the stored event and rewrites it.
    async fn update(&self, id: Uuid, input: UpdateHobbyEvent) -> HarrastusResult<HobbyEvent> {
        let current = self.get_by_id(id).await?;
        let hobby_id = input.hobby_id.unwrap_or(current.hobby_id);
        let start_date = input.start_date.unwrap_or(current.start_date);
        let start_time = input.start_time.unwrap_or(current.start_time);
        let end_date = input.end_date.unwrap_or(current.end_date);
        let end_time = input.end_time.unwrap_or(current.end_time);

        self.db
            .query(
                "UPDATE type::record('hobby_event', $id) SET \
                 hobby_id = $hobby_id, \
                 start_date = $start_date, start_time = $start_time, \
                 end_date = $end_date, end_time = $end_time, \
                 start_weekday = $start_weekday, \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("hobby_id", hobby_id.to_string()))
            .bind(("start_date", date_str(start_date)))
            .bind(("start_time", time_str(start_time)))
            .bind(("end_date", date_str(end_date)))
            .bind(("end_time", time_str(end_time)))
            .bind(("start_weekday", u32::from(iso_weekday(start_date))))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        self.get_by_id(id).await
    }

    /// Deleting a series base detaches its siblings instead of removing
    /// them.
    async fn delete(&self, id: Uuid) -> HarrastusResult<()> {
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE hobby_event SET recurrence_start_event = NONE \
                     WHERE recurrence_start_event = $id; \
                 DELETE type::record('hobby_event', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;
        Ok(())
    }

    async fn list(&self) -> HarrastusResult<Vec<HobbyEvent>> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_EVENT} hobby_event ORDER BY start_date ASC, start_time ASC"
            ))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(EventRowWithId::try_into_event)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_by_hobby(&self, hobby_id: Uuid) -> HarrastusResult<Vec<HobbyEvent>> {
        Ok(self
            .select("WHERE hobby_id = $hobby_id", "hobby_id", hobby_id.to_string())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_statements_use_distinct_parameters() {
        let first = create_statement(0);
        let second = create_statement(1);
        assert!(first.contains("$id_0") && first.contains("$origin_id_0"));
        assert!(second.contains("$start_weekday_1"));
        assert!(!second.contains("_0"));
    }
}
