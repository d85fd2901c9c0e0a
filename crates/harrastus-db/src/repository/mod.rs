//! SurrealDB repository implementations.

mod catalog;
mod category;
mod event;
mod hobby;
mod location;
mod municipality;
mod organizer;
mod ownership;
mod permission;
mod promotion;

pub use catalog::SurrealCatalog;
pub use category::SurrealCategoryRepository;
pub use event::SurrealHobbyEventRepository;
pub use hobby::SurrealHobbyRepository;
pub use location::SurrealLocationRepository;
pub use municipality::SurrealMunicipalityRepository;
pub use organizer::SurrealOrganizerRepository;
pub use ownership::SurrealOwnershipRepository;
pub use permission::SurrealPermissionStore;
pub use promotion::SurrealPromotionRepository;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Row decoding helpers
// -----------------------------------------------------------------------

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

pub(crate) fn parse_id(field: &'static str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidRow {
        field,
        reason: e.to_string(),
    })
}

pub(crate) fn parse_opt_id(field: &'static str, raw: Option<String>) -> Result<Option<Uuid>, DbError> {
    raw.map(|r| parse_id(field, &r)).transpose()
}

pub(crate) fn parse_ids(field: &'static str, raw: &[String]) -> Result<Vec<Uuid>, DbError> {
    raw.iter().map(|r| parse_id(field, r)).collect()
}

pub(crate) fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| DbError::InvalidRow {
        field,
        reason: e.to_string(),
    })
}

pub(crate) fn parse_time(field: &'static str, raw: &str) -> Result<NaiveTime, DbError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|e| DbError::InvalidRow {
        field,
        reason: e.to_string(),
    })
}

pub(crate) fn date_str(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn time_str(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(crate) fn opt_id_str(id: Option<Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

pub(crate) fn id_strs(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}
