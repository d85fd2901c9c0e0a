//! Hobby event domain model.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarrastusError, HarrastusResult};

pub const DATE_OUT_OF_RANGE: &str = "Date is out of range.";

/// ISO 8601 weekday number of a date: 1 = Monday .. 7 = Sunday.
pub fn iso_weekday(date: NaiveDate) -> u8 {
    // number_from_monday() is always in 1..=7
    date.weekday().number_from_monday() as u8
}

/// A single occurrence of a hobby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HobbyEvent {
    pub id: Uuid,
    pub hobby_id: Uuid,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    /// Derived from `start_date` at write time.
    pub start_weekday: u8,
    /// Base event of the recurrence series this event was generated from.
    pub recurrence_start_event: Option<Uuid>,
    pub data_source: String,
    pub origin_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HobbyEvent {
    /// Build the creation input for a copy of this event shifted by
    /// `delta_days`, pointing back at this event as its series base.
    ///
    /// Fails on the shifted field when a date would leave the calendar.
    pub fn derive_sibling(&self, delta_days: i64) -> HarrastusResult<CreateHobbyEvent> {
        let delta = Duration::try_days(delta_days);
        Ok(CreateHobbyEvent {
            hobby_id: self.hobby_id,
            start_date: shift_date("start_date", self.start_date, delta)?,
            start_time: self.start_time,
            end_date: shift_date("end_date", self.end_date, delta)?,
            end_time: self.end_time,
            recurrence_start_event: Some(self.id),
            data_source: self.data_source.clone(),
            origin_id: self.origin_id.clone(),
        })
    }
}

fn shift_date(field: &str, date: NaiveDate, delta: Option<Duration>) -> HarrastusResult<NaiveDate> {
    delta
        .and_then(|d| date.checked_add_signed(d))
        .ok_or_else(|| HarrastusError::validation(field, DATE_OUT_OF_RANGE))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHobbyEvent {
    pub hobby_id: Uuid,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub recurrence_start_event: Option<Uuid>,
    pub data_source: String,
    pub origin_id: Option<String>,
}

impl CreateHobbyEvent {
    pub fn new(
        hobby_id: Uuid,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            hobby_id,
            start_date,
            start_time,
            end_date,
            end_time,
            recurrence_start_event: None,
            data_source: String::new(),
            origin_id: None,
        }
    }

    pub fn start_weekday(&self) -> u8 {
        iso_weekday(self.start_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateHobbyEvent {
    pub hobby_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
}
