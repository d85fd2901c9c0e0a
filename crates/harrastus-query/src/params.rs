//! Typed list queries parsed from raw request parameters.
//!
//! Basic parameters are validated together so a caller sees every bad
//! field at once. Ordering (and with it the geo point) is only parsed
//! after the basic parameters are valid.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveTime};
use harrastus_core::error::{FieldErrors, HarrastusResult};
use harrastus_core::models::hobby::PriceType;
use uuid::Uuid;

use crate::geo::{
    GeoQueryPoint, MAX_DISTANCE, NEAR_LATITUDE, NEAR_LONGITUDE, SortDirection, parse_max_distance,
};

pub const CATEGORY: &str = "category";
pub const AUDIENCE: &str = "audience";
pub const SEARCH: &str = "search";
pub const PRICE_TYPE: &str = "price_type";
pub const EDITABLE_ONLY: &str = "editable_only";
pub const USABLE_ONLY: &str = "usable_only";
pub const HOBBY: &str = "hobby";
pub const ORDERING: &str = "ordering";
pub const START_DATE_FROM: &str = "start_date_from";
pub const START_DATE_TO: &str = "start_date_to";
pub const START_TIME_FROM: &str = "start_time_from";
pub const START_TIME_TO: &str = "start_time_to";
pub const START_WEEKDAY: &str = "start_weekday";
pub const EXCLUDE_PAST_EVENTS: &str = "exclude_past_events";

/// Raw query string parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key, value);
        }
        params
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Last value given for `key`, if the key is present at all.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.last()).map(String::as_str)
    }

    /// Like [`get`](Self::get) but treats blank values as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

fn parse_bool(params: &QueryParams, key: &str, errors: &mut FieldErrors) -> bool {
    match params.get_non_empty(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) if v == "true" || v == "1" => true,
        Some(v) if v == "false" || v == "0" => false,
        Some(_) => {
            errors.add(key, "Enter a valid boolean.");
            false
        }
    }
}

fn parse_uuid(raw: &str, key: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(key, format!("\u{201c}{raw}\u{201d} is not a valid UUID."));
            None
        }
    }
}

fn parse_uuid_set(params: &QueryParams, key: &str, errors: &mut FieldErrors) -> BTreeSet<Uuid> {
    params
        .get_all(key)
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .filter_map(|raw| parse_uuid(raw, key, errors))
        .collect()
}

fn parse_date(params: &QueryParams, key: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let raw = params.get_non_empty(key)?;
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(key, "Enter a valid date.");
            None
        }
    }
}

fn parse_time(params: &QueryParams, key: &str, errors: &mut FieldErrors) -> Option<NaiveTime> {
    let raw = params.get_non_empty(key)?.trim();
    let parsed = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"));
    match parsed {
        Ok(time) => Some(time),
        Err(_) => {
            errors.add(key, "Enter a valid time.");
            None
        }
    }
}

/// Known price types filter; anything else is ignored.
fn parse_price_type(params: &QueryParams) -> Option<PriceType> {
    params.get_non_empty(PRICE_TYPE).and_then(PriceType::parse)
}

/// Search terms split on commas and whitespace.
pub fn search_terms(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.replace(',', " ")
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

/// Parse the `nearest`/`-nearest` ordering together with its point.
fn parse_nearest(
    params: &QueryParams,
    direction: SortDirection,
) -> HarrastusResult<GeoQueryPoint> {
    GeoQueryPoint::from_params(
        params.get(NEAR_LATITUDE),
        params.get(NEAR_LONGITUDE),
        params.get(MAX_DISTANCE),
        direction,
    )
}

fn invalid_ordering(raw: &str) -> FieldErrors {
    FieldErrors::single(
        ORDERING,
        format!("Select a valid choice. {raw} is not one of the available choices."),
    )
}

/// Ordering for hobbies and promotions, which only know `nearest`.
fn parse_geo_ordering(params: &QueryParams) -> HarrastusResult<Option<GeoQueryPoint>> {
    let Some(raw) = params.get_non_empty(ORDERING) else {
        return Ok(None);
    };
    match SortDirection::split_key(raw.trim()) {
        (direction, "nearest") => parse_nearest(params, direction).map(Some),
        _ => Err(invalid_ordering(raw).into()),
    }
}

// ---------------------------------------------------------------------------
// Typed queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HobbyQuery {
    pub categories: BTreeSet<Uuid>,
    pub audiences: BTreeSet<Uuid>,
    pub search: Vec<String>,
    pub price_type: Option<PriceType>,
    pub editable_only: bool,
    pub geo: Option<GeoQueryPoint>,
}

impl HobbyQuery {
    pub fn from_params(params: &QueryParams) -> HarrastusResult<Self> {
        let mut errors = FieldErrors::new();
        let categories = parse_uuid_set(params, CATEGORY, &mut errors);
        let audiences = parse_uuid_set(params, AUDIENCE, &mut errors);
        let editable_only = parse_bool(params, EDITABLE_ONLY, &mut errors);
        errors.into_result()?;

        Ok(Self {
            categories,
            audiences,
            search: search_terms(params.get(SEARCH)),
            price_type: parse_price_type(params),
            editable_only,
            geo: parse_geo_ordering(params)?,
        })
    }
}

/// Date, time and weekday constraints shared by events and promotions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalFilter {
    pub start_date_from: Option<NaiveDate>,
    pub start_date_to: Option<NaiveDate>,
    pub start_time_from: Option<NaiveTime>,
    pub start_time_to: Option<NaiveTime>,
    /// ISO weekdays, 1 = Monday.
    pub start_weekdays: BTreeSet<u8>,
    pub exclude_past_events: bool,
}

impl TemporalFilter {
    fn parse(params: &QueryParams, errors: &mut FieldErrors) -> Self {
        let mut start_weekdays = BTreeSet::new();
        for raw in params.get_all(START_WEEKDAY) {
            match raw.trim().parse::<u8>() {
                Ok(day @ 1..=7) => {
                    start_weekdays.insert(day);
                }
                _ => errors.add(
                    START_WEEKDAY,
                    format!("Select a valid choice. {raw} is not one of the available choices."),
                ),
            }
        }
        Self {
            start_date_from: parse_date(params, START_DATE_FROM, errors),
            start_date_to: parse_date(params, START_DATE_TO, errors),
            start_time_from: parse_time(params, START_TIME_FROM, errors),
            start_time_to: parse_time(params, START_TIME_TO, errors),
            start_weekdays,
            exclude_past_events: parse_bool(params, EXCLUDE_PAST_EVENTS, errors),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOrdering {
    Nearest(GeoQueryPoint),
    StartDate(SortDirection),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HobbyEventQuery {
    pub categories: BTreeSet<Uuid>,
    pub audiences: BTreeSet<Uuid>,
    pub search: Vec<String>,
    pub price_type: Option<PriceType>,
    pub hobby: Option<Uuid>,
    pub temporal: TemporalFilter,
    pub ordering: Option<EventOrdering>,
}

impl HobbyEventQuery {
    pub fn from_params(params: &QueryParams) -> HarrastusResult<Self> {
        let mut errors = FieldErrors::new();
        let categories = parse_uuid_set(params, CATEGORY, &mut errors);
        let audiences = parse_uuid_set(params, AUDIENCE, &mut errors);
        let hobby = params
            .get_non_empty(HOBBY)
            .and_then(|raw| parse_uuid(raw, HOBBY, &mut errors));
        let temporal = TemporalFilter::parse(params, &mut errors);
        errors.into_result()?;

        let ordering = match params.get_non_empty(ORDERING) {
            None => None,
            Some(raw) => match SortDirection::split_key(raw.trim()) {
                (direction, "nearest") => Some(EventOrdering::Nearest(parse_nearest(
                    params, direction,
                )?)),
                (direction, "start_date") => {
                    // Radius only applies to nearest ordering but is still
                    // validated.
                    parse_max_distance(params.get(MAX_DISTANCE))?;
                    Some(EventOrdering::StartDate(direction))
                }
                _ => return Err(invalid_ordering(raw).into()),
            },
        };

        Ok(Self {
            categories,
            audiences,
            search: search_terms(params.get(SEARCH)),
            price_type: parse_price_type(params),
            hobby,
            temporal,
            ordering,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionQuery {
    pub search: Vec<String>,
    pub temporal: TemporalFilter,
    pub usable_only: bool,
    pub editable_only: bool,
    pub geo: Option<GeoQueryPoint>,
}

impl PromotionQuery {
    pub fn from_params(params: &QueryParams) -> HarrastusResult<Self> {
        let mut errors = FieldErrors::new();
        let temporal = TemporalFilter::parse(params, &mut errors);
        let usable_only = parse_bool(params, USABLE_ONLY, &mut errors);
        let editable_only = parse_bool(params, EDITABLE_ONLY, &mut errors);
        errors.into_result()?;

        Ok(Self {
            search: search_terms(params.get(SEARCH)),
            temporal,
            usable_only,
            editable_only,
            geo: parse_geo_ordering(params)?,
        })
    }
}
