#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use harrastus_core::models::{
    category::{CategoryNode, TaxonomyKind},
    coordinate::Coordinate,
    event::{HobbyEvent, iso_weekday},
    hobby::{Hobby, PriceType},
    localized::LocalizedText,
    location::Location,
    organizer::Organizer,
    promotion::Promotion,
};
use harrastus_query::{Catalog, CatalogParts, CategoryTree};
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// 2024-03-15 12:00, a Friday.
pub fn now() -> NaiveDateTime {
    date(2024, 3, 15).and_time(time(12, 0))
}

pub fn category(kind: TaxonomyKind, name: &str, parent: Option<Uuid>) -> CategoryNode {
    CategoryNode {
        id: Uuid::new_v4(),
        kind,
        name: LocalizedText::new(name),
        parent_id: parent,
        cover_image: None,
        data_source: String::new(),
        origin_id: None,
    }
}

pub fn location(name: &str, coordinates: Option<(f64, f64)>) -> Location {
    Location {
        id: Uuid::new_v4(),
        name: name.into(),
        address: String::new(),
        zip_code: String::new(),
        city: String::new(),
        coordinates: coordinates.map(|(lat, lon)| Coordinate::new(lat, lon)),
        municipality_id: None,
        created_by: None,
        data_source: String::new(),
        origin_id: None,
        created_at: DateTime::<Utc>::default(),
        updated_at: DateTime::<Utc>::default(),
    }
}

pub fn organizer(name: &str) -> Organizer {
    Organizer {
        id: Uuid::new_v4(),
        name: name.into(),
        municipality_id: None,
        created_by: None,
        data_source: String::new(),
        origin_id: None,
        created_at: DateTime::<Utc>::default(),
        updated_at: DateTime::<Utc>::default(),
    }
}

pub fn hobby(name: &str, location: Option<&Location>) -> Hobby {
    Hobby {
        id: Uuid::new_v4(),
        name: name.into(),
        description: String::new(),
        location_id: location.map(|l| l.id),
        organizer_id: None,
        municipality_id: None,
        created_by: None,
        categories: Vec::new(),
        audiences: Vec::new(),
        price_type: PriceType::Free,
        price_amount: 0,
        cover_image: None,
        next_event_id: None,
        data_source: String::new(),
        origin_id: None,
        created_at: DateTime::<Utc>::default(),
        updated_at: DateTime::<Utc>::default(),
    }
}

pub fn event(hobby: &Hobby, start: NaiveDate, end: NaiveDate) -> HobbyEvent {
    HobbyEvent {
        id: Uuid::new_v4(),
        hobby_id: hobby.id,
        start_date: start,
        start_time: time(18, 0),
        end_date: end,
        end_time: time(20, 0),
        start_weekday: iso_weekday(start),
        recurrence_start_event: None,
        data_source: String::new(),
        origin_id: None,
        created_at: DateTime::<Utc>::default(),
        updated_at: DateTime::<Utc>::default(),
    }
}

pub fn promotion(name: &str, location: Option<&Location>, start: NaiveDate, end: NaiveDate) -> Promotion {
    Promotion {
        id: Uuid::new_v4(),
        name: name.into(),
        description: String::new(),
        start_date: start,
        start_time: time(8, 0),
        end_date: end,
        end_time: time(16, 0),
        cover_image: None,
        location_id: location.map(|l| l.id),
        organizer_id: None,
        municipality_id: None,
        created_by: None,
        available_count: 10,
        used_count: 0,
        created_at: DateTime::<Utc>::default(),
        updated_at: DateTime::<Utc>::default(),
    }
}

/// Builder for catalog snapshots in tests.
#[derive(Default)]
pub struct CatalogBuilder {
    pub categories: Vec<CategoryNode>,
    pub audiences: Vec<CategoryNode>,
    pub hobbies: Vec<Hobby>,
    pub events: Vec<HobbyEvent>,
    pub promotions: Vec<Promotion>,
    pub locations: Vec<Location>,
    pub organizers: Vec<Organizer>,
}

impl CatalogBuilder {
    pub fn build(self) -> Catalog {
        Catalog::new(CatalogParts {
            categories: CategoryTree::from_nodes(TaxonomyKind::Category, self.categories).unwrap(),
            audiences: CategoryTree::from_nodes(TaxonomyKind::Audience, self.audiences).unwrap(),
            hobbies: self.hobbies,
            events: self.events,
            promotions: self.promotions,
            locations: self.locations,
            organizers: self.organizers,
        })
    }
}
