//! Promotion domain model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::{Owned, OwnedResource, ResourceKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub cover_image: Option<String>,
    pub location_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub available_count: u32,
    pub used_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    pub fn is_usable(&self) -> bool {
        self.available_count > self.used_count
    }
}

impl Owned for Promotion {
    fn owned_resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::Promotion,
            id: self.id,
            municipality_id: self.municipality_id,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromotion {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub cover_image: Option<String>,
    pub location_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub available_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePromotion {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub location_id: Option<Option<Uuid>>,
    pub organizer_id: Option<Option<Uuid>>,
    pub municipality_id: Option<Option<Uuid>>,
    pub created_by: Option<Option<Uuid>>,
    pub available_count: Option<u32>,
}
