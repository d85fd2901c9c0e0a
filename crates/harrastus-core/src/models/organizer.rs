//! Organizer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::{Owned, OwnedResource, ResourceKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organizer {
    pub id: Uuid,
    pub name: String,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub data_source: String,
    pub origin_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Organizer {
    fn owned_resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::Organizer,
            id: self.id,
            municipality_id: self.municipality_id,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganizer {
    pub name: String,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub data_source: String,
    pub origin_id: Option<String>,
}

impl CreateOrganizer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            municipality_id: None,
            created_by: None,
            data_source: String::new(),
            origin_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganizer {
    pub name: Option<String>,
    pub municipality_id: Option<Option<Uuid>>,
    pub created_by: Option<Option<Uuid>>,
}
