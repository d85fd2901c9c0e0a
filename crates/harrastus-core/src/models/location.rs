//! Location domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coordinate::Coordinate;
use super::permission::{Owned, OwnedResource, ResourceKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub coordinates: Option<Coordinate>,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub data_source: String,
    pub origin_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Address in the form the geocoding service expects.
    pub fn geocoding_address(&self) -> String {
        format_geocoding_address(&self.address, &self.zip_code, &self.city)
    }

    /// Missing or placeholder coordinates.
    pub fn has_faulty_coordinates(&self) -> bool {
        self.coordinates.is_none_or(|c| c.is_null_island())
    }
}

pub fn format_geocoding_address(address: &str, zip_code: &str, city: &str) -> String {
    format!("{address},+{zip_code}+{city}")
}

impl Owned for Location {
    fn owned_resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::Location,
            id: self.id,
            municipality_id: self.municipality_id,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocation {
    pub name: String,
    pub address: String,
    pub zip_code: String,
    pub city: String,
    pub coordinates: Option<Coordinate>,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub data_source: String,
    pub origin_id: Option<String>,
}

impl CreateLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            zip_code: String::new(),
            city: String::new(),
            coordinates: None,
            municipality_id: None,
            created_by: None,
            data_source: String::new(),
            origin_id: None,
        }
    }

    pub fn geocoding_address(&self) -> String {
        format_geocoding_address(&self.address, &self.zip_code, &self.city)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateLocation {
    pub name: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    /// `Some(Some(c))` = set, `Some(None)` = clear, `None` = no change.
    pub coordinates: Option<Option<Coordinate>>,
    pub municipality_id: Option<Option<Uuid>>,
    pub created_by: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocoding_address_format() {
        let mut input = CreateLocation::new("Kalevan uimahalli");
        input.address = "Kalevantie 1".into();
        input.zip_code = "33500".into();
        input.city = "Tampere".into();
        assert_eq!(input.geocoding_address(), "Kalevantie 1,+33500+Tampere");
    }
}
