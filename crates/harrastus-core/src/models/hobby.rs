//! Hobby domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::{Owned, OwnedResource, ResourceKind};
use crate::error::{FieldErrors, HarrastusResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    Free,
    Paid,
    Annual,
    Seasonal,
    OneTime,
}

impl PriceType {
    pub const ALL: [PriceType; 5] = [
        PriceType::Free,
        PriceType::Paid,
        PriceType::Annual,
        PriceType::Seasonal,
        PriceType::OneTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Annual => "annual",
            Self::Seasonal => "seasonal",
            Self::OneTime => "one_time",
        }
    }

    /// Exact match against the wire names; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that a price type and amount agree. Amounts are in minor
/// currency units.
pub fn validate_price(price_type: PriceType, price_amount: i64) -> HarrastusResult<()> {
    let mut errors = FieldErrors::new();
    if price_type == PriceType::Free && price_amount != 0 {
        errors.add_non_field("Price amount has to be 0 if price type is free");
    }
    if price_type != PriceType::Free && price_amount == 0 {
        errors.add_non_field(
            "Price amount can not be 0 if price type is something else than free",
        );
    }
    if price_amount < 0 {
        errors.add_non_field("Price amount can not be negative");
    }
    errors.into_result()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hobby {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub categories: Vec<Uuid>,
    pub audiences: Vec<Uuid>,
    pub price_type: PriceType,
    pub price_amount: i64,
    pub cover_image: Option<String>,
    /// Maintained by the next-event selector, never set by hand.
    pub next_event_id: Option<Uuid>,
    pub data_source: String,
    pub origin_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Hobby {
    fn owned_resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::Hobby,
            id: self.id,
            municipality_id: self.municipality_id,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHobby {
    pub name: String,
    pub description: String,
    pub location_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub categories: Vec<Uuid>,
    pub audiences: Vec<Uuid>,
    pub price_type: PriceType,
    pub price_amount: i64,
    pub cover_image: Option<String>,
    pub data_source: String,
    pub origin_id: Option<String>,
}

impl CreateHobby {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            location_id: None,
            organizer_id: None,
            municipality_id: None,
            created_by: None,
            categories: Vec::new(),
            audiences: Vec::new(),
            price_type: PriceType::Free,
            price_amount: 0,
            cover_image: None,
            data_source: String::new(),
            origin_id: None,
        }
    }
}

/// Partial update. For nullable references `Some(None)` clears the
/// value and `None` leaves it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateHobby {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_id: Option<Option<Uuid>>,
    pub organizer_id: Option<Option<Uuid>>,
    pub municipality_id: Option<Option<Uuid>>,
    pub created_by: Option<Option<Uuid>>,
    pub categories: Option<Vec<Uuid>>,
    pub audiences: Option<Vec<Uuid>>,
    pub price_type: Option<PriceType>,
    pub price_amount: Option<i64>,
    pub cover_image: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_with_amount_is_rejected() {
        let err = validate_price(PriceType::Free, 5).unwrap_err();
        assert!(err.to_string().contains("has to be 0"));
    }

    #[test]
    fn paid_types_require_amount() {
        assert!(validate_price(PriceType::Annual, 0).is_err());
        assert!(validate_price(PriceType::Seasonal, 0).is_err());
        assert!(validate_price(PriceType::Annual, 12_000).is_ok());
    }

    #[test]
    fn free_with_zero_is_accepted() {
        assert!(validate_price(PriceType::Free, 0).is_ok());
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(validate_price(PriceType::Paid, -100).is_err());
    }

    #[test]
    fn price_type_parse_is_exact() {
        assert_eq!(PriceType::parse("one_time"), Some(PriceType::OneTime));
        assert_eq!(PriceType::parse("FREE"), None);
        assert_eq!(PriceType::parse("monthly"), None);
    }
}
