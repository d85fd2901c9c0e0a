//! Object permission vocabulary shared by the reconciler and the
//! permission store.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource types that carry a per-object `change_<kind>` permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Hobby,
    Location,
    Organizer,
    Promotion,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Hobby,
        ResourceKind::Location,
        ResourceKind::Organizer,
        ResourceKind::Promotion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hobby => "hobby",
            Self::Location => "location",
            Self::Organizer => "organizer",
            Self::Promotion => "promotion",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    /// Name of the edit permission, e.g. `change_hobby`.
    pub fn change_permission(&self) -> &'static str {
        match self {
            Self::Hobby => "change_hobby",
            Self::Location => "change_location",
            Self::Organizer => "change_organizer",
            Self::Promotion => "change_promotion",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ownership facts of a resource that edit rights derive from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedResource {
    pub kind: ResourceKind,
    pub id: Uuid,
    pub municipality_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

/// Implemented by every model whose edit rights are reconciled.
pub trait Owned {
    fn owned_resource(&self) -> OwnedResource;
}

/// One user's edit permission on one resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectGrant {
    pub user_id: Uuid,
    pub resource_id: Uuid,
}

impl ObjectGrant {
    pub fn new(user_id: Uuid, resource_id: Uuid) -> Self {
        Self {
            user_id,
            resource_id,
        }
    }
}
