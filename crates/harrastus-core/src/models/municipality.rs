//! Municipality domain model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A municipality whose moderators may edit every resource assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Municipality {
    pub id: Uuid,
    pub name: String,
    pub moderators: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMunicipality {
    pub name: String,
}
