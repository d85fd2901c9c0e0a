//! Category and audience taxonomy nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::localized::LocalizedText;

/// Which of the two parallel taxonomies a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxonomyKind {
    Category,
    Audience,
}

impl TaxonomyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Audience => "Audience",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Category" => Some(Self::Category),
            "Audience" => Some(Self::Audience),
            _ => None,
        }
    }
}

/// A node in a category (or audience) forest. The parent link is the
/// only structural reference; children are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: Uuid,
    pub kind: TaxonomyKind,
    pub name: LocalizedText,
    pub parent_id: Option<Uuid>,
    pub cover_image: Option<String>,
    /// Import source identifier; empty for hand-entered data.
    pub data_source: String,
    pub origin_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub kind: TaxonomyKind,
    pub name: LocalizedText,
    pub parent_id: Option<Uuid>,
    pub cover_image: Option<String>,
    pub data_source: String,
    pub origin_id: Option<String>,
}

impl CreateCategory {
    pub fn new(kind: TaxonomyKind, name: LocalizedText, parent_id: Option<Uuid>) -> Self {
        Self {
            kind,
            name,
            parent_id,
            cover_image: None,
            data_source: String::new(),
            origin_id: None,
        }
    }
}
