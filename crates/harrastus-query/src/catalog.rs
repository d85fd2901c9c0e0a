//! In-memory snapshot of the catalog that the filter engine reads from.

use std::collections::{BTreeSet, HashMap, HashSet};

use harrastus_core::models::{
    coordinate::Coordinate, event::HobbyEvent, hobby::Hobby, location::Location,
    organizer::Organizer, promotion::Promotion,
};
use uuid::Uuid;

use crate::hierarchy::CategoryTree;

/// Who is asking. Authenticated callers carry the ids of the resources
/// (of the kind being listed) they hold the change permission on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Caller {
    #[default]
    Anonymous,
    User {
        user_id: Uuid,
        editable: BTreeSet<Uuid>,
    },
}

impl Caller {
    pub fn user(user_id: Uuid, editable: BTreeSet<Uuid>) -> Self {
        Self::User { user_id, editable }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::User { user_id, .. } => Some(*user_id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn can_edit(&self, resource_id: Uuid) -> bool {
        match self {
            Self::Anonymous => false,
            Self::User { editable, .. } => editable.contains(&resource_id),
        }
    }
}

/// Everything needed to build a [`Catalog`].
#[derive(Debug, Clone)]
pub struct CatalogParts {
    pub categories: CategoryTree,
    pub audiences: CategoryTree,
    pub hobbies: Vec<Hobby>,
    pub events: Vec<HobbyEvent>,
    pub promotions: Vec<Promotion>,
    pub locations: Vec<Location>,
    pub organizers: Vec<Organizer>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    parts: CatalogParts,
    hobby_index: HashMap<Uuid, usize>,
    location_index: HashMap<Uuid, usize>,
}

impl Catalog {
    pub fn new(parts: CatalogParts) -> Self {
        let hobby_index = parts
            .hobbies
            .iter()
            .enumerate()
            .map(|(i, h)| (h.id, i))
            .collect();
        let location_index = parts
            .locations
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id, i))
            .collect();
        Self {
            parts,
            hobby_index,
            location_index,
        }
    }

    pub fn categories(&self) -> &CategoryTree {
        &self.parts.categories
    }

    pub fn audiences(&self) -> &CategoryTree {
        &self.parts.audiences
    }

    pub fn hobbies(&self) -> &[Hobby] {
        &self.parts.hobbies
    }

    pub fn events(&self) -> &[HobbyEvent] {
        &self.parts.events
    }

    pub fn promotions(&self) -> &[Promotion] {
        &self.parts.promotions
    }

    pub fn locations(&self) -> &[Location] {
        &self.parts.locations
    }

    pub fn organizers(&self) -> &[Organizer] {
        &self.parts.organizers
    }

    pub fn hobby(&self, id: Uuid) -> Option<&Hobby> {
        self.hobby_index.get(&id).map(|&i| &self.parts.hobbies[i])
    }

    pub fn location(&self, id: Uuid) -> Option<&Location> {
        self.location_index.get(&id).map(|&i| &self.parts.locations[i])
    }

    pub fn location_coordinate(&self, location_id: Option<Uuid>) -> Option<Coordinate> {
        self.location(location_id?)?.coordinates
    }

    /// Events are placed at their hobby's location.
    pub fn hobby_coordinate(&self, hobby_id: Uuid) -> Option<Coordinate> {
        self.location_coordinate(self.hobby(hobby_id)?.location_id)
    }

    /// Ids of every event currently referenced as some hobby's next event.
    pub fn next_event_ids(&self) -> HashSet<Uuid> {
        self.parts
            .hobbies
            .iter()
            .filter_map(|h| h.next_event_id)
            .collect()
    }

    /// The hobby's own cover image, or the nearest one up its category
    /// chain.
    pub fn cover_image_for<'a>(&'a self, hobby: &'a Hobby) -> Option<&'a str> {
        hobby
            .cover_image
            .as_deref()
            .or_else(|| self.parts.categories.inherited_cover_image(&hobby.categories))
    }
}
