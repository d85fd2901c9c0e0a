//! List services: load a catalog snapshot and run the filter pipelines.
//!
//! Query parameters are parsed before anything is loaded, so invalid
//! requests fail without touching the store.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use harrastus_core::error::HarrastusResult;
use harrastus_core::models::{
    category::TaxonomyKind, event::HobbyEvent, hobby::Hobby, location::Location,
    organizer::Organizer, permission::ResourceKind, promotion::Promotion,
};
use harrastus_core::repository::{
    CatalogRepositories, CategoryRepository, HobbyEventRepository, HobbyRepository,
    LocationRepository, OrganizerRepository, PermissionStore, PromotionRepository,
};
use harrastus_query::{
    Caller, Catalog, CatalogParts, CategoryTree, FilterEngine, HobbyEventQuery, HobbyQuery,
    PromotionQuery, QueryParams,
};
use tracing::debug;
use uuid::Uuid;

/// Tables a listing reads into its snapshot. Sections left out stay empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub taxonomies: bool,
    pub hobbies: bool,
    pub events: bool,
    pub promotions: bool,
    pub locations: bool,
    pub organizers: bool,
}

impl Sections {
    const NONE: Self = Self {
        taxonomies: false,
        hobbies: false,
        events: false,
        promotions: false,
        locations: false,
        organizers: false,
    };

    pub const ALL: Self = Self {
        taxonomies: true,
        hobbies: true,
        events: true,
        promotions: true,
        locations: true,
        organizers: true,
    };

    /// Category filters, search and the hobby's location for distance.
    pub const HOBBIES: Self = Self {
        taxonomies: true,
        hobbies: true,
        locations: true,
        ..Self::NONE
    };

    pub const EVENTS: Self = Self {
        events: true,
        ..Self::HOBBIES
    };

    pub const PROMOTIONS: Self = Self {
        promotions: true,
        locations: true,
        ..Self::NONE
    };

    pub const LOCATIONS: Self = Self {
        locations: true,
        ..Self::NONE
    };

    pub const ORGANIZERS: Self = Self {
        organizers: true,
        ..Self::NONE
    };
}

pub struct CatalogReader<R: CatalogRepositories, P: PermissionStore> {
    repos: R,
    store: P,
}

impl<R: CatalogRepositories, P: PermissionStore> CatalogReader<R, P> {
    pub fn new(repos: R, store: P) -> Self {
        Self { repos, store }
    }

    /// Read the whole catalog into memory.
    pub async fn load_catalog(&self) -> HarrastusResult<Catalog> {
        self.load(Sections::ALL).await
    }

    /// Read the chosen tables into a snapshot.
    pub async fn load(&self, sections: Sections) -> HarrastusResult<Catalog> {
        let categories = self.taxonomy(sections, TaxonomyKind::Category).await?;
        let audiences = self.taxonomy(sections, TaxonomyKind::Audience).await?;
        let hobbies = if sections.hobbies {
            self.repos.hobbies().list().await?
        } else {
            Vec::new()
        };
        let events = if sections.events {
            self.repos.events().list().await?
        } else {
            Vec::new()
        };
        let promotions = if sections.promotions {
            self.repos.promotions().list().await?
        } else {
            Vec::new()
        };
        let locations = if sections.locations {
            self.repos.locations().list().await?
        } else {
            Vec::new()
        };
        let organizers = if sections.organizers {
            self.repos.organizers().list().await?
        } else {
            Vec::new()
        };
        debug!(
            hobbies = hobbies.len(),
            events = events.len(),
            promotions = promotions.len(),
            locations = locations.len(),
            organizers = organizers.len(),
            "Loaded catalog snapshot"
        );
        Ok(Catalog::new(CatalogParts {
            categories,
            audiences,
            hobbies,
            events,
            promotions,
            locations,
            organizers,
        }))
    }

    async fn taxonomy(&self, sections: Sections, kind: TaxonomyKind) -> HarrastusResult<CategoryTree> {
        if !sections.taxonomies {
            return Ok(CategoryTree::new(kind));
        }
        let nodes = self.repos.categories().list(kind).await?;
        CategoryTree::from_nodes(kind, nodes)
    }

    /// The caller as seen by listings of `kind`.
    pub async fn caller(&self, user: Option<Uuid>, kind: ResourceKind) -> HarrastusResult<Caller> {
        match user {
            None => Ok(Caller::Anonymous),
            Some(user_id) => {
                let editable: BTreeSet<Uuid> = self.store.objects_for_user(kind, user_id).await?;
                Ok(Caller::user(user_id, editable))
            }
        }
    }

    /// Hobbies matching `params`. A hobby without its own cover image
    /// carries the one inherited from its categories.
    pub async fn list_hobbies(
        &self,
        params: &QueryParams,
        user: Option<Uuid>,
        now: NaiveDateTime,
    ) -> HarrastusResult<Vec<Hobby>> {
        let query = HobbyQuery::from_params(params)?;
        let catalog = self.load(Sections::HOBBIES).await?;
        let caller = self.caller(user, ResourceKind::Hobby).await?;
        let hobbies = FilterEngine::new(&catalog, now).hobbies(&query, &caller)?;
        Ok(hobbies
            .into_iter()
            .map(|h| {
                let mut hobby = h.clone();
                hobby.cover_image = catalog.cover_image_for(h).map(str::to_owned);
                hobby
            })
            .collect())
    }

    pub async fn list_hobby_events(
        &self,
        params: &QueryParams,
        now: NaiveDateTime,
    ) -> HarrastusResult<Vec<HobbyEvent>> {
        let query = HobbyEventQuery::from_params(params)?;
        let catalog = self.load(Sections::EVENTS).await?;
        let events = FilterEngine::new(&catalog, now).list_hobby_events(&query)?;
        Ok(events.into_iter().cloned().collect())
    }

    pub async fn list_promotions(
        &self,
        params: &QueryParams,
        user: Option<Uuid>,
        now: NaiveDateTime,
    ) -> HarrastusResult<Vec<Promotion>> {
        let query = PromotionQuery::from_params(params)?;
        let catalog = self.load(Sections::PROMOTIONS).await?;
        let caller = self.caller(user, ResourceKind::Promotion).await?;
        let promotions = FilterEngine::new(&catalog, now).promotions(&query, &caller)?;
        Ok(promotions.into_iter().cloned().collect())
    }

    pub async fn list_locations(
        &self,
        user: Option<Uuid>,
        now: NaiveDateTime,
    ) -> HarrastusResult<Vec<Location>> {
        let catalog = self.load(Sections::LOCATIONS).await?;
        let caller = self.caller(user, ResourceKind::Location).await?;
        let locations = FilterEngine::new(&catalog, now).locations(&caller);
        Ok(locations.into_iter().cloned().collect())
    }

    pub async fn list_organizers(
        &self,
        user: Option<Uuid>,
        now: NaiveDateTime,
    ) -> HarrastusResult<Vec<Organizer>> {
        let catalog = self.load(Sections::ORGANIZERS).await?;
        let caller = self.caller(user, ResourceKind::Organizer).await?;
        let organizers = FilterEngine::new(&catalog, now).organizers(&caller);
        Ok(organizers.into_iter().cloned().collect())
    }
}
