use harrastus_core::repository::CatalogRepositories;
use surrealdb::{Connection, Surreal};

use super::{
    SurrealCategoryRepository, SurrealHobbyEventRepository, SurrealHobbyRepository,
    SurrealLocationRepository, SurrealMunicipalityRepository, SurrealOrganizerRepository,
    SurrealOwnershipRepository, SurrealPromotionRepository,
};

/// Every catalog repository over one shared connection.
#[derive(Clone)]
pub struct SurrealCatalog<C: Connection> {
    municipalities: SurrealMunicipalityRepository<C>,
    categories: SurrealCategoryRepository<C>,
    hobbies: SurrealHobbyRepository<C>,
    events: SurrealHobbyEventRepository<C>,
    locations: SurrealLocationRepository<C>,
    organizers: SurrealOrganizerRepository<C>,
    promotions: SurrealPromotionRepository<C>,
    ownership: SurrealOwnershipRepository<C>,
}

impl<C: Connection> SurrealCatalog<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            municipalities: SurrealMunicipalityRepository::new(db.clone()),
            categories: SurrealCategoryRepository::new(db.clone()),
            hobbies: SurrealHobbyRepository::new(db.clone()),
            events: SurrealHobbyEventRepository::new(db.clone()),
            locations: SurrealLocationRepository::new(db.clone()),
            organizers: SurrealOrganizerRepository::new(db.clone()),
            promotions: SurrealPromotionRepository::new(db.clone()),
            ownership: SurrealOwnershipRepository::new(db),
        }
    }
}

impl<C: Connection> CatalogRepositories for SurrealCatalog<C> {
    type Municipalities = SurrealMunicipalityRepository<C>;
    type Categories = SurrealCategoryRepository<C>;
    type Hobbies = SurrealHobbyRepository<C>;
    type Events = SurrealHobbyEventRepository<C>;
    type Locations = SurrealLocationRepository<C>;
    type Organizers = SurrealOrganizerRepository<C>;
    type Promotions = SurrealPromotionRepository<C>;
    type Ownership = SurrealOwnershipRepository<C>;

    fn municipalities(&self) -> &Self::Municipalities {
        &self.municipalities
    }

    fn categories(&self) -> &Self::Categories {
        &self.categories
    }

    fn hobbies(&self) -> &Self::Hobbies {
        &self.hobbies
    }

    fn events(&self) -> &Self::Events {
        &self.events
    }

    fn locations(&self) -> &Self::Locations {
        &self.locations
    }

    fn organizers(&self) -> &Self::Organizers {
        &self.organizers
    }

    fn promotions(&self) -> &Self::Promotions {
        &self.promotions
    }

    fn ownership(&self) -> &Self::Ownership {
        &self.ownership
    }
}
