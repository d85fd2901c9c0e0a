//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Services are generic over
//! these traits so they carry no dependency on the database crate.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::HarrastusResult;
use crate::models::{
    benefit::Benefit,
    category::{CategoryNode, CreateCategory, TaxonomyKind},
    event::{CreateHobbyEvent, HobbyEvent, UpdateHobbyEvent},
    hobby::{CreateHobby, Hobby, UpdateHobby},
    location::{CreateLocation, Location, UpdateLocation},
    municipality::{CreateMunicipality, Municipality},
    organizer::{CreateOrganizer, Organizer, UpdateOrganizer},
    permission::{ObjectGrant, OwnedResource, ResourceKind},
    promotion::{CreatePromotion, Promotion, UpdatePromotion},
};

// ---------------------------------------------------------------------------
// Municipalities & moderators
// ---------------------------------------------------------------------------

pub trait MunicipalityRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMunicipality,
    ) -> impl Future<Output = HarrastusResult<Municipality>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HarrastusResult<Municipality>> + Send;
    fn list(&self) -> impl Future<Output = HarrastusResult<Vec<Municipality>>> + Send;

    /// Add a user to the moderator set. Adding an existing moderator is
    /// a no-op.
    fn add_moderator(
        &self,
        municipality_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = HarrastusResult<()>> + Send;

    fn remove_moderator(
        &self,
        municipality_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = HarrastusResult<()>> + Send;

    fn get_moderators(
        &self,
        municipality_id: Uuid,
    ) -> impl Future<Output = HarrastusResult<BTreeSet<Uuid>>> + Send;

    /// Municipalities where the user is a moderator, ordered by name.
    fn get_moderated_by(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HarrastusResult<Vec<Municipality>>> + Send;
}

// ---------------------------------------------------------------------------
// Taxonomies
// ---------------------------------------------------------------------------

pub trait CategoryRepository: Send + Sync {
    fn create(&self, input: CreateCategory)
    -> impl Future<Output = HarrastusResult<CategoryNode>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HarrastusResult<CategoryNode>> + Send;
    fn list(
        &self,
        kind: TaxonomyKind,
    ) -> impl Future<Output = HarrastusResult<Vec<CategoryNode>>> + Send;

    /// Delete a node and all of its descendants. Returns the ids removed.
    fn delete(&self, id: Uuid) -> impl Future<Output = HarrastusResult<Vec<Uuid>>> + Send;
}

// ---------------------------------------------------------------------------
// Catalog resources
// ---------------------------------------------------------------------------

pub trait HobbyRepository: Send + Sync {
    fn create(&self, input: CreateHobby) -> impl Future<Output = HarrastusResult<Hobby>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HarrastusResult<Hobby>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateHobby,
    ) -> impl Future<Output = HarrastusResult<Hobby>> + Send;
    /// Delete a hobby together with its events and object permissions.
    fn delete(&self, id: Uuid) -> impl Future<Output = HarrastusResult<()>> + Send;
    /// Every hobby, oldest first.
    fn list(&self) -> impl Future<Output = HarrastusResult<Vec<Hobby>>> + Send;

    /// Overwrite the next-event pointer.
    fn set_next_event(
        &self,
        id: Uuid,
        next_event_id: Option<Uuid>,
    ) -> impl Future<Output = HarrastusResult<()>> + Send;
}

pub trait HobbyEventRepository: Send + Sync {
    fn create(
        &self,
        input: CreateHobbyEvent,
    ) -> impl Future<Output = HarrastusResult<HobbyEvent>> + Send;

    /// Insert all events in one transaction: either every event is
    /// stored or none is.
    fn create_many(
        &self,
        inputs: Vec<CreateHobbyEvent>,
    ) -> impl Future<Output = HarrastusResult<Vec<HobbyEvent>>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HarrastusResult<HobbyEvent>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateHobbyEvent,
    ) -> impl Future<Output = HarrastusResult<HobbyEvent>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = HarrastusResult<()>> + Send;
    fn list(&self) -> impl Future<Output = HarrastusResult<Vec<HobbyEvent>>> + Send;
    fn list_by_hobby(
        &self,
        hobby_id: Uuid,
    ) -> impl Future<Output = HarrastusResult<Vec<HobbyEvent>>> + Send;
}

pub trait LocationRepository: Send + Sync {
    fn create(&self, input: CreateLocation)
    -> impl Future<Output = HarrastusResult<Location>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HarrastusResult<Location>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateLocation,
    ) -> impl Future<Output = HarrastusResult<Location>> + Send;
    fn list(&self) -> impl Future<Output = HarrastusResult<Vec<Location>>> + Send;
}

pub trait OrganizerRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganizer,
    ) -> impl Future<Output = HarrastusResult<Organizer>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HarrastusResult<Organizer>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganizer,
    ) -> impl Future<Output = HarrastusResult<Organizer>> + Send;
    fn list(&self) -> impl Future<Output = HarrastusResult<Vec<Organizer>>> + Send;
}

pub trait PromotionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePromotion,
    ) -> impl Future<Output = HarrastusResult<Promotion>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HarrastusResult<Promotion>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePromotion,
    ) -> impl Future<Output = HarrastusResult<Promotion>> + Send;
    fn list(&self) -> impl Future<Output = HarrastusResult<Vec<Promotion>>> + Send;

    /// Record a use of the promotion. Fails with a validation error once
    /// `used_count` has reached `available_count`.
    fn claim_benefit(
        &self,
        promotion_id: Uuid,
        user_id: Option<Uuid>,
    ) -> impl Future<Output = HarrastusResult<Benefit>> + Send;
}

// ---------------------------------------------------------------------------
// Ownership & object permissions
// ---------------------------------------------------------------------------

/// Read-only view of ownership facts across every [`ResourceKind`].
pub trait OwnershipRepository: Send + Sync {
    fn get_owned(
        &self,
        kind: ResourceKind,
        id: Uuid,
    ) -> impl Future<Output = HarrastusResult<OwnedResource>> + Send;

    fn list_owned(
        &self,
        kind: ResourceKind,
    ) -> impl Future<Output = HarrastusResult<Vec<OwnedResource>>> + Send;

    /// Ids of resources of `kind` that belong to one of the given
    /// municipalities or were created by `user_id`.
    fn entitled_ids(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        municipality_ids: &[Uuid],
    ) -> impl Future<Output = HarrastusResult<BTreeSet<Uuid>>> + Send;
}

/// Per-object `change_<kind>` permission storage.
pub trait PermissionStore: Send + Sync {
    /// Grant every listed permission in one batch.
    fn grant_all(
        &self,
        kind: ResourceKind,
        grants: &[ObjectGrant],
    ) -> impl Future<Output = HarrastusResult<()>> + Send;

    /// Revoke a single permission. Revoking a missing grant is a no-op.
    fn revoke(
        &self,
        kind: ResourceKind,
        grant: ObjectGrant,
    ) -> impl Future<Output = HarrastusResult<()>> + Send;

    /// Users currently holding the permission on a resource.
    fn holders_of(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> impl Future<Output = HarrastusResult<BTreeSet<Uuid>>> + Send;

    /// Resources of `kind` the user currently holds the permission on.
    fn objects_for_user(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
    ) -> impl Future<Output = HarrastusResult<BTreeSet<Uuid>>> + Send;

    fn has_perm(
        &self,
        kind: ResourceKind,
        grant: ObjectGrant,
    ) -> impl Future<Output = HarrastusResult<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Bundles every repository a catalog service needs so services take a
/// single type parameter.
pub trait CatalogRepositories: Send + Sync {
    type Municipalities: MunicipalityRepository;
    type Categories: CategoryRepository;
    type Hobbies: HobbyRepository;
    type Events: HobbyEventRepository;
    type Locations: LocationRepository;
    type Organizers: OrganizerRepository;
    type Promotions: PromotionRepository;
    type Ownership: OwnershipRepository;

    fn municipalities(&self) -> &Self::Municipalities;
    fn categories(&self) -> &Self::Categories;
    fn hobbies(&self) -> &Self::Hobbies;
    fn events(&self) -> &Self::Events;
    fn locations(&self) -> &Self::Locations;
    fn organizers(&self) -> &Self::Organizers;
    fn promotions(&self) -> &Self::Promotions;
    fn ownership(&self) -> &Self::Ownership;
}
