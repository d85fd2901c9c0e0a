//! Catalog write paths.
//!
//! Creating or updating a hobby, location, organizer or promotion ends
//! with a permission reconcile for that resource. Moderator changes
//! re-derive the affected users' permissions across every kind.

use harrastus_core::error::{HarrastusError, HarrastusResult};
use harrastus_core::models::{
    benefit::Benefit,
    category::{CategoryNode, CreateCategory},
    coordinate::Coordinate,
    hobby::{CreateHobby, Hobby, UpdateHobby, validate_price},
    location::{CreateLocation, Location, UpdateLocation},
    municipality::{CreateMunicipality, Municipality},
    organizer::{CreateOrganizer, Organizer, UpdateOrganizer},
    permission::{ObjectGrant, Owned, ResourceKind},
    promotion::{CreatePromotion, Promotion, UpdatePromotion},
};
use harrastus_core::repository::{
    CatalogRepositories, CategoryRepository, HobbyRepository, LocationRepository,
    MunicipalityRepository, OrganizerRepository, PermissionStore, PromotionRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::geocoding::{Geocoder, GoogleGeocoder};
use crate::reconcile::{PermissionReconciler, ReconcileOutcome};

/// Result of a batch geocoding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeReport {
    pub geocoded: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

pub struct CatalogWriter<R, P, G = GoogleGeocoder>
where
    R: CatalogRepositories,
    P: PermissionStore,
    G: Geocoder,
{
    reconciler: PermissionReconciler<R, P>,
    geocoder: Option<G>,
    config: ServiceConfig,
}

impl<R, P, G> CatalogWriter<R, P, G>
where
    R: CatalogRepositories,
    P: PermissionStore,
    G: Geocoder,
{
    /// `geocoder` is optional; without one, locations keep whatever
    /// coordinates they were created with.
    pub fn new(repos: R, store: P, geocoder: Option<G>, config: ServiceConfig) -> Self {
        Self {
            reconciler: PermissionReconciler::new(repos, store),
            geocoder,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &PermissionReconciler<R, P> {
        &self.reconciler
    }

    fn repos(&self) -> &R {
        self.reconciler.repositories()
    }

    /// The municipality new resources of `actor` are assigned to: the
    /// first one (by name) the actor moderates.
    pub async fn current_municipality(&self, actor: Uuid) -> HarrastusResult<Option<Uuid>> {
        let moderated = self.repos().municipalities().get_moderated_by(actor).await?;
        Ok(moderated.first().map(|m| m.id))
    }

    /// Fail with `AuthorizationDenied` unless `actor` holds
    /// `change_<kind>` on the resource.
    pub async fn ensure_can_edit(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        actor: Uuid,
    ) -> HarrastusResult<()> {
        let grant = ObjectGrant::new(actor, resource_id);
        if self.reconciler.store().has_perm(kind, grant).await? {
            Ok(())
        } else {
            Err(HarrastusError::AuthorizationDenied {
                reason: format!("missing {} on {resource_id}", kind.change_permission()),
            })
        }
    }

    async fn ownership_for(
        &self,
        actor: Option<Uuid>,
        municipality_id: Option<Uuid>,
    ) -> HarrastusResult<(Option<Uuid>, Option<Uuid>)> {
        match actor {
            Some(actor) => {
                let municipality = match municipality_id {
                    Some(id) => Some(id),
                    None => self.current_municipality(actor).await?,
                };
                Ok((Some(actor), municipality))
            }
            None => Ok((None, municipality_id)),
        }
    }

    // -----------------------------------------------------------------------
    // Hobbies
    // -----------------------------------------------------------------------

    pub async fn create_hobby(
        &self,
        actor: Option<Uuid>,
        mut input: CreateHobby,
    ) -> HarrastusResult<Hobby> {
        validate_price(input.price_type, input.price_amount)?;
        let (created_by, municipality_id) =
            self.ownership_for(actor, input.municipality_id).await?;
        input.created_by = input.created_by.or(created_by);
        input.municipality_id = municipality_id;

        let hobby = self.repos().hobbies().create(input).await?;
        self.reconciler.reconcile(&hobby.owned_resource()).await?;
        Ok(hobby)
    }

    /// Price type and amount are validated against the merged result, so
    /// changing only one of them is checked against the stored other.
    pub async fn update_hobby(
        &self,
        actor: Uuid,
        id: Uuid,
        input: UpdateHobby,
    ) -> HarrastusResult<Hobby> {
        self.ensure_can_edit(ResourceKind::Hobby, id, actor).await?;
        let current = self.repos().hobbies().get_by_id(id).await?;
        validate_price(
            input.price_type.unwrap_or(current.price_type),
            input.price_amount.unwrap_or(current.price_amount),
        )?;
        let hobby = self.repos().hobbies().update(id, input).await?;
        self.reconciler.reconcile(&hobby.owned_resource()).await?;
        Ok(hobby)
    }

    pub async fn delete_hobby(&self, actor: Uuid, id: Uuid) -> HarrastusResult<()> {
        self.ensure_can_edit(ResourceKind::Hobby, id, actor).await?;
        self.repos().hobbies().delete(id).await
    }

    // -----------------------------------------------------------------------
    // Locations
    // -----------------------------------------------------------------------

    pub async fn create_location(
        &self,
        actor: Option<Uuid>,
        mut input: CreateLocation,
    ) -> HarrastusResult<Location> {
        if let (None, Some(geocoder)) = (input.coordinates, &self.geocoder) {
            let coordinate = geocoder.geocode(&input.geocoding_address()).await?;
            input.coordinates = Some(coordinate);
        }
        if let Some(c) = input.coordinates {
            Coordinate::checked(c.latitude, c.longitude)?;
        }

        let (created_by, municipality_id) =
            self.ownership_for(actor, input.municipality_id).await?;
        input.created_by = input.created_by.or(created_by);
        input.municipality_id = municipality_id;

        let location = self.repos().locations().create(input).await?;
        self.reconciler.reconcile(&location.owned_resource()).await?;
        Ok(location)
    }

    pub async fn update_location(
        &self,
        actor: Uuid,
        id: Uuid,
        input: UpdateLocation,
    ) -> HarrastusResult<Location> {
        self.ensure_can_edit(ResourceKind::Location, id, actor).await?;
        if let Some(Some(c)) = input.coordinates {
            Coordinate::checked(c.latitude, c.longitude)?;
        }
        let location = self.repos().locations().update(id, input).await?;
        self.reconciler.reconcile(&location.owned_resource()).await?;
        Ok(location)
    }

    /// Geocode every hand-entered location whose coordinates are missing
    /// or at (0, 0). Failures are logged and skipped.
    pub async fn geocode_locations(&self) -> HarrastusResult<GeocodeReport> {
        let Some(geocoder) = &self.geocoder else {
            return Err(HarrastusError::Internal(
                "geocoding is not configured".into(),
            ));
        };

        let mut report = GeocodeReport::default();
        let locations = self.repos().locations().list().await?;
        for location in locations
            .iter()
            .filter(|l| l.has_faulty_coordinates() && l.data_source.is_empty())
        {
            match geocoder.geocode(&location.geocoding_address()).await {
                Ok(coordinate) => {
                    let update = UpdateLocation {
                        coordinates: Some(Some(coordinate)),
                        ..UpdateLocation::default()
                    };
                    self.repos().locations().update(location.id, update).await?;
                    report.geocoded.push(location.id);
                }
                Err(e) => {
                    warn!(location_id = %location.id, error = %e, "Could not geocode location");
                    report.failed.push(location.id);
                }
            }
        }
        info!(
            geocoded = report.geocoded.len(),
            failed = report.failed.len(),
            "Geocoded locations"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Organizers
    // -----------------------------------------------------------------------

    pub async fn create_organizer(
        &self,
        actor: Option<Uuid>,
        mut input: CreateOrganizer,
    ) -> HarrastusResult<Organizer> {
        let (created_by, municipality_id) =
            self.ownership_for(actor, input.municipality_id).await?;
        input.created_by = input.created_by.or(created_by);
        input.municipality_id = municipality_id;

        let organizer = self.repos().organizers().create(input).await?;
        self.reconciler.reconcile(&organizer.owned_resource()).await?;
        Ok(organizer)
    }

    pub async fn update_organizer(
        &self,
        actor: Uuid,
        id: Uuid,
        input: UpdateOrganizer,
    ) -> HarrastusResult<Organizer> {
        self.ensure_can_edit(ResourceKind::Organizer, id, actor).await?;
        let organizer = self.repos().organizers().update(id, input).await?;
        self.reconciler.reconcile(&organizer.owned_resource()).await?;
        Ok(organizer)
    }

    // -----------------------------------------------------------------------
    // Promotions & benefits
    // -----------------------------------------------------------------------

    pub async fn create_promotion(
        &self,
        actor: Option<Uuid>,
        mut input: CreatePromotion,
    ) -> HarrastusResult<Promotion> {
        let (created_by, municipality_id) =
            self.ownership_for(actor, input.municipality_id).await?;
        input.created_by = input.created_by.or(created_by);
        input.municipality_id = municipality_id;

        let promotion = self.repos().promotions().create(input).await?;
        self.reconciler.reconcile(&promotion.owned_resource()).await?;
        Ok(promotion)
    }

    pub async fn update_promotion(
        &self,
        actor: Uuid,
        id: Uuid,
        input: UpdatePromotion,
    ) -> HarrastusResult<Promotion> {
        self.ensure_can_edit(ResourceKind::Promotion, id, actor).await?;
        let promotion = self.repos().promotions().update(id, input).await?;
        self.reconciler.reconcile(&promotion.owned_resource()).await?;
        Ok(promotion)
    }

    /// Record one use of a promotion.
    pub async fn claim_benefit(
        &self,
        promotion_id: Uuid,
        user_id: Option<Uuid>,
    ) -> HarrastusResult<Benefit> {
        let benefit = self
            .repos()
            .promotions()
            .claim_benefit(promotion_id, user_id)
            .await?;
        info!(promotion_id = %promotion_id, benefit_id = %benefit.id, "Benefit claimed");
        Ok(benefit)
    }

    // -----------------------------------------------------------------------
    // Municipalities & moderators
    // -----------------------------------------------------------------------

    pub async fn create_municipality(
        &self,
        input: CreateMunicipality,
    ) -> HarrastusResult<Municipality> {
        self.repos().municipalities().create(input).await
    }

    pub async fn add_moderator(
        &self,
        municipality_id: Uuid,
        user_id: Uuid,
    ) -> HarrastusResult<ReconcileOutcome> {
        self.repos()
            .municipalities()
            .add_moderator(municipality_id, user_id)
            .await?;
        self.reconciler.reconcile_for_users_all_kinds(&[user_id]).await
    }

    pub async fn remove_moderator(
        &self,
        municipality_id: Uuid,
        user_id: Uuid,
    ) -> HarrastusResult<ReconcileOutcome> {
        self.repos()
            .municipalities()
            .remove_moderator(municipality_id, user_id)
            .await?;
        self.reconciler.reconcile_for_users_all_kinds(&[user_id]).await
    }

    // -----------------------------------------------------------------------
    // Taxonomies
    // -----------------------------------------------------------------------

    pub async fn create_category(&self, input: CreateCategory) -> HarrastusResult<CategoryNode> {
        if let Some(parent_id) = input.parent_id {
            let parent = self.repos().categories().get_by_id(parent_id).await?;
            if parent.kind != input.kind {
                return Err(HarrastusError::validation(
                    "parent",
                    "Parent belongs to a different taxonomy.",
                ));
            }
        }
        self.repos().categories().create(input).await
    }

    /// Delete a category and its whole subtree.
    pub async fn delete_category(&self, id: Uuid) -> HarrastusResult<Vec<Uuid>> {
        let removed = self.repos().categories().delete(id).await?;
        info!(category_id = %id, removed = removed.len(), "Deleted category subtree");
        Ok(removed)
    }
}
