//! Derived object-permission synchronisation.
//!
//! Who may edit a resource is never stored as truth: it is derived from
//! the moderators of the resource's municipality plus its creator. The
//! reconciler diffs that entitlement against the permission store and
//! applies the minimal set of grants and revokes. Running it again
//! without an intervening change does nothing.
//!
//! Revokes are applied one at a time and grants as one batch. A failure
//! part-way leaves the already-applied changes in place; re-running the
//! reconcile converges.

use std::collections::BTreeSet;

use harrastus_core::error::HarrastusResult;
use harrastus_core::models::permission::{ObjectGrant, OwnedResource, ResourceKind};
use harrastus_core::repository::{
    CatalogRepositories, MunicipalityRepository, OwnershipRepository, PermissionStore,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Grants and revokes applied by one reconcile run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub granted: BTreeSet<ObjectGrant>,
    pub revoked: BTreeSet<ObjectGrant>,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }

    /// Users granted the permission, regardless of resource.
    pub fn granted_users(&self) -> BTreeSet<Uuid> {
        self.granted.iter().map(|g| g.user_id).collect()
    }

    pub fn revoked_users(&self) -> BTreeSet<Uuid> {
        self.revoked.iter().map(|g| g.user_id).collect()
    }

    fn merge(&mut self, other: ReconcileOutcome) {
        self.granted.extend(other.granted);
        self.revoked.extend(other.revoked);
    }
}

pub struct PermissionReconciler<R: CatalogRepositories, P: PermissionStore> {
    repos: R,
    store: P,
}

impl<R: CatalogRepositories, P: PermissionStore> PermissionReconciler<R, P> {
    pub fn new(repos: R, store: P) -> Self {
        Self { repos, store }
    }

    pub fn repositories(&self) -> &R {
        &self.repos
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Users who should hold the change permission on `resource`.
    pub async fn entitlement(&self, resource: &OwnedResource) -> HarrastusResult<BTreeSet<Uuid>> {
        let mut users = match resource.municipality_id {
            Some(municipality_id) => {
                self.repos
                    .municipalities()
                    .get_moderators(municipality_id)
                    .await?
            }
            None => BTreeSet::new(),
        };
        users.extend(resource.created_by);
        Ok(users)
    }

    /// Bring the holders of `change_<kind>` on one resource in line with
    /// its entitlement.
    pub async fn reconcile(&self, resource: &OwnedResource) -> HarrastusResult<ReconcileOutcome> {
        let kind = resource.kind;
        let entitled = self.entitlement(resource).await?;
        let holders = self.store.holders_of(kind, resource.id).await?;

        let revoked: BTreeSet<ObjectGrant> = holders
            .difference(&entitled)
            .map(|user| ObjectGrant::new(*user, resource.id))
            .collect();
        let granted: BTreeSet<ObjectGrant> = entitled
            .difference(&holders)
            .map(|user| ObjectGrant::new(*user, resource.id))
            .collect();

        self.apply(kind, &granted, &revoked).await?;
        debug!(
            kind = %kind,
            resource_id = %resource.id,
            granted = granted.len(),
            revoked = revoked.len(),
            "Reconciled object permissions"
        );
        Ok(ReconcileOutcome { granted, revoked })
    }

    pub async fn reconcile_by_id(
        &self,
        kind: ResourceKind,
        id: Uuid,
    ) -> HarrastusResult<ReconcileOutcome> {
        let resource = self.repos.ownership().get_owned(kind, id).await?;
        self.reconcile(&resource).await
    }

    /// Re-derive every `change_<kind>` permission of the given users.
    ///
    /// Each user should hold the permission on exactly the resources of
    /// `kind` that belong to a municipality they moderate or that they
    /// created. Other kinds are left untouched.
    pub async fn reconcile_for_users(
        &self,
        kind: ResourceKind,
        user_ids: &[Uuid],
    ) -> HarrastusResult<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();
        for &user_id in user_ids {
            let municipalities: Vec<Uuid> = self
                .repos
                .municipalities()
                .get_moderated_by(user_id)
                .await?
                .into_iter()
                .map(|m| m.id)
                .collect();
            let should_hold = self
                .repos
                .ownership()
                .entitled_ids(kind, user_id, &municipalities)
                .await?;
            let holds = self.store.objects_for_user(kind, user_id).await?;

            let revoked: BTreeSet<ObjectGrant> = holds
                .difference(&should_hold)
                .map(|id| ObjectGrant::new(user_id, *id))
                .collect();
            let granted: BTreeSet<ObjectGrant> = should_hold
                .difference(&holds)
                .map(|id| ObjectGrant::new(user_id, *id))
                .collect();

            self.apply(kind, &granted, &revoked).await?;
            debug!(
                kind = %kind,
                user_id = %user_id,
                granted = granted.len(),
                revoked = revoked.len(),
                "Reconciled user permissions"
            );
            outcome.merge(ReconcileOutcome { granted, revoked });
        }
        Ok(outcome)
    }

    /// Run [`reconcile_for_users`](Self::reconcile_for_users) for every
    /// resource kind. Used after a moderator-list change.
    pub async fn reconcile_for_users_all_kinds(
        &self,
        user_ids: &[Uuid],
    ) -> HarrastusResult<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();
        for kind in ResourceKind::ALL {
            outcome.merge(self.reconcile_for_users(kind, user_ids).await?);
        }
        Ok(outcome)
    }

    /// Reconcile every resource of `kind`. Safe to run on a schedule.
    pub async fn reconcile_all(&self, kind: ResourceKind) -> HarrastusResult<ReconcileOutcome> {
        let resources = self.repos.ownership().list_owned(kind).await?;
        let mut outcome = ReconcileOutcome::default();
        for resource in &resources {
            outcome.merge(self.reconcile(resource).await?);
        }
        info!(
            kind = %kind,
            resources = resources.len(),
            granted = outcome.granted.len(),
            revoked = outcome.revoked.len(),
            "Reconciled all permissions"
        );
        Ok(outcome)
    }

    async fn apply(
        &self,
        kind: ResourceKind,
        granted: &BTreeSet<ObjectGrant>,
        revoked: &BTreeSet<ObjectGrant>,
    ) -> HarrastusResult<()> {
        for grant in revoked {
            self.store.revoke(kind, *grant).await?;
        }
        if !granted.is_empty() {
            let batch: Vec<ObjectGrant> = granted.iter().copied().collect();
            self.store.grant_all(kind, &batch).await?;
        }
        Ok(())
    }
}
