//! SurrealDB implementation of the per-object [`PermissionStore`].
//!
//! Each grant is one `object_permission` record keyed by
//! `<kind>_<user>_<resource>`, so granting twice is an upsert and
//! revoking a missing grant deletes nothing.

use std::collections::BTreeSet;

use harrastus_core::error::{HarrastusError, HarrastusResult};
use harrastus_core::models::permission::{ObjectGrant, ResourceKind};
use harrastus_core::repository::PermissionStore;
use surrealdb::{Connection, Surreal};
use tracing::debug;
use uuid::Uuid;

use super::parse_id;
use crate::error::DbError;

fn grant_key(kind: ResourceKind, grant: ObjectGrant) -> String {
    format!("{kind}_{}_{}", grant.user_id, grant.resource_id)
}

/// Store failures surface as permission-store errors rather than
/// generic database errors.
fn store_error(err: impl Into<DbError>) -> HarrastusError {
    HarrastusError::PermissionStore(err.into().to_string())
}

#[derive(Clone)]
pub struct SurrealPermissionStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_ids(
        &self,
        sql: &'static str,
        kind: ResourceKind,
        key: &'static str,
        id: Uuid,
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        let mut result = self
            .db
            .query(sql)
            .bind(("kind", kind.as_str().to_string()))
            .bind((key, id.to_string()))
            .await
            .map_err(store_error)?;
        let ids: Vec<String> = result.take(0).map_err(store_error)?;
        ids.iter()
            .map(|id| parse_id(key, id).map_err(store_error))
            .collect()
    }
}

impl<C: Connection> PermissionStore for SurrealPermissionStore<C> {
    async fn grant_all(&self, kind: ResourceKind, grants: &[ObjectGrant]) -> HarrastusResult<()> {
        if grants.is_empty() {
            return Ok(());
        }
        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for n in 0..grants.len() {
            sql.push_str(&format!(
                "UPSERT type::record('object_permission', $key_{n}) SET \
                 kind = $kind, user_id = $user_{n}, resource_id = $resource_{n};\n"
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut builder = self.db.query(sql).bind(("kind", kind.as_str().to_string()));
        for (n, grant) in grants.iter().enumerate() {
            builder = builder
                .bind((format!("key_{n}"), grant_key(kind, *grant)))
                .bind((format!("user_{n}"), grant.user_id.to_string()))
                .bind((format!("resource_{n}"), grant.resource_id.to_string()));
        }
        builder
            .await
            .map_err(store_error)?
            .check()
            .map_err(store_error)?;

        debug!(kind = %kind, count = grants.len(), "Granted object permissions");
        Ok(())
    }

    async fn revoke(&self, kind: ResourceKind, grant: ObjectGrant) -> HarrastusResult<()> {
        self.db
            .query("DELETE type::record('object_permission', $key)")
            .bind(("key", grant_key(kind, grant)))
            .await
            .map_err(store_error)?
            .check()
            .map_err(store_error)?;
        Ok(())
    }

    async fn holders_of(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        self.select_ids(
            "SELECT VALUE user_id FROM object_permission \
             WHERE kind = $kind AND resource_id = $resource_id",
            kind,
            "resource_id",
            resource_id,
        )
        .await
    }

    async fn objects_for_user(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        self.select_ids(
            "SELECT VALUE resource_id FROM object_permission \
             WHERE kind = $kind AND user_id = $user_id",
            kind,
            "user_id",
            user_id,
        )
        .await
    }

    async fn has_perm(&self, kind: ResourceKind, grant: ObjectGrant) -> HarrastusResult<bool> {
        let mut result = self
            .db
            .query("SELECT VALUE meta::id(id) FROM type::record('object_permission', $key)")
            .bind(("key", grant_key(kind, grant)))
            .await
            .map_err(store_error)?;
        let found: Vec<String> = result.take(0).map_err(store_error)?;
        Ok(!found.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_keys_separate_kinds() {
        let grant = ObjectGrant::new(Uuid::from_u128(1), Uuid::from_u128(2));
        assert_ne!(
            grant_key(ResourceKind::Hobby, grant),
            grant_key(ResourceKind::Location, grant)
        );
        assert!(grant_key(ResourceKind::Promotion, grant).starts_with("promotion_"));
    }
}
