#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, NaiveTime};
use harrastus_core::error::{HarrastusError, HarrastusResult};
use harrastus_core::models::coordinate::Coordinate;
use harrastus_core::models::municipality::CreateMunicipality;
use harrastus_core::models::permission::{ObjectGrant, ResourceKind};
use harrastus_core::repository::PermissionStore;
use harrastus_db::{SurrealCatalog, SurrealPermissionStore};
use harrastus_service::{CatalogWriter, GeocodeError, Geocoder, ServiceConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

pub type Writer<G = StubGeocoder> = CatalogWriter<SurrealCatalog<Db>, SurrealPermissionStore<Db>, G>;

pub struct Harness {
    pub db: Surreal<Db>,
    pub catalog: SurrealCatalog<Db>,
    pub store: SurrealPermissionStore<Db>,
}

impl Harness {
    pub async fn new() -> Self {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        harrastus_db::run_migrations(&db).await.unwrap();
        Self {
            catalog: SurrealCatalog::new(db.clone()),
            store: SurrealPermissionStore::new(db.clone()),
            db,
        }
    }

    pub fn writer(&self) -> Writer {
        CatalogWriter::new(
            self.catalog.clone(),
            self.store.clone(),
            None,
            ServiceConfig::default(),
        )
    }

    pub fn writer_with_geocoder(&self, geocoder: StubGeocoder) -> Writer {
        CatalogWriter::new(
            self.catalog.clone(),
            self.store.clone(),
            Some(geocoder),
            ServiceConfig::default(),
        )
    }

    /// A municipality moderated by `moderators`.
    pub async fn municipality(&self, writer: &Writer, name: &str, moderators: &[Uuid]) -> Uuid {
        let municipality = writer
            .create_municipality(CreateMunicipality { name: name.into() })
            .await
            .unwrap();
        for &user in moderators {
            writer.add_moderator(municipality.id, user).await.unwrap();
        }
        municipality.id
    }

    pub async fn can_edit(&self, kind: ResourceKind, resource: Uuid, user: Uuid) -> bool {
        self.store
            .has_perm(kind, ObjectGrant::new(user, resource))
            .await
            .unwrap()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// -----------------------------------------------------------------------
// Test doubles
// -----------------------------------------------------------------------

/// Resolves every address to a fixed point, except addresses containing
/// "nowhere", which fail.
#[derive(Clone)]
pub struct StubGeocoder {
    pub point: Coordinate,
    calls: Arc<AtomicUsize>,
}

impl StubGeocoder {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            point: Coordinate::new(latitude, longitude),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if address.contains("nowhere") {
            return Err(GeocodeError::Status {
                address: address.to_owned(),
                status: "ZERO_RESULTS".into(),
            });
        }
        Ok(self.point)
    }
}

/// Permission store held in process memory.
#[derive(Default)]
pub struct MemoryStore {
    grants: Mutex<BTreeSet<(ResourceKind, ObjectGrant)>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.grants.lock().unwrap().len()
    }
}

impl PermissionStore for MemoryStore {
    async fn grant_all(&self, kind: ResourceKind, grants: &[ObjectGrant]) -> HarrastusResult<()> {
        let mut held = self.grants.lock().unwrap();
        held.extend(grants.iter().map(|g| (kind, *g)));
        Ok(())
    }

    async fn revoke(&self, kind: ResourceKind, grant: ObjectGrant) -> HarrastusResult<()> {
        self.grants.lock().unwrap().remove(&(kind, grant));
        Ok(())
    }

    async fn holders_of(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, g)| *k == kind && g.resource_id == resource_id)
            .map(|(_, g)| g.user_id)
            .collect())
    }

    async fn objects_for_user(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, g)| *k == kind && g.user_id == user_id)
            .map(|(_, g)| g.resource_id)
            .collect())
    }

    async fn has_perm(&self, kind: ResourceKind, grant: ObjectGrant) -> HarrastusResult<bool> {
        Ok(self.grants.lock().unwrap().contains(&(kind, grant)))
    }
}

/// Reads succeed and report nothing; every write fails.
pub struct FailingStore;

impl PermissionStore for FailingStore {
    async fn grant_all(&self, _kind: ResourceKind, _grants: &[ObjectGrant]) -> HarrastusResult<()> {
        Err(HarrastusError::PermissionStore("store unavailable".into()))
    }

    async fn revoke(&self, _kind: ResourceKind, _grant: ObjectGrant) -> HarrastusResult<()> {
        Err(HarrastusError::PermissionStore("store unavailable".into()))
    }

    async fn holders_of(
        &self,
        _kind: ResourceKind,
        _resource_id: Uuid,
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        Ok(BTreeSet::new())
    }

    async fn objects_for_user(
        &self,
        _kind: ResourceKind,
        _user_id: Uuid,
    ) -> HarrastusResult<BTreeSet<Uuid>> {
        Ok(BTreeSet::new())
    }

    async fn has_perm(&self, _kind: ResourceKind, _grant: ObjectGrant) -> HarrastusResult<bool> {
        Ok(false)
    }
}
