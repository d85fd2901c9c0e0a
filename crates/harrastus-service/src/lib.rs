//! Harrastus services: write paths with permission reconciliation,
//! recurring events, next-event maintenance, geocoding and list views.

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod geocoding;
pub mod listing;
pub mod next_event;
pub mod reconcile;
pub mod recurrence;

pub use catalog::{CatalogWriter, GeocodeReport};
pub use config::ServiceConfig;
pub use error::GeocodeError;
pub use events::{EventService, NextEventReport};
pub use geocoding::{Geocoder, GoogleGeocoder};
pub use listing::{CatalogReader, Sections};
pub use next_event::{NextEvent, select_next};
pub use reconcile::{PermissionReconciler, ReconcileOutcome};
pub use recurrence::{Cadence, RecurrenceRequest, TOO_MANY_EVENTS};
