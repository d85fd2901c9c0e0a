//! Read side of the hobby catalog.
//!
//! - [`geo`]: nearest ordering and radius filtering
//! - [`hierarchy`]: category / audience trees and descendant expansion
//! - [`params`]: typed queries parsed from request parameters
//! - [`catalog`]: the snapshot the pipelines read from
//! - [`filter`]: the per-resource filter pipelines over a [`Catalog`]

pub mod catalog;
pub mod filter;
pub mod geo;
pub mod hierarchy;
pub mod params;

pub use catalog::{Caller, Catalog, CatalogParts};
pub use filter::FilterEngine;
pub use geo::{GeoQueryPoint, SortDirection, order_by_distance};
pub use hierarchy::CategoryTree;
pub use params::{
    EventOrdering, HobbyEventQuery, HobbyQuery, PromotionQuery, QueryParams, TemporalFilter,
};
