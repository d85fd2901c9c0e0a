//! Domain models for the hobby catalog.
//!
//! These are the core types shared across all crates.

pub mod benefit;
pub mod category;
pub mod coordinate;
pub mod event;
pub mod hobby;
pub mod localized;
pub mod location;
pub mod municipality;
pub mod organizer;
pub mod permission;
pub mod promotion;
