//! Domain models, error types and repository traits shared by every
//! crate of the hobby catalog.

pub mod error;
pub mod models;
pub mod repository;
