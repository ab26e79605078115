//! Repository layer - Data access abstraction
//!
//! Repositories provide typed access to store collections,
//! following the Repository pattern for clean separation of concerns.

mod base;
mod person_repository;

pub use base::{MongoRepository, Repository};
pub use person_repository::{adult_filter, PersonRepository, PersonStore};
