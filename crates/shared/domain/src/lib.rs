//! Domain layer - Persisted entities and their shared rules.
//!
//! This crate contains plain data types with no store dependencies beyond
//! the BSON representation of identifiers.

pub mod constants;
pub mod entity;
pub mod person;

pub use constants::*;
pub use entity::{Entity, ID_FIELD};
pub use person::Person;
