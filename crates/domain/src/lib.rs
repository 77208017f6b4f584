//! Domain layer for stormyglass
//!
//! Contains the value objects, entities and domain errors shared by the
//! forecast pipeline and the city gazetteer. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
