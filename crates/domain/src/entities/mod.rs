//! Domain entities - Objects with identity and lifecycle

mod city;

pub use city::City;
