//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod gazetteer_loader;
mod stormglass_adapter;

pub use gazetteer_loader::load_gazetteer;
pub use stormglass_adapter::StormglassAdapter;
