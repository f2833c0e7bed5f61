//! Floating equilibrium of rigid triangulated solids.
//!
//! A [`Mesh`] is lowered into a fluid by bisection over its vertical
//! position. Each step clips the mesh at the waterline plane z=0
//! ([`clipper::clip`]), integrates hydrostatic pressure over the submerged
//! facets ([`buoyancy::archimedes_force`]) and compares the result with the
//! weight of the object ([`EquilibriumSearch`]).

pub mod buoyancy;
pub mod clipper;
pub mod datatypes;
pub mod error;
#[cfg(test)]
mod fixtures;
pub mod mesh;
pub mod params;
pub mod post_processor;
pub mod solver;

pub use datatypes::{Facet, Partition, Vertex, GRAVITY};
pub use error::DraughtError;
pub use mesh::Mesh;
pub use params::{Fluid, SimulationParameters};
pub use solver::{EquilibriumSearch, Frame, SearchState, Solution};
