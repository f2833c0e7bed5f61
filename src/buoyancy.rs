use nalgebra::Vector3;

use crate::datatypes::{Facet, GRAVITY};

/// Hydrostatic pressure force on one submerged facet
///
/// Pressure is linear in depth, so evaluating it at the mean altitude of the
/// vertices integrates it exactly over a flat facet. `z_mean` is negative
/// below the waterline, which turns the outward normal into a push on the
/// hull.
///
/// # Arguments
/// * `facet` - A submerged facet with its outward unit normal
/// * `fluid_density` - Density of the fluid, in kg/m^3
///
/// # Returns
/// The force vector, in N
pub fn pressure_force(facet: &Facet, fluid_density: f64) -> Vector3<f64> {
    fluid_density * GRAVITY * facet.z_mean() * facet.area() * facet.normal
}

/// Integrates hydrostatic pressure over a set of submerged facets
///
/// # Arguments
/// * `submerged` - The submerged facets of a partition
/// * `fluid_density` - Density of the fluid, in kg/m^3
///
/// # Returns
/// The Archimedes force, zero if nothing is submerged
pub fn archimedes_force(submerged: &[Facet], fluid_density: f64) -> Vector3<f64> {
    submerged
        .iter()
        .map(|facet| pressure_force(facet, fluid_density))
        .fold(Vector3::zeros(), |total, force| total + force)
}
