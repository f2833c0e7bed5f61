use std::path::Path;

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::{
    datatypes::{Facet, Partition, Vertex, GRAVITY},
    error::DraughtError,
    params::DEFAULT_OBJECT_MASS,
};

/// A rigid triangulated solid and the scalar summaries derived from its
/// current position.
///
/// The only geometric mutation allowed is a uniform vertical translation,
/// which keeps `bottom_ref` in step with the vertices and bumps `revision`.
#[derive(Debug, Clone)]
pub struct Mesh {
    facets: Vec<Facet>,
    x_range: (f64, f64),
    y_range: (f64, f64),
    bottom_ref: f64,
    height: f64,
    weight: f64,
    revision: u64,
}

/// Checks a facet read from a file and repairs its normal when needed
///
/// # Arguments
/// * `facet` - The facet to check
///
/// # Returns
/// The facet with a unit normal and whether that normal was rebuilt, or
/// `None` if the facet has no area or a non-finite coordinate. Facets whose
/// area overflows are an error.
fn sanitize_facet(mut facet: Facet) -> Result<Option<(Facet, bool)>, DraughtError> {
    if !facet.is_finite() {
        return Ok(None);
    }
    if !facet.area().is_finite() {
        return Err(DraughtError::Input(format!(
            "Facet coordinates too large: {:?}",
            facet.vertices
        )));
    }
    let winding = match facet.winding_normal() {
        Some(n) => n,
        None => return Ok(None),
    };

    let norm = facet.normal.norm();
    if norm == 0.0 || !norm.is_finite() {
        facet.normal = winding;
        return Ok(Some((facet, true)));
    }
    if (norm - 1.0).abs() > 1e-9 {
        facet.normal /= norm;
    }

    Ok(Some((facet, false)))
}

impl Mesh {
    /// Builds a mesh from facets. Facets with no area or non-finite
    /// coordinates are dropped; missing normals are rebuilt from the winding.
    pub fn new(facets: Vec<Facet>) -> Result<Mesh, DraughtError> {
        let total = facets.len();
        let mut kept: Vec<Facet> = Vec::with_capacity(total);
        let mut rebuilt_normals: usize = 0;

        for facet in facets {
            if let Some((facet, rebuilt)) = sanitize_facet(facet)? {
                if rebuilt {
                    rebuilt_normals += 1;
                }
                kept.push(facet);
            }
        }

        let skipped = total - kept.len();
        if skipped > 0 {
            warn!("skipped {} degenerate facets", skipped);
        }
        if rebuilt_normals > 0 {
            warn!("rebuilt {} missing facet normals from winding", rebuilt_normals);
        }

        if kept.is_empty() {
            return Err(DraughtError::Input(
                "Mesh has no facet with a non-zero area".to_owned(),
            ));
        }

        let mut min = Vertex::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Vertex::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for vertex in kept.iter().flat_map(|f| f.vertices.iter()) {
            min = min.inf(vertex);
            max = max.sup(vertex);
        }

        info!("loaded {} facets", kept.len());

        Ok(Mesh {
            facets: kept,
            x_range: (min.x, max.x),
            y_range: (min.y, max.y),
            bottom_ref: min.z,
            height: max.z - min.z,
            weight: DEFAULT_OBJECT_MASS * GRAVITY,
            revision: 0,
        })
    }

    /// Loads a mesh from an STL file, ascii or binary
    ///
    /// # Arguments
    /// * `stl_file` - Path to the STL file
    pub fn from_stl(stl_file: &Path) -> Result<Mesh, DraughtError> {
        let mut file = match std::fs::File::open(stl_file) {
            Ok(f) => f,
            Err(err) => {
                return Err(DraughtError::Input(format!(
                    "Unable to open STL file {}: {err}",
                    stl_file.display()
                )))
            }
        };

        let stl = match stl_io::read_stl(&mut file) {
            Ok(s) => s,
            Err(err) => {
                return Err(DraughtError::Input(format!(
                    "Error in STL file {}: {err}",
                    stl_file.display()
                )))
            }
        };

        let mut facets: Vec<Facet> = Vec::with_capacity(stl.faces.len());
        for face in &stl.faces {
            let mut vertices = [Vertex::origin(); 3];
            for (slot, &index) in vertices.iter_mut().zip(face.vertices.iter()) {
                let v = match stl.vertices.get(index) {
                    Some(v) => v,
                    None => {
                        return Err(DraughtError::Input(format!(
                            "STL face references missing vertex {index}"
                        )))
                    }
                };
                *slot = Vertex::new(v[0] as f64, v[1] as f64, v[2] as f64);
            }
            let normal = Vector3::new(
                face.normal[0] as f64,
                face.normal[1] as f64,
                face.normal[2] as f64,
            );
            facets.push(Facet::new(vertices, normal));
        }

        debug!("read {} faces from {}", facets.len(), stl_file.display());

        Mesh::new(facets)
    }

    /// Translates every facet vertically
    ///
    /// # Arguments
    /// * `delta` - Translation, positive upwards
    pub fn translate_z(&mut self, delta: f64) {
        for facet in self.facets.iter_mut() {
            for vertex in facet.vertices.iter_mut() {
                vertex.z += delta;
            }
        }
        self.bottom_ref += delta;
        self.revision += 1;

        debug!("mesh vertically translated by {delta} m");
    }

    /// Sets the object mass, in kg, and updates the weight
    pub fn set_mass(&mut self, mass: f64) {
        self.weight = mass * GRAVITY;
        debug!("mass set to {mass} kg");
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    /// Altitude of the lowest vertex
    pub fn bottom_ref(&self) -> f64 {
        self.bottom_ref
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Weight, in N
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Depth of the lowest vertex below the waterline, zero when the mesh is
    /// out of the fluid
    pub fn draught(&self) -> f64 {
        if self.bottom_ref < 0.0 {
            -self.bottom_ref
        } else {
            0.0
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a partition still describes the current position
    pub fn is_current(&self, partition: &Partition) -> bool {
        partition.revision == self.revision
    }
}
