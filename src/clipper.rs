use tracing::debug;

use crate::{
    datatypes::{Facet, Partition, Vertex},
    mesh::Mesh,
};

/// Pieces of a single facet on each side of the waterline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetClip {
    pub emerged: Vec<Facet>,
    pub submerged: Vec<Facet>,
}

/// Intersection between segment AB and the plane z=0.
///
/// `a` and `b` must lie strictly on opposite sides of the plane.
fn waterline_intersection(a: &Vertex, b: &Vertex) -> Vertex {
    let t = -a.z / (b.z - a.z);
    let mut point = a + (b - a) * t;
    point.z = 0.0;
    point
}

/// Splits one facet at the waterline plane z=0
///
/// A vertex lying exactly on the plane counts both as above and below. The
/// fully emerged test runs first, so a facet lying flat on the plane is
/// emerged. Every piece keeps the normal of `facet`.
///
/// # Arguments
/// * `facet` - The facet to split. Its coordinates must be finite, as they
///     are for every facet of a [`Mesh`].
///
/// # Returns
/// The emerged and submerged pieces
///
/// # Panics
/// In debug builds, if `facet` has a non-finite coordinate
pub fn clip_facet(facet: &Facet) -> FacetClip {
    debug_assert!(
        facet.is_finite(),
        "clip_facet called with non-finite coordinates: {:?}",
        facet.vertices
    );
    let normal = facet.normal;
    let piece = |vertices: [Vertex; 3]| Facet::new(vertices, normal);

    let above = facet.vertices.iter().filter(|v| v.z >= 0.0).count();
    let below = facet.vertices.iter().filter(|v| v.z <= 0.0).count();

    if above == 3 {
        return FacetClip {
            emerged: vec![*facet],
            submerged: Vec::new(),
        };
    }
    if below == 3 {
        return FacetClip {
            emerged: Vec::new(),
            submerged: vec![*facet],
        };
    }

    let sup: Vec<&Vertex> = facet.vertices.iter().filter(|v| v.z > 0.0).collect();
    let inf: Vec<&Vertex> = facet.vertices.iter().filter(|v| v.z < 0.0).collect();

    match (sup.as_slice(), inf.as_slice()) {
        // the plane passes through the third vertex
        ([a], [b]) => {
            let i = waterline_intersection(a, b);
            match facet.vertices.iter().find(|v| v.z == 0.0) {
                Some(z) => FacetClip {
                    emerged: vec![piece([i, *z, **a])],
                    submerged: vec![piece([i, *z, **b])],
                },
                None => FacetClip::default(),
            }
        }
        ([a, b], [c]) => {
            let i = waterline_intersection(a, c);
            let j = waterline_intersection(b, c);
            FacetClip {
                emerged: vec![piece([i, j, **a]), piece([**a, **b, j])],
                submerged: vec![piece([i, j, **c])],
            }
        }
        ([c], [a, b]) => {
            let i = waterline_intersection(a, c);
            let j = waterline_intersection(b, c);
            FacetClip {
                emerged: vec![piece([i, j, **c])],
                submerged: vec![piece([i, j, **a]), piece([**a, **b, j])],
            }
        }
        // only reachable with NaN coordinates, which Mesh::new rejects
        _ => FacetClip::default(),
    }
}

/// Partitions the facets of a mesh into emerged and submerged sets at its
/// current position
pub fn clip(mesh: &Mesh) -> Partition {
    let mut partition = Partition {
        emerged: Vec::with_capacity(mesh.facets().len()),
        submerged: Vec::new(),
        revision: mesh.revision(),
    };

    for facet in mesh.facets() {
        let FacetClip { emerged, submerged } = clip_facet(facet);
        partition.emerged.extend(emerged);
        partition.submerged.extend(submerged);
    }

    debug!(
        "separated {} emerged and {} submerged facets",
        partition.emerged.len(),
        partition.submerged.len()
    );

    partition
}
