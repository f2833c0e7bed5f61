use nalgebra::{Point3, Vector3};

/// Gravitational acceleration, in m/s^2
pub const GRAVITY: f64 = 9.81;

pub type Vertex = Point3<f64>;

/// A mesh triangle with its outward unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub vertices: [Vertex; 3],
    pub normal: Vector3<f64>,
}

impl Facet {
    pub fn new(vertices: [Vertex; 3], normal: Vector3<f64>) -> Facet {
        Facet { vertices, normal }
    }

    /// Cross product of the two edges leaving the first vertex
    fn edge_cross(&self) -> Vector3<f64> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    pub fn area(&self) -> f64 {
        self.edge_cross().norm() / 2.0
    }

    /// Mean altitude of the three vertices
    pub fn z_mean(&self) -> f64 {
        self.vertices.iter().map(|v| v.z).sum::<f64>() / 3.0
    }

    /// Unit normal following the right-hand rule over the vertex order.
    /// `None` when the facet has no area.
    pub fn winding_normal(&self) -> Option<Vector3<f64>> {
        let cross = self.edge_cross();
        let norm = cross.norm();
        if norm > 0.0 && norm.is_finite() {
            Some(cross / norm)
        } else {
            None
        }
    }

    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite())
    }
}

/// Facets of a mesh split at the waterline plane z=0
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub emerged: Vec<Facet>,
    /// Submerged pieces, each carrying the normal of the facet it was cut from
    pub submerged: Vec<Facet>,
    /// Mesh revision this partition was computed from
    pub revision: u64,
}
