use nalgebra::Vector3;

use crate::datatypes::{Facet, Vertex};

fn facet(a: [f64; 3], b: [f64; 3], c: [f64; 3], n: [f64; 3]) -> Facet {
    Facet::new(
        [
            Vertex::new(a[0], a[1], a[2]),
            Vertex::new(b[0], b[1], b[2]),
            Vertex::new(c[0], c[1], c[2]),
        ],
        Vector3::new(n[0], n[1], n[2]),
    )
}

/// Axis-aligned box between two corners, two facets per face, outward normals
pub fn cuboid(lo: [f64; 3], hi: [f64; 3]) -> Vec<Facet> {
    let [x0, y0, z0] = lo;
    let [x1, y1, z1] = hi;

    vec![
        // bottom
        facet([x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [0., 0., -1.]),
        facet([x0, y0, z0], [x1, y1, z0], [x1, y0, z0], [0., 0., -1.]),
        // top
        facet([x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [0., 0., 1.]),
        facet([x0, y0, z1], [x1, y1, z1], [x0, y1, z1], [0., 0., 1.]),
        // front
        facet([x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [0., -1., 0.]),
        facet([x0, y0, z0], [x1, y0, z1], [x0, y0, z1], [0., -1., 0.]),
        // back
        facet([x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [0., 1., 0.]),
        facet([x0, y1, z0], [x1, y1, z1], [x1, y1, z0], [0., 1., 0.]),
        // left
        facet([x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [-1., 0., 0.]),
        facet([x0, y0, z0], [x0, y1, z1], [x0, y1, z0], [-1., 0., 0.]),
        // right
        facet([x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [1., 0., 0.]),
        facet([x1, y0, z0], [x1, y1, z1], [x1, y0, z1], [1., 0., 0.]),
    ]
}

/// 1x1x1 cube with its bottom face at z=-1 and top face at z=0
pub fn unit_cube() -> Vec<Facet> {
    cuboid([0., 0., -1.], [1., 1., 0.])
}

/// Single facet from raw coordinates, normal taken from the winding
pub fn triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Facet {
    let mut f = facet(a, b, c, [0., 0., 0.]);
    f.normal = f.winding_normal().unwrap_or_else(Vector3::z);
    f
}
