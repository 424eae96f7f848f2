use crate::math::{Point, Real, Vector};
use crate::Mesh;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// A point sampled on the surface of a mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceSample {
    /// The sampled point.
    pub point: Point<Real>,
    /// The unit normal of the triangle containing the point.
    pub normal: Vector<Real>,
    /// The index of the triangle containing the point.
    pub triangle: u32,
}

/// Samples `count` points on the surface of `mesh`, with a density
/// proportional to the triangle areas.
///
/// Triangles with zero area are never sampled. Returns an empty set if the
/// mesh has no triangle with a positive area.
pub fn sample_surface(mesh: &Mesh, count: u32, rng: &mut ChaCha8Rng) -> Vec<SurfaceSample> {
    let areas: Vec<Real> = (0..mesh.triangles.len())
        .map(|i| mesh.triangle_area(i))
        .collect();

    let Ok(distribution) = WeightedIndex::new(&areas) else {
        return vec![];
    };

    (0..count)
        .map(|_| {
            let i = distribution.sample(rng);
            let [a, b, c] = mesh.triangle_vertices(i);

            // Uniform barycentric coordinates, folding the unit square onto
            // the triangle.
            let (mut u, mut v): (Real, Real) = (rng.gen(), rng.gen());
            if u + v > 1.0 {
                u = 1.0 - u;
                v = 1.0 - v;
            }

            SurfaceSample {
                point: a + (b - a) * u + (c - a) * v,
                normal: mesh.scaled_normal(i).normalize(),
                triangle: i as u32,
            }
        })
        .collect()
}
