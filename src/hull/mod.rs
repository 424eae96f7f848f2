//! Approximate convex hulls of parts and their post-processing.

pub use self::simplify::{decimate_hull, extrude_hull};

use crate::math::{Point, Real, Vector};
use crate::{ApproximationMode, Mesh};
use parry::bounding_volume::Aabb;
use std::collections::BTreeSet;

mod simplify;

/// Above this number of vertices, loose hulls are computed from a grid
/// approximation of the point cloud.
const LOOSE_HULL_MIN_POINTS: usize = 512;
/// Number of cells along each axis of the grid used by loose hulls.
const LOOSE_HULL_GRID: u32 = 16;

/// The triangles of the box built by [`box_hull`], for the vertex ordering
/// `index = ix | iy << 1 | iz << 2`.
const BOX_TRIANGLES: [[u32; 3]; 12] = [
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
];

/// Computes a convex mesh enclosing `mesh`.
///
/// With [`ApproximationMode::ConvexHull`] and `tight = true` this is the
/// exact convex hull of the vertices. With `tight = false`, large point
/// clouds are first snapped outward to a coarse grid, which yields a
/// slightly larger hull for a fraction of the cost. With
/// [`ApproximationMode::BoundingBox`] this is the axis-aligned bounding box.
///
/// If the hull computation fails, the bounding box is returned instead.
pub fn compute_approx_hull(mesh: &Mesh, mode: ApproximationMode, tight: bool) -> Mesh {
    if mesh.points.is_empty() {
        return Mesh::default();
    }

    match mode {
        ApproximationMode::BoundingBox => box_hull(&mesh.aabb()),
        ApproximationMode::ConvexHull => {
            if !tight && mesh.points.len() > LOOSE_HULL_MIN_POINTS {
                convex_hull(&grid_corners(&mesh.points, LOOSE_HULL_GRID))
            } else {
                convex_hull(&mesh.points)
            }
        }
    }
}

/// The convex hull of a point cloud, falling back to its bounding box if
/// the hull computation fails.
pub fn convex_hull(points: &[Point<Real>]) -> Mesh {
    match parry::transformation::try_convex_hull(points) {
        Ok((vertices, triangles)) if !triangles.is_empty() => Mesh::new(vertices, triangles),
        Ok(_) => {
            log::warn!("Empty convex hull, falling back to the bounding box.");
            box_hull(&Mesh::new(points.to_vec(), vec![]).aabb())
        }
        Err(err) => {
            log::warn!("Convex hull computation failed ({err}), falling back to the bounding box.");
            box_hull(&Mesh::new(points.to_vec(), vec![]).aabb())
        }
    }
}

/// The closed box mesh of `aabb` with outward-facing triangles.
pub fn box_hull(aabb: &Aabb) -> Mesh {
    let points = (0..8)
        .map(|i| {
            Point::new(
                if i & 1 == 0 { aabb.mins.x } else { aabb.maxs.x },
                if i & 2 == 0 { aabb.mins.y } else { aabb.maxs.y },
                if i & 4 == 0 { aabb.mins.z } else { aabb.maxs.z },
            )
        })
        .collect();

    Mesh::new(points, BOX_TRIANGLES.to_vec())
}

/// Does `hull` enclose a non-negligible volume?
///
/// Hulls of flat or collinear parts are not usable as collision shapes and
/// are dropped from the final output.
pub fn is_degenerate_hull(hull: &Mesh) -> bool {
    if hull.points.len() < 4 || hull.triangles.len() < 4 {
        return true;
    }

    let diag = hull.bbox_diagonal();
    hull.volume() <= diag * diag * diag * 1.0e-12
}

/// The corners of the grid cells containing at least one point of `points`.
///
/// The convex hull of these corners contains the convex hull of `points`.
fn grid_corners(points: &[Point<Real>], resolution: u32) -> Vec<Point<Real>> {
    let aabb = Mesh::new(points.to_vec(), vec![]).aabb();
    let extents = aabb.maxs - aabb.mins;
    let cell = extents / resolution as Real;
    let mut corners = BTreeSet::new();

    for pt in points {
        let mut ijk = [0u32; 3];
        for (i, e) in ijk.iter_mut().enumerate() {
            if cell[i] > 0.0 {
                let id = ((pt[i] - aabb.mins[i]) / cell[i]).floor() as u32;
                *e = id.min(resolution - 1);
            }
        }

        for corner in 0..8u32 {
            let _ = corners.insert([
                ijk[0] + (corner & 1),
                ijk[1] + ((corner >> 1) & 1),
                ijk[2] + ((corner >> 2) & 1),
            ]);
        }
    }

    corners
        .into_iter()
        .map(|[i, j, k]| {
            aabb.mins + Vector::new(i as Real, j as Real, k as Real).component_mul(&cell)
        })
        .collect()
}
