use super::convex_hull;
use crate::math::{Point, Real};
use crate::{Mesh, Plane};
use ordered_float::OrderedFloat;
use std::collections::BTreeSet;

/// Removes vertices from a convex hull until it has at most `max_vertices`.
///
/// At each step the vertex whose removal loses the least volume is removed
/// and the hull is recomputed. The volume loss of a vertex is estimated
/// locally from the hull of the vertex and its neighbors.
pub fn decimate_hull(hull: &Mesh, max_vertices: usize) -> Mesh {
    let max_vertices = max_vertices.max(4);
    let mut hull = hull.clone();

    while hull.points.len() > max_vertices {
        let mut neighbors = vec![BTreeSet::new(); hull.points.len()];
        for tri in &hull.triangles {
            for k in 0..3 {
                let _ = neighbors[tri[k] as usize].insert(tri[(k + 1) % 3]);
                let _ = neighbors[tri[k] as usize].insert(tri[(k + 2) % 3]);
            }
        }

        let removed = (0..hull.points.len())
            .min_by_key(|&i| OrderedFloat(removal_loss(&hull.points, i, &neighbors[i])))
            .unwrap_or(0);

        let mut points = hull.points.clone();
        let _ = points.swap_remove(removed);
        let next = convex_hull(&points);

        if next.points.len() >= hull.points.len() {
            // The hull did not shrink, the remaining points are degenerate.
            break;
        }

        hull = next;
    }

    hull
}

fn removal_loss(points: &[Point<Real>], i: usize, neighbors: &BTreeSet<u32>) -> Real {
    let mut local: Vec<_> = neighbors.iter().map(|j| points[*j as usize]).collect();
    let without = hull_volume(&local);
    local.push(points[i]);
    (hull_volume(&local) - without).max(0.0)
}

fn hull_volume(points: &[Point<Real>]) -> Real {
    parry::transformation::try_convex_hull(points)
        .map(|(vertices, triangles)| Mesh::new(vertices, triangles).volume())
        .unwrap_or(0.0)
}

/// Pushes the faces of `hull` lying on one of the cutting `planes` away from
/// the hull by `margin`.
///
/// Neighboring parts produced by the same cut are separated by an infinitely
/// thin gap. Extruding their shared faces makes their hulls overlap slightly,
/// which avoids leaks in thin-walled shapes.
pub fn extrude_hull(hull: &Mesh, planes: &[Plane], margin: Real, tolerance: Real) -> Mesh {
    if hull.points.is_empty() || planes.is_empty() || margin <= 0.0 {
        return hull.clone();
    }

    let center = parry::utils::center(&hull.points);
    let mut points = hull.points.clone();
    let mut moved = false;

    for plane in planes {
        // The outward direction is the side of the plane without the hull center.
        let outward = if plane.signed_distance(&center) >= 0.0 {
            -plane.normal
        } else {
            plane.normal
        };

        for (pt, original) in points.iter_mut().zip(hull.points.iter()) {
            if plane.signed_distance(original).abs() <= tolerance {
                *pt += outward * margin;
                moved = true;
            }
        }
    }

    if moved {
        convex_hull(&points)
    } else {
        hull.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hull::box_hull;
    use crate::math::Vector;
    use crate::Axis;
    use parry::bounding_volume::Aabb;

    #[test]
    fn decimation_respects_vertex_budget() {
        let mut rng = oorandom::Rand64::new(7);
        let points: Vec<_> = (0..200)
            .map(|_| {
                let dir = Vector::new(
                    rng.rand_float() - 0.5,
                    rng.rand_float() - 0.5,
                    rng.rand_float() - 0.5,
                );
                Point::from(dir.normalize())
            })
            .collect();
        let hull = convex_hull(&points);
        let decimated = decimate_hull(&hull, 24);
        assert!(decimated.points.len() <= 24);
        assert!(decimated.volume() <= hull.volume() + 1.0e-9);
        assert!(decimated.volume() > 0.5 * hull.volume());
    }

    #[test]
    fn extrusion_moves_cut_faces_only() {
        let hull = box_hull(&Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let cut = Plane::axis_aligned(Axis::X, 1.0);
        let extruded = extrude_hull(&hull, &[cut], 0.1, 1.0e-6);
        let aabb = extruded.aabb();
        assert_relative_eq!(aabb.maxs, Point::new(1.1, 1.0, 1.0), epsilon = 1.0e-9);
        assert_relative_eq!(aabb.mins, Point::origin(), epsilon = 1.0e-9);
    }
}
