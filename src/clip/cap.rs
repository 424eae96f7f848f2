//! Closing the holes left along the cutting plane.

use super::{plane_basis, CutVertex, InvalidCut, SideBuilder, Splitter};
use crate::math::{Point, Point2, Real, Vector, Vector2};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// A closed polygon of the section, in the 2D frame of one side.
struct CapLoop {
    vertices: Vec<CutVertex>,
    coords: Vec<Point2<Real>>,
    signed_area: Real,
}

impl CapLoop {
    fn new(vertices: Vec<CutVertex>, coords: Vec<Point2<Real>>) -> Self {
        let signed_area = polygon_signed_area(&coords);
        Self {
            vertices,
            coords,
            signed_area,
        }
    }

    fn reverse(&mut self) {
        self.vertices.reverse();
        self.coords.reverse();
        self.signed_area = -self.signed_area;
    }

    fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.coords.len()).map(move |i| (i, (i + 1) % self.coords.len()))
    }
}

/// Triangulates the section polygons bounding the hole of `side` and adds
/// the resulting triangles to it. Returns the area of the section.
///
/// `sign` selects the orientation of the 2D frame: `1.0` for the negative
/// side (whose cap faces the plane normal), `-1.0` for the positive side.
pub(super) fn close_side(
    side: &mut SideBuilder,
    splitter: &Splitter,
    sign: Real,
) -> Result<Real, InvalidCut> {
    let boundary = boundary_edges(&side.plane_edges);
    if boundary.is_empty() {
        return Ok(0.0);
    }

    let (u, v) = plane_basis(&splitter.plane.normal);
    let project = |vertex: CutVertex| {
        let pt = splitter.position(vertex);
        Point2::new(pt.coords.dot(&u), pt.coords.dot(&v) * sign)
    };

    // 1. Stitch the boundary edges into loops. The cap traverses each loop
    //    backward to be consistently oriented with the side's triangles.
    let mut loops: Vec<CapLoop> = stitch_loops(&boundary, |vertex| {
        let pt = splitter.position(vertex);
        (OrderedFloat(pt.coords.dot(&u)), OrderedFloat(pt.coords.dot(&v)))
    })?
    .into_iter()
    .map(|mut vertices| {
        vertices.reverse();
        let coords = vertices.iter().map(|vertex| project(*vertex)).collect();
        CapLoop::new(vertices, coords)
    })
    .collect();

    // 2. Outer loops are counter-clockwise, holes are clockwise. A mesh with
    //    inverted orientation yields the opposite convention.
    let total_area: Real = loops.iter().map(|l| l.signed_area).sum();
    if total_area < 0.0 {
        loops.iter_mut().for_each(CapLoop::reverse);
    }

    if total_area.abs() <= Real::EPSILON {
        return Err(InvalidCut::TriangulationFailed);
    }

    if has_crossing_edges(&loops) {
        return Err(InvalidCut::SelfIntersectingLoop);
    }

    // 3. Attach every hole to the smallest outer loop containing it.
    let (outers, holes): (Vec<_>, Vec<_>) = loops.into_iter().partition(|l| l.signed_area > 0.0);
    let mut holes_of: Vec<Vec<CapLoop>> = outers.iter().map(|_| vec![]).collect();

    for hole in holes {
        let parent = outers
            .iter()
            .enumerate()
            .filter(|(_, outer)| {
                hole.coords
                    .iter()
                    .any(|pt| parry::utils::point_in_poly2d(pt, &outer.coords))
            })
            .min_by_key(|(_, outer)| OrderedFloat(outer.signed_area))
            .map(|(i, _)| i)
            .ok_or(InvalidCut::TriangulationFailed)?;
        holes_of[parent].push(hole);
    }

    // 4. Triangulate.
    let mut area = 0.0;
    for (outer, holes) in outers.iter().zip(holes_of.iter()) {
        area += outer.signed_area + holes.iter().map(|h| h.signed_area).sum::<Real>();

        if holes.is_empty() && is_star_shaped(&outer.coords) {
            fan_from_centroid(side, splitter, outer);
        } else {
            ear_clip(side, splitter, outer, holes)?;
        }
    }

    Ok(area)
}

/// The plane edges of a side that are not matched by an opposite edge.
fn boundary_edges(plane_edges: &[(CutVertex, CutVertex)]) -> Vec<(CutVertex, CutVertex)> {
    let mut counts: BTreeMap<(CutVertex, CutVertex), isize> = BTreeMap::new();

    for (a, b) in plane_edges {
        *counts.entry((*a, *b)).or_insert(0) += 1;
    }

    let mut boundary = vec![];
    for (&(a, b), &count) in &counts {
        let opposite = counts.get(&(b, a)).copied().unwrap_or(0);
        for _ in opposite..count {
            boundary.push((a, b));
        }
    }

    boundary
}

/// Chains directed edges into closed loops.
///
/// Each loop starts at its vertex with the smallest `key`, so the output
/// does not depend on the order of the edges.
fn stitch_loops<K: Ord>(
    edges: &[(CutVertex, CutVertex)],
    key: impl Fn(CutVertex) -> K,
) -> Result<Vec<Vec<CutVertex>>, InvalidCut> {
    let mut next = BTreeMap::new();
    let mut incoming = BTreeMap::new();

    for (a, b) in edges {
        if next.insert(*a, *b).is_some() || incoming.insert(*b, *a).is_some() {
            return Err(InvalidCut::BranchingLoop);
        }
    }

    let mut loops = vec![];

    while let Some(start) = next.keys().copied().min_by_key(|v| (key(*v), *v)) {
        let mut vertices = vec![start];
        let mut curr = next.remove(&start).ok_or(InvalidCut::OpenLoop)?;

        while curr != start {
            vertices.push(curr);
            curr = next.remove(&curr).ok_or(InvalidCut::OpenLoop)?;
        }

        if vertices.len() < 3 {
            return Err(InvalidCut::OpenLoop);
        }

        loops.push(vertices);
    }

    Ok(loops)
}

fn polygon_signed_area(coords: &[Point2<Real>]) -> Real {
    let mut area = 0.0;
    for i in 0..coords.len() {
        let a = coords[i];
        let b = coords[(i + 1) % coords.len()];
        area += a.x * b.y - a.y * b.x;
    }
    area * 0.5
}

fn orient2d(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>) -> Real {
    (b - a).perp(&(c - a))
}

fn segments_cross(a: [&Point2<Real>; 2], b: [&Point2<Real>; 2]) -> bool {
    let tol = (a[1] - a[0]).norm() * (b[1] - b[0]).norm() * 1.0e-12;
    let o1 = orient2d(a[0], a[1], b[0]);
    let o2 = orient2d(a[0], a[1], b[1]);
    let o3 = orient2d(b[0], b[1], a[0]);
    let o4 = orient2d(b[0], b[1], a[1]);

    ((o1 > tol && o2 < -tol) || (o1 < -tol && o2 > tol))
        && ((o3 > tol && o4 < -tol) || (o3 < -tol && o4 > tol))
}

/// Tests whether two edges of the loops cross each other.
///
/// Edges sharing a vertex are never considered crossing.
fn has_crossing_edges(loops: &[CapLoop]) -> bool {
    let edges: Vec<_> = loops
        .iter()
        .flat_map(|l| {
            l.edges().map(move |(i, j)| {
                (
                    [l.vertices[i], l.vertices[j]],
                    [&l.coords[i], &l.coords[j]],
                )
            })
        })
        .collect();

    for (k, (va, ca)) in edges.iter().enumerate() {
        for (vb, cb) in &edges[k + 1..] {
            if va.iter().any(|v| vb.contains(v)) {
                continue;
            }

            if segments_cross(*ca, *cb) {
                return true;
            }
        }
    }

    false
}

/// Per-vertex weights whose weighted sum of vertices, divided by the
/// polygon area, is the area centroid of the polygon.
fn centroid_weights(coords: &[Point2<Real>]) -> Vec<Real> {
    // Fan from the first vertex: each triangle contributes its signed area
    // to the centroid of its three vertices.
    let mut weights = vec![0.0; coords.len()];
    for i in 1..coords.len().saturating_sub(1) {
        let w = orient2d(&coords[0], &coords[i], &coords[i + 1]) * 0.5 / 3.0;
        weights[0] += w;
        weights[i] += w;
        weights[i + 1] += w;
    }
    weights
}

fn is_star_shaped(coords: &[Point2<Real>]) -> bool {
    let area = polygon_signed_area(coords);
    if area <= 0.0 {
        return false;
    }

    let center = coords
        .iter()
        .zip(centroid_weights(coords))
        .fold(Vector2::zeros(), |acc, (pt, w)| acc + pt.coords * w)
        / area;
    let center = Point2::from(center);
    let tol = area * 1.0e-9;

    (0..coords.len()).all(|i| orient2d(&center, &coords[i], &coords[(i + 1) % coords.len()]) > tol)
}

fn fan_from_centroid(side: &mut SideBuilder, splitter: &Splitter, outer: &CapLoop) {
    let positions: Vec<Point<Real>> = outer.vertices.iter().map(|v| splitter.position(*v)).collect();
    let weights = centroid_weights(&outer.coords);
    let center = positions
        .iter()
        .zip(weights)
        .fold(Vector::<Real>::zeros(), |acc, (pt, w)| acc + pt.coords * w)
        / outer.signed_area;

    let center_id = side.push_point(Point::from(center));
    let ids: Vec<u32> = outer
        .vertices
        .iter()
        .map(|v| side.vertex_id(*v, splitter))
        .collect();

    for i in 0..ids.len() {
        side.triangles.push([center_id, ids[i], ids[(i + 1) % ids.len()]]);
    }
}

fn ear_clip(
    side: &mut SideBuilder,
    splitter: &Splitter,
    outer: &CapLoop,
    holes: &[CapLoop],
) -> Result<(), InvalidCut> {
    let mut flat = vec![];
    let mut vertices = vec![];
    let mut coords = vec![];
    let mut hole_starts = vec![];

    for (i, ring) in std::iter::once(outer).chain(holes.iter()).enumerate() {
        if i > 0 {
            hole_starts.push(vertices.len());
        }

        for (vertex, pt) in ring.vertices.iter().zip(ring.coords.iter()) {
            flat.push(pt.x);
            flat.push(pt.y);
            vertices.push(*vertex);
            coords.push(*pt);
        }
    }

    let indices =
        earcutr::earcut(&flat, &hole_starts, 2).map_err(|_| InvalidCut::TriangulationFailed)?;

    let expected_area = outer.signed_area + holes.iter().map(|h| h.signed_area).sum::<Real>();
    let mut triangulated_area = 0.0;
    let mut triangles = vec![];

    for tri in indices.chunks_exact(3) {
        let (a, mut b, mut c) = (tri[0], tri[1], tri[2]);
        let mut area = orient2d(&coords[a], &coords[b], &coords[c]) * 0.5;

        if area < 0.0 {
            std::mem::swap(&mut b, &mut c);
            area = -area;
        }

        if area > 0.0 {
            triangulated_area += area;
            triangles.push([a, b, c]);
        }
    }

    if (triangulated_area - expected_area).abs() > expected_area.abs() * 1.0e-6 + 1.0e-12 {
        return Err(InvalidCut::TriangulationFailed);
    }

    for [a, b, c] in triangles {
        let ids = [
            side.vertex_id(vertices[a], splitter),
            side.vertex_id(vertices[b], splitter),
            side.vertex_id(vertices[c], splitter),
        ];
        side.triangles.push(ids);
    }

    Ok(())
}
