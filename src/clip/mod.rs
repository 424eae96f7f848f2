//! Plane clipping of closed triangle meshes.

use crate::math::{Point, Real, Vector};
use crate::{Mesh, Plane};
use parry::utils::SortedPair;
use std::collections::HashMap;

mod cap;

/// Vertices closer than this distance to the cutting plane are considered
/// to lie on it.
pub const PLANE_EPSILON: Real = 1.0e-6;
/// Edge intersection parameters are clamped to `[EDGE_EPSILON, 1 - EDGE_EPSILON]`
/// so that no sliver triangle is created next to an edge endpoint.
pub const EDGE_EPSILON: Real = 1.0e-4;
/// Each side of a valid cut must have at least this number of triangles.
pub const MIN_PART_TRIANGLES: usize = 4;

/// The two closed meshes resulting from a successful cut.
#[derive(Clone, Debug, PartialEq)]
pub struct Cut {
    /// The part lying on the positive side of the plane.
    pub pos: Mesh,
    /// The part lying on the negative side of the plane.
    pub neg: Mesh,
    /// The area of the section of the mesh by the plane.
    ///
    /// This is the area of the caps closing the two parts, plus the area of
    /// the input triangles lying on the plane. When no triangle lies on the
    /// plane, the areas of `pos` and `neg` add up to the input area plus
    /// `2 * cut_area`.
    pub cut_area: Real,
}

/// Reasons for which a plane fails to cut a mesh properly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvalidCut {
    /// All the triangles lie on the same side of the plane.
    EmptySide,
    /// One side has fewer than [`MIN_PART_TRIANGLES`] triangles.
    TooFewTriangles,
    /// The section of the mesh by the plane does not form closed loops.
    OpenLoop,
    /// A vertex of the section is shared by more than two section edges.
    BranchingLoop,
    /// Two edges of the section cross each other.
    SelfIntersectingLoop,
    /// The section polygons could not be triangulated.
    TriangulationFailed,
}

/// The result of [`clip_mesh`].
#[derive(Clone, Debug, PartialEq)]
pub enum ClipResult {
    /// The plane cuts the mesh into two valid parts.
    Valid(Cut),
    /// The plane does not cut the mesh properly.
    Invalid(InvalidCut),
}

impl ClipResult {
    /// Is this a valid cut?
    pub fn is_valid(&self) -> bool {
        matches!(self, ClipResult::Valid(_))
    }

    /// The cut, if it is valid.
    pub fn valid(self) -> Option<Cut> {
        match self {
            ClipResult::Valid(cut) => Some(cut),
            ClipResult::Invalid(_) => None,
        }
    }
}

/// Identifies a vertex of the clipped meshes.
///
/// Intersection points are identified by the edge they lie on so the
/// triangles sharing that edge share the same vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum CutVertex {
    Original(u32),
    Edge(SortedPair<u32>),
}

struct Splitter<'a> {
    mesh: &'a Mesh,
    plane: &'a Plane,
    dists: Vec<Real>,
    // -1: negative side, 0: on the plane, 1: positive side.
    classes: Vec<i8>,
}

impl Splitter<'_> {
    fn position(&self, vertex: CutVertex) -> Point<Real> {
        match vertex {
            CutVertex::Original(i) => self.mesh.points[i as usize],
            CutVertex::Edge(edge) => {
                // Always interpolate from the smallest index so every
                // triangle gets the exact same point.
                let (a, b) = *edge;
                let (da, db) = (self.dists[a as usize], self.dists[b as usize]);
                let u = (da / (da - db)).clamp(EDGE_EPSILON, 1.0 - EDGE_EPSILON);
                let pa = self.mesh.points[a as usize];
                let pb = self.mesh.points[b as usize];
                pa + (pb - pa) * u
            }
        }
    }

    fn is_on_plane(&self, vertex: CutVertex) -> bool {
        match vertex {
            CutVertex::Original(i) => self.classes[i as usize] == 0,
            CutVertex::Edge(_) => true,
        }
    }
}

/// Accumulates the triangles of one side of the cut.
#[derive(Default)]
struct SideBuilder {
    points: Vec<Point<Real>>,
    triangles: Vec<[u32; 3]>,
    ids: HashMap<CutVertex, u32>,
    // Directed edges of the emitted triangles lying on the cutting plane.
    plane_edges: Vec<(CutVertex, CutVertex)>,
}

impl SideBuilder {
    fn vertex_id(&mut self, vertex: CutVertex, splitter: &Splitter) -> u32 {
        if let Some(id) = self.ids.get(&vertex) {
            return *id;
        }

        let id = self.push_point(splitter.position(vertex));
        let _ = self.ids.insert(vertex, id);
        id
    }

    fn push_point(&mut self, pt: Point<Real>) -> u32 {
        self.points.push(pt);
        self.points.len() as u32 - 1
    }

    fn push(&mut self, tri: [CutVertex; 3], splitter: &Splitter) {
        let pts = tri.map(|v| splitter.position(v));
        if is_degenerate_triangle(&pts) {
            return;
        }

        let ids = [
            self.vertex_id(tri[0], splitter),
            self.vertex_id(tri[1], splitter),
            self.vertex_id(tri[2], splitter),
        ];
        self.triangles.push(ids);

        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            if splitter.is_on_plane(a) && splitter.is_on_plane(b) {
                self.plane_edges.push((a, b));
            }
        }
    }

    fn into_mesh(self) -> Mesh {
        Mesh::new(self.points, self.triangles)
    }
}

fn is_degenerate_triangle(pts: &[Point<Real>; 3]) -> bool {
    let ab = pts[1] - pts[0];
    let ac = pts[2] - pts[0];
    let bc = pts[2] - pts[1];
    let max_sq_len = ab.norm_squared().max(ac.norm_squared()).max(bc.norm_squared());
    ab.cross(&ac).norm() <= max_sq_len * 1.0e-12
}

/// Index of the side builder receiving the vertices of class `class`.
fn side_index(class: i8) -> usize {
    if class > 0 {
        0
    } else {
        1
    }
}

/// Cuts `mesh` by `plane` into a positive and a negative closed part.
///
/// Triangles crossing the plane are split, and the holes left along the
/// plane on each side are closed by triangulating the section polygons.
/// Triangles lying on the plane go to the side they bound: a triangle
/// whose normal points along the plane normal bounds material on the
/// negative side.
///
/// The result is invalid if a side ends up empty or with fewer than
/// [`MIN_PART_TRIANGLES`] triangles, or if the section polygons cannot be
/// built or triangulated. The output is a deterministic function of the
/// inputs.
pub fn clip_mesh(mesh: &Mesh, plane: &Plane) -> ClipResult {
    // 1. Classify the vertices.
    let dists: Vec<Real> = mesh.points.iter().map(|pt| plane.signed_distance(pt)).collect();
    let classes = dists
        .iter()
        .map(|d| {
            if *d > PLANE_EPSILON {
                1
            } else if *d < -PLANE_EPSILON {
                -1
            } else {
                0
            }
        })
        .collect();
    let splitter = Splitter {
        mesh,
        plane,
        dists,
        classes,
    };

    // 2. Split the triangles.
    let mut sides = [SideBuilder::default(), SideBuilder::default()];
    let mut coplanar_area = 0.0;

    for (i, tri) in mesh.triangles.iter().enumerate() {
        let c = tri.map(|v| splitter.classes[v as usize]);
        let has_pos = c.iter().any(|e| *e > 0);
        let has_neg = c.iter().any(|e| *e < 0);

        match (has_pos, has_neg) {
            (true, false) => sides[0].push(tri.map(CutVertex::Original), &splitter),
            (false, true) => sides[1].push(tri.map(CutVertex::Original), &splitter),
            (false, false) => {
                let normal = mesh.scaled_normal(i);
                let side = if normal.dot(&plane.normal) > 0.0 { 1 } else { 0 };
                sides[side].push(tri.map(CutVertex::Original), &splitter);
                coplanar_area += normal.norm() * 0.5;
            }
            (true, true) => split_triangle(*tri, c, &mut sides, &splitter),
        }
    }

    if sides.iter().any(|side| side.triangles.is_empty()) {
        return ClipResult::Invalid(InvalidCut::EmptySide);
    }

    // 3. Close the holes along the plane.
    let [mut pos, mut neg] = sides;
    let pos_cap_area = match cap::close_side(&mut pos, &splitter, -1.0) {
        Ok(area) => area,
        Err(err) => return ClipResult::Invalid(err),
    };
    let neg_cap_area = match cap::close_side(&mut neg, &splitter, 1.0) {
        Ok(area) => area,
        Err(err) => return ClipResult::Invalid(err),
    };

    if pos.triangles.len() < MIN_PART_TRIANGLES || neg.triangles.len() < MIN_PART_TRIANGLES {
        return ClipResult::Invalid(InvalidCut::TooFewTriangles);
    }

    ClipResult::Valid(Cut {
        pos: pos.into_mesh(),
        neg: neg.into_mesh(),
        cut_area: (pos_cap_area + neg_cap_area) * 0.5 + coplanar_area,
    })
}

fn split_triangle(tri: [u32; 3], c: [i8; 3], sides: &mut [SideBuilder; 2], splitter: &Splitter) {
    let rotate = |k: usize| {
        (
            [tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]],
            [c[k], c[(k + 1) % 3], c[(k + 2) % 3]],
        )
    };

    if let Some(k) = (0..3).find(|k| c[*k] == 0) {
        // One vertex on the plane, the two others on opposite sides.
        let ([v0, v1, v2], [_, c1, c2]) = rotate(k);
        let i12 = CutVertex::Edge(SortedPair::new(v1, v2));
        let (v0, v1, v2) = (
            CutVertex::Original(v0),
            CutVertex::Original(v1),
            CutVertex::Original(v2),
        );
        sides[side_index(c1)].push([v0, v1, i12], splitter);
        sides[side_index(c2)].push([v0, i12, v2], splitter);
    } else {
        // One vertex alone on its side of the plane.
        let k = (0..3)
            .find(|k| c[*k] != c[(*k + 1) % 3] && c[*k] != c[(*k + 2) % 3])
            .unwrap_or(0);
        let ([v0, v1, v2], [c0, c1, _]) = rotate(k);
        let i01 = CutVertex::Edge(SortedPair::new(v0, v1));
        let i20 = CutVertex::Edge(SortedPair::new(v2, v0));
        let (v0, v1, v2) = (
            CutVertex::Original(v0),
            CutVertex::Original(v1),
            CutVertex::Original(v2),
        );
        sides[side_index(c0)].push([v0, i01, i20], splitter);
        sides[side_index(c1)].push([i01, v1, v2], splitter);
        sides[side_index(c1)].push([i01, v2, i20], splitter);
    }
}

/// An orthonormal basis `(u, v)` of the plane orthogonal to `normal`, with
/// `u × v = normal`.
fn plane_basis(normal: &Vector<Real>) -> (Vector<Real>, Vector<Real>) {
    let reference = if normal.x.abs() < 0.9 {
        Vector::x()
    } else {
        Vector::y()
    };
    let u = reference.cross(normal).normalize();
    let v = normal.cross(&u);
    (u, v)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Axis;

    pub(crate) fn unit_cube() -> Mesh {
        crate::hull::box_hull(&parry::bounding_volume::Aabb::new(
            Point::origin(),
            Point::new(1.0, 1.0, 1.0),
        ))
    }

    #[test]
    fn cube_cut_in_half() {
        let cube = unit_cube();
        let cut = clip_mesh(&cube, &Plane::axis_aligned(Axis::Y, 0.5))
            .valid()
            .unwrap();

        assert_relative_eq!(cut.cut_area, 1.0, epsilon = 1.0e-6);
        assert!(cut.pos.is_manifold());
        assert!(cut.neg.is_manifold());
        assert_relative_eq!(cut.pos.signed_volume(), 0.5, epsilon = 1.0e-9);
        assert_relative_eq!(cut.neg.signed_volume(), 0.5, epsilon = 1.0e-9);
        assert_relative_eq!(
            cut.pos.area() + cut.neg.area(),
            cube.area() + 2.0 * cut.cut_area,
            epsilon = 1.0e-9
        );
        assert!(cut.pos.points.iter().all(|p| p.y >= 0.5 - PLANE_EPSILON));
        assert!(cut.neg.points.iter().all(|p| p.y <= 0.5 + PLANE_EPSILON));
    }

    #[test]
    fn oblique_cut_through_vertices() {
        // This plane contains the cube vertices (0, 0, 0) and (1, 1, 1).
        let cube = unit_cube();
        let plane = Plane::new(1.0, -1.0, 0.0, 0.0).unwrap();
        let cut = clip_mesh(&cube, &plane).valid().unwrap();

        assert_relative_eq!(cut.cut_area, 2.0f64.sqrt(), epsilon = 1.0e-6);
        assert!(cut.pos.is_manifold());
        assert!(cut.neg.is_manifold());
        assert_relative_eq!(cut.pos.volume(), 0.5, epsilon = 1.0e-9);
    }

    #[test]
    fn plane_missing_the_mesh_is_invalid() {
        let cube = unit_cube();
        assert_eq!(
            clip_mesh(&cube, &Plane::axis_aligned(Axis::X, 2.0)),
            ClipResult::Invalid(InvalidCut::EmptySide)
        );
        // A plane containing a face leaves the whole cube on one side.
        assert_eq!(
            clip_mesh(&cube, &Plane::axis_aligned(Axis::X, 1.0)),
            ClipResult::Invalid(InvalidCut::EmptySide)
        );
    }

    #[test]
    fn clipping_is_deterministic() {
        let cube = unit_cube();
        let plane = Plane::new(0.3, 0.5, -0.2, -0.1).unwrap();
        assert_eq!(clip_mesh(&cube, &plane), clip_mesh(&cube, &plane));
    }
}
