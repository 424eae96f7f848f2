use crate::math::{Point, Real, Vector, DIM};
use crate::Mesh;
use parry::bounding_volume::Aabb;
use parry::query::details::intersection_test_aabb_triangle;
use parry::shape::Triangle;
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum VoxelState {
    Empty,
    Surface,
    Exterior,
}

/// A regular grid of cubic voxels covering a mesh, with one layer of empty
/// voxels around it.
///
/// Voxel centers lie on the planes `mins + i * voxel_size`, so the faces of
/// axis-aligned meshes never coincide with voxel boundaries.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    origin: Point<Real>,
    voxel_size: Real,
    dims: [usize; DIM],
    states: Vec<VoxelState>,
}

impl VoxelGrid {
    /// Marks the voxels intersecting the triangles of `mesh`.
    ///
    /// Returns `None` if `mesh` has no triangle or if its bounding box is
    /// a single point.
    pub fn from_surface(mesh: &Mesh, resolution: u32) -> Option<Self> {
        if mesh.triangles.is_empty() {
            return None;
        }

        let aabb = mesh.aabb();
        let extents = aabb.extents();
        let max_extent = extents.max();

        if !(max_extent > 0.0) {
            return None;
        }

        let voxel_size = max_extent / resolution.max(1) as Real;
        let mut dims = [0; DIM];
        for i in 0..DIM {
            dims[i] = (extents[i] / voxel_size).ceil().max(1.0) as usize + 3;
        }

        // Voxel centers are aligned with the bounding box, with one layer of
        // empty voxels on each side.
        let origin = aabb.mins - Vector::repeat(voxel_size * 1.5);
        let mut grid = Self {
            origin,
            voxel_size,
            dims,
            states: vec![VoxelState::Empty; dims[0] * dims[1] * dims[2]],
        };

        for i in 0..mesh.triangles.len() {
            let [a, b, c] = mesh.triangle_vertices(i);
            grid.mark_triangle(&Triangle::new(a, b, c));
        }

        Some(grid)
    }

    /// The number of voxels along each axis.
    pub fn dims(&self) -> [usize; DIM] {
        self.dims
    }

    /// The side length of the voxels.
    pub fn voxel_size(&self) -> Real {
        self.voxel_size
    }

    fn index(&self, [i, j, k]: [usize; DIM]) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    fn voxel_aabb(&self, [i, j, k]: [usize; DIM]) -> Aabb {
        let mins = self.origin + Vector::new(i as Real, j as Real, k as Real) * self.voxel_size;
        Aabb::new(mins, mins + Vector::repeat(self.voxel_size))
    }

    fn mark_triangle(&mut self, tri: &Triangle) {
        let tri_aabb = tri.local_aabb();
        let mut range = [(0, 0); DIM];

        for d in 0..DIM {
            let lo = ((tri_aabb.mins[d] - self.origin[d]) / self.voxel_size).floor() as isize - 1;
            let hi = ((tri_aabb.maxs[d] - self.origin[d]) / self.voxel_size).floor() as isize + 1;
            range[d] = (
                lo.max(0) as usize,
                (hi.max(0) as usize).min(self.dims[d] - 1),
            );
        }

        for k in range[2].0..=range[2].1 {
            for j in range[1].0..=range[1].1 {
                for i in range[0].0..=range[0].1 {
                    let id = self.index([i, j, k]);
                    if self.states[id] != VoxelState::Surface
                        && intersection_test_aabb_triangle(&self.voxel_aabb([i, j, k]), tri)
                    {
                        self.states[id] = VoxelState::Surface;
                    }
                }
            }
        }
    }

    /// Flood-fills the empty voxels connected to the grid border. Every
    /// other voxel is considered solid afterward.
    pub fn fill_interior(&mut self) {
        let mut stack = vec![[0, 0, 0]];
        let start = self.index([0, 0, 0]);
        self.states[start] = VoxelState::Exterior;

        while let Some(curr) = stack.pop() {
            for (d, delta) in NEIGHBORS {
                let Some(next) = self.neighbor(curr, d, delta) else {
                    continue;
                };

                let id = self.index(next);
                if self.states[id] == VoxelState::Empty {
                    self.states[id] = VoxelState::Exterior;
                    stack.push(next);
                }
            }
        }
    }

    fn neighbor(&self, voxel: [usize; DIM], axis: usize, delta: isize) -> Option<[usize; DIM]> {
        let coord = voxel[axis] as isize + delta;
        if coord < 0 || coord >= self.dims[axis] as isize {
            return None;
        }

        let mut next = voxel;
        next[axis] = coord as usize;
        Some(next)
    }

    fn is_solid(&self, voxel: [usize; DIM]) -> bool {
        self.states[self.index(voxel)] != VoxelState::Exterior
    }

    /// The number of voxels that are not reachable from the grid border.
    pub fn num_solid_voxels(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s != VoxelState::Exterior)
            .count()
    }

    /// The faces separating solid voxels from exterior voxels, oriented
    /// toward the exterior. Shared corners are welded.
    pub fn boundary_mesh(&self) -> Mesh {
        let mut points = vec![];
        let mut triangles = vec![];
        let mut corner_ids: HashMap<[usize; DIM], u32> = HashMap::new();

        let mut corner_id = |corner: [usize; DIM], points: &mut Vec<Point<Real>>| {
            *corner_ids.entry(corner).or_insert_with(|| {
                let offset =
                    Vector::new(corner[0] as Real, corner[1] as Real, corner[2] as Real);
                points.push(self.origin + offset * self.voxel_size);
                points.len() as u32 - 1
            })
        };

        for k in 0..self.dims[2] {
            for j in 0..self.dims[1] {
                for i in 0..self.dims[0] {
                    let voxel = [i, j, k];
                    if !self.is_solid(voxel) {
                        continue;
                    }

                    for (axis, delta) in NEIGHBORS {
                        let exterior = match self.neighbor(voxel, axis, delta) {
                            Some(next) => !self.is_solid(next),
                            None => true,
                        };

                        if !exterior {
                            continue;
                        }

                        let quad = face_corners(voxel, axis, delta);
                        let ids = quad.map(|corner| corner_id(corner, &mut points));
                        triangles.push([ids[0], ids[1], ids[2]]);
                        triangles.push([ids[0], ids[2], ids[3]]);
                    }
                }
            }
        }

        Mesh::new(points, triangles)
    }
}

const NEIGHBORS: [(usize, isize); 6] = [(0, -1), (0, 1), (1, -1), (1, 1), (2, -1), (2, 1)];

/// The corners of the face of `voxel` facing `delta` along `axis`, counter-
/// clockwise when seen from outside of the voxel.
fn face_corners(voxel: [usize; DIM], axis: usize, delta: isize) -> [[usize; DIM]; 4] {
    let (b, c) = ((axis + 1) % DIM, (axis + 2) % DIM);
    let mut base = voxel;
    if delta > 0 {
        base[axis] += 1;
    }

    let corner = |db: usize, dc: usize| {
        let mut corner = base;
        corner[b] += db;
        corner[c] += dc;
        corner
    };

    if delta > 0 {
        [corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)]
    } else {
        [corner(0, 0), corner(0, 1), corner(1, 1), corner(1, 0)]
    }
}
