use crate::math::{Point, Real, Vector};
use crate::{AcdError, MeshError};
use parry::bounding_volume::Aabb;
use parry::shape::TriMesh;

/// A triangle soup: an ordered list of points and triangles indexing them.
///
/// Triangles are expected to be oriented counter-clockwise when seen from
/// outside of the enclosed volume.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Mesh {
    /// The vertex buffer.
    pub points: Vec<Point<Real>>,
    /// The index buffer.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates a mesh without validating its indices.
    ///
    /// Use [`Mesh::load`] for meshes coming from untrusted sources.
    pub fn new(points: Vec<Point<Real>>, triangles: Vec<[u32; 3]>) -> Self {
        Self { points, triangles }
    }

    /// Creates a mesh after checking its indices and coordinates.
    ///
    /// Fails if a triangle references a missing vertex, if a triangle
    /// repeats one of its indices, or if a coordinate is not finite.
    /// Triangles with zero area are accepted.
    pub fn load(points: Vec<Point<Real>>, triangles: Vec<[u32; 3]>) -> Result<Self, AcdError> {
        for (vertex, pt) in points.iter().enumerate() {
            if !pt.coords.iter().all(|e| e.is_finite()) {
                return Err(MeshError::NonFiniteVertex { vertex }.into());
            }
        }

        for (triangle, tri) in triangles.iter().enumerate() {
            for &index in tri {
                if index as usize >= points.len() {
                    return Err(MeshError::IndexOutOfBounds {
                        triangle,
                        index,
                        num_points: points.len(),
                    }
                    .into());
                }
            }

            if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
                return Err(MeshError::RepeatedIndex { triangle }.into());
            }
        }

        Ok(Self { points, triangles })
    }

    /// Does this mesh have no triangle?
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The three vertices of the `i`-th triangle.
    #[inline]
    pub fn triangle_vertices(&self, i: usize) -> [Point<Real>; 3] {
        let [a, b, c] = self.triangles[i];
        [
            self.points[a as usize],
            self.points[b as usize],
            self.points[c as usize],
        ]
    }

    /// The non-normalized normal of the `i`-th triangle, with a norm equal
    /// to twice its area.
    #[inline]
    pub fn scaled_normal(&self, i: usize) -> Vector<Real> {
        let [a, b, c] = self.triangle_vertices(i);
        (b - a).cross(&(c - a))
    }

    /// The area of the `i`-th triangle.
    #[inline]
    pub fn triangle_area(&self, i: usize) -> Real {
        self.scaled_normal(i).norm() * 0.5
    }

    /// The total surface area of this mesh.
    pub fn area(&self) -> Real {
        (0..self.triangles.len()).map(|i| self.triangle_area(i)).sum()
    }

    /// The signed volume enclosed by this mesh.
    ///
    /// This is positive for a closed mesh with outward-facing triangles.
    /// The result is meaningless if the mesh is not closed.
    pub fn signed_volume(&self) -> Real {
        let mut total_volume = 0.0;

        for i in 0..self.triangles.len() {
            let [a, b, c] = self.triangle_vertices(i);
            total_volume += a.coords.dot(&b.coords.cross(&c.coords));
        }

        total_volume / 6.0
    }

    /// The absolute value of [`Mesh::signed_volume`].
    pub fn volume(&self) -> Real {
        self.signed_volume().abs()
    }

    /// The axis-aligned bounding box of the vertices of this mesh.
    ///
    /// Returns an invalid AABB (with `mins > maxs`) if the mesh has no vertex.
    pub fn aabb(&self) -> Aabb {
        let mut mins = Point::from(Vector::repeat(Real::MAX));
        let mut maxs = Point::from(Vector::repeat(-Real::MAX));

        for pt in &self.points {
            mins = mins.inf(pt);
            maxs = maxs.sup(pt);
        }

        Aabb::new(mins, maxs)
    }

    /// The length of the diagonal of this mesh's AABB.
    pub fn bbox_diagonal(&self) -> Real {
        if self.points.is_empty() {
            return 0.0;
        }

        let aabb = self.aabb();
        (aabb.maxs - aabb.mins).norm()
    }

    /// The concatenation of `self` and `other` as a single mesh.
    pub fn merged_with(&self, other: &Mesh) -> Mesh {
        let base = self.points.len() as u32;
        let mut points = self.points.clone();
        let mut triangles = self.triangles.clone();
        points.extend_from_slice(&other.points);
        triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + base, t[1] + base, t[2] + base]),
        );
        Mesh { points, triangles }
    }

    /// Builds the parry triangle mesh (and its BVH) of this mesh.
    ///
    /// Returns `None` if this mesh has no triangle.
    pub fn to_trimesh(&self) -> Option<TriMesh> {
        if self.triangles.is_empty() {
            return None;
        }

        TriMesh::new(self.points.clone(), self.triangles.clone()).ok()
    }

    /// Applies `f` to every vertex of this mesh.
    pub fn transform_points(&mut self, f: impl Fn(&Point<Real>) -> Point<Real>) {
        for pt in &mut self.points {
            *pt = f(pt);
        }
    }
}
