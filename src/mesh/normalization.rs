use super::Mesh;
use crate::math::{Point, Real, Rotation, Vector};
use crate::Plane;

/// The transform that maps a mesh into the `[-1, 1]³` reference cube.
///
/// It stores the original axis-aligned bounding box of the mesh and, if the
/// mesh was also aligned with its principal axes, the corresponding rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Normalization {
    /// Smallest `x` coordinate of the original mesh.
    pub x_min: Real,
    /// Largest `x` coordinate of the original mesh.
    pub x_max: Real,
    /// Smallest `y` coordinate of the original mesh.
    pub y_min: Real,
    /// Largest `y` coordinate of the original mesh.
    pub y_max: Real,
    /// Smallest `z` coordinate of the original mesh.
    pub z_min: Real,
    /// Largest `z` coordinate of the original mesh.
    pub z_max: Real,
    /// The principal-axes rotation `R` applied after scaling (`p' = Rᵀ p`).
    pub rotation: Option<Rotation<Real>>,
}

impl Normalization {
    /// The normalization of a mesh with the given bounding box.
    pub fn from_bounds(mins: Point<Real>, maxs: Point<Real>) -> Self {
        Self {
            x_min: mins.x,
            x_max: maxs.x,
            y_min: mins.y,
            y_max: maxs.y,
            z_min: mins.z,
            z_max: maxs.z,
            rotation: None,
        }
    }

    /// The six bounds `[x_min, x_max, y_min, y_max, z_min, z_max]`.
    pub fn bounds(&self) -> [Real; 6] {
        [
            self.x_min, self.x_max, self.y_min, self.y_max, self.z_min, self.z_max,
        ]
    }

    /// The center of the original bounding box.
    pub fn center(&self) -> Point<Real> {
        Point::new(
            (self.x_min + self.x_max) * 0.5,
            (self.y_min + self.y_max) * 0.5,
            (self.z_min + self.z_max) * 0.5,
        )
    }

    /// The ratio between original and normalized lengths.
    pub fn scale(&self) -> Real {
        let extent = (self.x_max - self.x_min)
            .max(self.y_max - self.y_min)
            .max(self.z_max - self.z_min);

        if extent > 0.0 && extent.is_finite() {
            extent * 0.5
        } else {
            1.0
        }
    }

    /// Maps an original point into the reference cube.
    pub fn normalize_point(&self, pt: &Point<Real>) -> Point<Real> {
        let scaled = Point::from((pt - self.center()) / self.scale());
        match &self.rotation {
            Some(rot) => rot.inverse_transform_point(&scaled),
            None => scaled,
        }
    }

    /// Maps a normalized point back to the original space.
    pub fn recover_point(&self, pt: &Point<Real>) -> Point<Real> {
        let unrotated = match &self.rotation {
            Some(rot) => rot.transform_point(pt),
            None => *pt,
        };
        self.center() + unrotated.coords * self.scale()
    }

    /// Maps a length measured in the reference cube back to the original space.
    pub fn recover_length(&self, length: Real) -> Real {
        length * self.scale()
    }

    /// Maps a length measured in the original space into the reference cube.
    pub fn normalize_length(&self, length: Real) -> Real {
        length / self.scale()
    }

    /// Expresses a plane of the reference cube in the original space.
    pub fn recover_plane(&self, plane: &Plane) -> Plane {
        let normal: Vector<Real> = match &self.rotation {
            Some(rot) => rot * plane.normal,
            None => plane.normal,
        };
        let d = plane.d * self.scale() - normal.dot(&self.center().coords);
        let axis = if self.rotation.is_some() {
            None
        } else {
            plane.axis
        };

        Plane { normal, d, axis }
    }
}

impl Mesh {
    /// Translates and scales this mesh so it fits in `[-1, 1]³`.
    ///
    /// The mesh is centered on the center of its bounding box and uniformly
    /// scaled so its largest extent becomes 2. Returns the transform needed
    /// by [`Mesh::recover`].
    pub fn normalize(&mut self) -> Normalization {
        if self.points.is_empty() {
            return Normalization::from_bounds(Point::origin(), Point::origin());
        }

        let aabb = self.aabb();
        let normalization = Normalization::from_bounds(aabb.mins, aabb.maxs);
        self.transform_points(|pt| normalization.normalize_point(pt));
        normalization
    }

    /// Undoes [`Mesh::normalize`] and, if it is set, the principal-axes
    /// rotation of `normalization`.
    pub fn recover(&mut self, normalization: &Normalization) {
        self.transform_points(|pt| normalization.recover_point(pt));
    }
}
