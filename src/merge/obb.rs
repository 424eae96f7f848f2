use crate::math::{Isometry, Point, Real};
use parry::shape::Cuboid;

/// An oriented bounding box aligned with the principal axes of a point set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obb {
    /// The position of the box center and the orientation of its axes.
    pub pose: Isometry<Real>,
    /// The box shape, centered at the origin of `pose`.
    pub cuboid: Cuboid,
}

impl Obb {
    /// The box enclosing `points`, aligned with the eigenvectors of their
    /// covariance matrix.
    ///
    /// Returns `None` if `points` is empty.
    pub fn from_points(points: &[Point<Real>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let (pose, cuboid) = parry::utils::obb(points);
        Some(Self { pose, cuboid })
    }

    /// The distance between this box and `other`, zero if they overlap.
    pub fn distance(&self, other: &Obb) -> Real {
        parry::query::distance(&self.pose, &self.cuboid, &other.pose, &other.cuboid)
            .unwrap_or(Real::INFINITY)
    }
}
