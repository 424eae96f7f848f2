use crate::math::{Point, Real, Vector};

/// One of the three coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Axis {
    /// The `x` axis.
    X,
    /// The `y` axis.
    Y,
    /// The `z` axis.
    Z,
}

impl Axis {
    /// The three axes, in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The coordinate index of this axis.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The unit vector along this axis.
    pub fn direction(self) -> Vector<Real> {
        Vector::ith(self.index(), 1.0)
    }
}

/// An oriented plane `{x : normal · x + d = 0}`.
///
/// The positive side of the plane is the half-space `normal · x + d ≥ 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    /// The unit normal `(a, b, c)` of the plane.
    pub normal: Vector<Real>,
    /// The offset `d` of the plane.
    pub d: Real,
    /// The axis this plane is orthogonal to, if it was generated as an
    /// axis-aligned candidate.
    pub axis: Option<Axis>,
}

impl Plane {
    /// Builds the plane `a·x + b·y + c·z + d = 0`.
    ///
    /// The coefficients are rescaled so the normal has unit length. Returns
    /// `None` if `(a, b, c)` is zero or not finite.
    pub fn new(a: Real, b: Real, c: Real, d: Real) -> Option<Self> {
        let normal = Vector::new(a, b, c);
        let norm = normal.norm();

        if norm == 0.0 || !norm.is_finite() || !d.is_finite() {
            return None;
        }

        Some(Self {
            normal: normal / norm,
            d: d / norm,
            axis: None,
        })
    }

    /// The plane orthogonal to `axis` passing through the coordinate `offset`
    /// along that axis, oriented toward the positive axis direction.
    pub fn axis_aligned(axis: Axis, offset: Real) -> Self {
        Self {
            normal: axis.direction(),
            d: -offset,
            axis: Some(axis),
        }
    }

    /// The `(a, b, c, d)` coefficients of this plane.
    pub fn coefficients(&self) -> [Real; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    /// Signed distance from `pt` to this plane, positive on the positive side.
    #[inline]
    pub fn signed_distance(&self, pt: &Point<Real>) -> Real {
        self.normal.dot(&pt.coords) + self.d
    }

    /// The parallel plane moved by `distance` along the normal.
    pub fn translated(&self, distance: Real) -> Self {
        Self {
            d: self.d - distance,
            ..*self
        }
    }

    /// A point of the plane.
    pub fn origin(&self) -> Point<Real> {
        Point::from(-self.normal * self.d)
    }
}
