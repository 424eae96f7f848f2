/*!
acd3d
=====

**acd3d** computes approximate convex decompositions of 3D triangle meshes.

The input surface is recursively cut by planes selected with a Monte-Carlo
tree search guided by a concavity cost, until every piece is close enough to
its convex hull. Adjacent pieces are then greedily merged back together when
doing so keeps the concavity below the same threshold.

```no_run
use acd3d::{decompose, Mesh, Parameters};
use acd3d::na::Point3;

let points = vec![
    Point3::new(0.0, 0.0, 0.0),
    Point3::new(1.0, 0.0, 0.0),
    Point3::new(0.0, 1.0, 0.0),
    Point3::new(0.0, 0.0, 1.0),
];
let triangles = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];
let mesh = Mesh::load(points, triangles).unwrap();
let hulls = decompose(&mesh, &Parameters::default()).unwrap();
assert_eq!(hulls.len(), 1);
```
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)] // Maybe revisit this one later.
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![allow(clippy::type_complexity)] // Complains about closures that are fairly simple.
#![warn(unused_qualifications)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[cfg_attr(test, macro_use)]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;
pub extern crate parry3d_f64 as parry;

pub use self::clip::{clip_mesh, ClipResult, Cut, InvalidCut};
pub use self::decomposition::{
    best_cutting_planes, clip, compute_convex_hull, decompose, merge, mesh_score, normalize,
    recover, MeshScore,
};
pub use self::error::{AcdError, MeshError};
pub use self::logging::{set_log_level, LogLevel};
pub use self::mesh::{Mesh, Normalization};
pub use self::parameters::{ApproximationMode, Parameters, PreprocessMode};
pub use self::plane::{Axis, Plane};

pub mod candidates;
pub mod clip;
pub mod cost;
pub mod decomposition;
mod error;
pub mod ffi;
pub mod hull;
mod logging;
pub mod mcts;
pub mod merge;
pub mod mesh;
mod parameters;
mod plane;
pub mod preprocess;
mod rng;

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use na::{Isometry3, Matrix3, Point2, Point3, Rotation3, UnitVector3, Vector2, Vector3};

    /// The scalar type used throughout this crate.
    pub use f64 as Real;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The matrix type.
    pub use Matrix3 as Matrix;

    /// The rotation matrix type.
    pub use Rotation3 as Rotation;

    /// The transformation matrix type.
    pub use Isometry3 as Isometry;

    /// The dimension of the space.
    pub const DIM: usize = 3;
}
