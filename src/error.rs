/// Errors reported by the public entry points of this crate.
///
/// Only hard failures are surfaced here. A plane that fails to cut a part
/// properly is reported through [`ClipResult::Invalid`](crate::ClipResult::Invalid)
/// and handled locally, and reaching the `max_convex_hull` budget simply
/// yields a partial result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AcdError {
    /// A numeric parameter is out of its valid range, or an enum tag is unknown.
    ///
    /// No computation is performed when this error is returned.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// The name of the offending parameter.
        name: &'static str,
        /// Human-readable description of the accepted range.
        reason: String,
    },

    /// The input mesh failed validation.
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),

    /// A geometric primitive hit a degenerate configuration it could not
    /// recover from.
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// The string given to [`set_log_level`](crate::set_log_level) does not
    /// name a known level.
    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),
}

/// Reasons for rejecting a mesh at load time.
///
/// # Example
///
/// ```
/// use acd3d::{AcdError, Mesh, MeshError};
/// use acd3d::na::Point3;
///
/// let points = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
/// let result = Mesh::load(points, vec![[0, 1, 2]]);
/// assert_eq!(
///     result.unwrap_err(),
///     AcdError::InvalidMesh(MeshError::IndexOutOfBounds {
///         triangle: 0,
///         index: 2,
///         num_points: 2
///     })
/// );
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index} but the mesh only has {num_points} vertices")]
    IndexOutOfBounds {
        /// Index of the faulty triangle.
        triangle: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices of the mesh.
        num_points: usize,
    },
    /// A triangle references the same vertex more than once.
    #[error("triangle {triangle} repeats a vertex index")]
    RepeatedIndex {
        /// Index of the faulty triangle.
        triangle: usize,
    },
    /// A vertex has a NaN or infinite coordinate.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Index of the faulty vertex.
        vertex: usize,
    },
    /// A triangle index given through the C interface is negative.
    #[error("triangle {triangle} has a negative vertex index")]
    NegativeIndex {
        /// Index of the faulty triangle.
        triangle: usize,
    },
}
