//! Triangle mesh storage and the transforms applied around the decomposition.

pub use self::mesh::Mesh;
pub use self::normalization::Normalization;

mod manifold;
mod mesh;
mod normalization;
mod pca;
