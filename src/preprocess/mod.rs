//! Conversion of arbitrary triangle soups into closed manifold meshes.

pub use self::voxels::VoxelGrid;

use crate::{Mesh, Parameters, PreprocessMode};

mod voxels;

/// Rebuilds `mesh` as the boundary of its voxelization on a grid with
/// `resolution` cells along its largest dimension.
///
/// The result is closed and consistently oriented outward. Cavities that are
/// not connected to the outside are filled. Returns an empty mesh if `mesh`
/// has no triangle.
pub fn manifoldize(mesh: &Mesh, resolution: u32) -> Mesh {
    match VoxelGrid::from_surface(mesh, resolution) {
        Some(mut grid) => {
            grid.fill_interior();
            grid.boundary_mesh()
        }
        None => Mesh::default(),
    }
}

/// Applies the manifold preprocessing policy of `params` to `mesh`.
pub fn preprocess(mesh: Mesh, params: &Parameters) -> Mesh {
    let remesh = match params.preprocess_mode {
        PreprocessMode::On => true,
        PreprocessMode::Off => false,
        PreprocessMode::Auto => !mesh.is_manifold(),
    };

    if !remesh {
        return mesh;
    }

    log::info!(
        "remeshing the input into a manifold (resolution {})",
        params.prep_resolution
    );

    let remeshed = manifoldize(&mesh, params.prep_resolution);
    if remeshed.triangles.is_empty() {
        log::warn!("Manifold remeshing produced no triangle, keeping the input mesh.");
        mesh
    } else {
        remeshed
    }
}
