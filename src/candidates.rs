//! Generation of the candidate cutting planes of a part.

use crate::clip::{clip_mesh, ClipResult};
use crate::math::Real;
use crate::{Axis, Mesh, Plane};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Axes along which the part extends less than this are not cut.
pub const MIN_AXIS_EXTENT: Real = 1.0e-9;

/// Number of refined planes on each side of a coarse plane.
pub const DEFAULT_REFINEMENT_STEPS: u32 = 2;

/// The axis-aligned planes splitting the bounding box of `part` in
/// `resolution + 1` slabs of equal thickness along each axis.
///
/// Planes are listed by axis (`x`, then `y`, then `z`) and by increasing
/// offset.
pub fn coarse_planes(part: &Mesh, resolution: u32) -> Vec<Plane> {
    let aabb = part.aabb();
    let mut planes = Vec::with_capacity(3 * resolution as usize);

    for axis in Axis::ALL {
        let min = aabb.mins[axis.index()];
        let extent = aabb.maxs[axis.index()] - min;

        if !(extent >= MIN_AXIS_EXTENT) {
            continue;
        }

        let interval = extent / (resolution + 1) as Real;
        planes.extend((1..=resolution).map(|i| Plane::axis_aligned(axis, min + interval * i as Real)));
    }

    planes
}

/// The `2 * steps + 1` planes parallel to `plane` offset by `j * spacing / steps`
/// for `j` in `-steps..=steps`.
pub fn refined_planes(plane: &Plane, spacing: Real, steps: u32) -> Vec<Plane> {
    let steps = steps.max(1) as i64;
    (-steps..=steps)
        .map(|j| plane.translated(spacing * j as Real / steps as Real))
        .collect()
}

/// Keeps the planes cutting `part` into two valid parts with a section of
/// area at least `min_cut_area`. The order of the planes is preserved.
pub fn filter_planes(part: &Mesh, planes: &[Plane], min_cut_area: Real) -> Vec<Plane> {
    let keep = |plane: &Plane| match clip_mesh(part, plane) {
        ClipResult::Valid(cut) => cut.cut_area >= min_cut_area,
        ClipResult::Invalid(_) => false,
    };

    #[cfg(feature = "parallel")]
    let kept: Vec<bool> = planes.par_iter().map(keep).collect();
    #[cfg(not(feature = "parallel"))]
    let kept: Vec<bool> = planes.iter().map(keep).collect();

    planes
        .iter()
        .zip(kept)
        .filter_map(|(plane, keep)| keep.then_some(*plane))
        .collect()
}
