use super::cut_outcomes;
use crate::candidates::{refined_planes, DEFAULT_REFINEMENT_STEPS};
use crate::math::Real;
use crate::{Mesh, Parameters, Plane};

/// Number of ternary search rounds run by [`refine_plane`].
const TERNARY_ROUNDS: usize = 3;

/// The result of [`refine_plane`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RefinedPlane {
    /// The best plane found.
    pub plane: Plane,
    /// The cost of cutting the part by `plane`.
    pub cost: Real,
    /// Is `plane` strictly better than the plane given to [`refine_plane`]?
    pub improved: bool,
}

/// Moves `plane` along its normal to locally minimize the cost of cutting
/// `part`, the largest concavity of the two sides.
///
/// The offsets within one coarse plane spacing of `plane` are first scanned
/// at a few evenly spaced positions, then the best position is narrowed with
/// a ternary search. The original plane is kept unless a strictly cheaper
/// one is found.
pub fn refine_plane(part: &Mesh, plane: &Plane, params: &Parameters) -> RefinedPlane {
    let aabb = part.aabb();
    let extent = match plane.axis {
        Some(axis) => aabb.maxs[axis.index()] - aabb.mins[axis.index()],
        None => part.bbox_diagonal(),
    };
    let spacing = extent / (params.prep_resolution + 1) as Real;

    let cost_at = |offsets: &[Real]| -> Vec<Real> {
        let planes: Vec<_> = offsets.iter().map(|t| plane.translated(*t)).collect();
        cut_outcomes(part, &planes, params, true)
            .into_iter()
            .map(|outcome| outcome.map(|o| o.kept_cost).unwrap_or(Real::INFINITY))
            .collect()
    };

    let steps = DEFAULT_REFINEMENT_STEPS;
    let scan: Vec<Real> = refined_planes(plane, spacing, steps)
        .iter()
        .map(|shifted| plane.d - shifted.d)
        .collect();
    let scan_costs = cost_at(&scan);

    // The unshifted plane is the middle of the scan.
    let original_cost = scan_costs[steps as usize];
    let (mut best_offset, mut best_cost) = (0.0, original_cost);
    for (t, cost) in scan.iter().zip(scan_costs.iter()) {
        if *cost < best_cost {
            best_offset = *t;
            best_cost = *cost;
        }
    }

    let step = spacing / steps.max(1) as Real;
    let (mut left, mut right) = (best_offset - step, best_offset + step);

    for _ in 0..TERNARY_ROUNDS {
        let third = (right - left) / 3.0;
        let (mid1, mid2) = (left + third, right - third);
        let costs = cost_at(&[mid1, mid2]);

        for (t, cost) in [mid1, mid2].iter().zip(costs.iter()) {
            if *cost < best_cost {
                best_offset = *t;
                best_cost = *cost;
            }
        }

        if costs[0] < costs[1] {
            right = mid2;
        } else {
            left = mid1;
        }
    }

    if best_cost < original_cost {
        RefinedPlane {
            plane: plane.translated(best_offset),
            cost: best_cost,
            improved: true,
        }
    } else {
        RefinedPlane {
            plane: *plane,
            cost: original_cost,
            improved: false,
        }
    }
}
