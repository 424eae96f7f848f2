//! [Monte-Carlo tree search][MCTS] for the plane cutting a part best.
//!
//! The search explores sequences of up to `mcts_max_depth` cuts. Each cut
//! keeps the side of the plane with the largest concavity, so deeper levels
//! of the tree keep working on the hardest remaining piece. The cost of a
//! sequence is the largest concavity left behind by any of its cuts, and the
//! quality of a node is the lowest cost ever simulated through it.
//!
//! [MCTS]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

pub use self::refine::{refine_plane, RefinedPlane};
pub use self::tree::{MonteCarloTree, NodeIndex, SearchOutcome};

use crate::clip::{clip_mesh, ClipResult};
use crate::cost::search_cost;
use crate::math::Real;
use crate::{Mesh, Parameters, Plane};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

mod refine;
mod tree;

/// The result of cutting a part during the search.
#[derive(Clone, Debug)]
pub struct CutOutcome {
    /// The side with the largest cost, which the search keeps cutting.
    pub kept: Mesh,
    /// The cost of the kept side.
    pub kept_cost: Real,
    /// The cost of the other side.
    pub discarded_cost: Real,
}

/// Cuts `part` by `plane` and evaluates both sides.
///
/// Returns `None` if the cut is invalid.
pub fn cut_outcome(
    part: &Mesh,
    plane: &Plane,
    params: &Parameters,
    use_proj: bool,
) -> Option<CutOutcome> {
    let ClipResult::Valid(cut) = clip_mesh(part, plane) else {
        return None;
    };

    let pos_cost = search_cost(&cut.pos, params, use_proj);
    let neg_cost = search_cost(&cut.neg, params, use_proj);

    Some(if pos_cost >= neg_cost {
        CutOutcome {
            kept: cut.pos,
            kept_cost: pos_cost,
            discarded_cost: neg_cost,
        }
    } else {
        CutOutcome {
            kept: cut.neg,
            kept_cost: neg_cost,
            discarded_cost: pos_cost,
        }
    })
}

/// Evaluates the cut of `part` by each plane of `planes`.
///
/// The outcomes are listed in the order of `planes`.
pub fn cut_outcomes(
    part: &Mesh,
    planes: &[Plane],
    params: &Parameters,
    use_proj: bool,
) -> Vec<Option<CutOutcome>> {
    let eval = |plane: &Plane| cut_outcome(part, plane, params, use_proj);

    #[cfg(feature = "parallel")]
    let outcomes = planes.par_iter().map(eval).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes = planes.iter().map(eval).collect();

    outcomes
}

/// Searches the best plane cutting `part`, then refines its offset.
///
/// Returns the plane and its score, or `None` if no plane cuts `part` into
/// two valid parts.
pub fn best_cutting_plane(part: &Mesh, params: &Parameters) -> Option<(Plane, Real)> {
    let outcome = MonteCarloTree::new(part, params)?.search(params)?;
    let refined = refine_plane(part, &outcome.plane, params);

    log::debug!(
        "mcts picked {:?} (quality {}, refined cost {})",
        refined.plane.coefficients(),
        outcome.quality,
        refined.cost
    );

    Some(if refined.improved {
        (refined.plane, outcome.quality.min(refined.cost))
    } else {
        (outcome.plane, outcome.quality)
    })
}

/// The `k` best planes cutting `part`, each refined independently, sorted by
/// increasing score.
pub fn k_best_cutting_planes(part: &Mesh, params: &Parameters, k: usize) -> Vec<(Plane, Real)> {
    let Some(mut tree) = MonteCarloTree::new(part, params) else {
        return vec![];
    };

    let _ = tree.search(params);

    let mut planes: Vec<_> = tree
        .ranked_root_children()
        .into_iter()
        .take(k)
        .map(|(plane, quality)| {
            let refined = refine_plane(part, &plane, params);
            if refined.improved {
                (refined.plane, quality.min(refined.cost))
            } else {
                (plane, quality)
            }
        })
        .collect();

    planes.sort_by(|a, b| a.1.total_cmp(&b.1));
    planes
}
