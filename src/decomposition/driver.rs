use crate::clip::{clip_mesh, ClipResult};
use crate::cost::concavity;
use crate::math::Real;
use crate::mcts::best_cutting_plane;
use crate::{Mesh, Parameters, Plane};
use std::collections::VecDeque;

/// Parts are never cut more than this number of times.
pub const HARD_DEPTH_CAP: u32 = 32;

/// A part produced by the decomposition driver.
#[derive(Clone, Debug)]
pub struct Part {
    /// The closed mesh of the part.
    pub mesh: Mesh,
    /// The concavity of the part.
    pub concavity: Real,
    /// The planes of the cuts that produced this part, in order.
    pub cuts: Vec<Plane>,
}

struct WorkItem {
    part: Mesh,
    depth: u32,
    lineage: u32,
    cuts: Vec<Plane>,
}

/// Recursively cuts `mesh` until every part has a concavity below
/// `params.threshold`.
///
/// Parts are processed in FIFO order. When the number of parts reaches
/// `params.max_convex_hull`, the remaining parts are accepted as they are.
pub fn split_parts(mesh: Mesh, params: &Parameters) -> Vec<Part> {
    let budget = params.part_budget();
    let mut worklist = VecDeque::from([WorkItem {
        part: mesh,
        depth: 0,
        lineage: 0,
        cuts: vec![],
    }]);
    let mut accepted = vec![];
    let mut next_lineage = 1;

    while !worklist.is_empty() {
        if budget.is_some_and(|budget| accepted.len() + worklist.len() >= budget) {
            log::info!(
                "part budget reached, keeping {} parts without cutting them",
                worklist.len()
            );
            break;
        }

        let Some(item) = worklist.pop_front() else {
            break;
        };

        let cost = concavity(&item.part, params);
        log::info!(
            "part {} (depth {}): concavity {cost}",
            item.lineage,
            item.depth
        );

        if cost < params.threshold || item.depth >= HARD_DEPTH_CAP {
            accepted.push(Part {
                mesh: item.part,
                concavity: cost,
                cuts: item.cuts,
            });
            continue;
        }

        let Some((plane, score)) = best_cutting_plane(&item.part, params) else {
            log::warn!("No valid cutting plane for part {}, keeping it whole.", item.lineage);
            accepted.push(Part {
                mesh: item.part,
                concavity: cost,
                cuts: item.cuts,
            });
            continue;
        };

        match clip_mesh(&item.part, &plane) {
            ClipResult::Valid(cut) => {
                log::debug!(
                    "part {} cut by {:?} (score {score}, cut area {})",
                    item.lineage,
                    plane.coefficients(),
                    cut.cut_area
                );

                let mut cuts = item.cuts;
                cuts.push(plane);

                for side in [cut.pos, cut.neg] {
                    worklist.push_back(WorkItem {
                        part: side,
                        depth: item.depth + 1,
                        lineage: next_lineage,
                        cuts: cuts.clone(),
                    });
                    next_lineage += 1;
                }
            }
            ClipResult::Invalid(reason) => {
                log::warn!(
                    "Cutting part {} failed ({reason:?}), keeping it whole.",
                    item.lineage
                );
                accepted.push(Part {
                    mesh: item.part,
                    concavity: cost,
                    cuts: item.cuts,
                });
            }
        }
    }

    accepted.extend(flush(worklist, params));
    accepted
}

fn flush(worklist: VecDeque<WorkItem>, params: &Parameters) -> Vec<Part> {
    let items: Vec<_> = worklist.into_iter().collect();

    let eval = |item: &WorkItem| concavity(&item.part, params);

    #[cfg(feature = "parallel")]
    let costs: Vec<Real> = {
        use rayon::prelude::*;
        items.par_iter().map(eval).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let costs: Vec<Real> = items.iter().map(eval).collect();

    items
        .into_iter()
        .zip(costs)
        .map(|(item, concavity)| Part {
            mesh: item.part,
            concavity,
            cuts: item.cuts,
        })
        .collect()
}
