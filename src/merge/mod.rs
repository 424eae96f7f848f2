//! Greedy merging of adjacent parts whose union is nearly convex.

pub use self::obb::Obb;

use crate::cost::{rv_filtered, SurfaceSample, DEFAULT_ETA};
use crate::hull::compute_approx_hull;
use crate::math::Real;
use crate::{Mesh, Parameters};
use ordered_float::OrderedFloat;
use parry::bounding_volume::{Aabb, BoundingVolume};
use parry::query::PointQuery;
use std::collections::BTreeMap;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

mod obb;

/// Hulls closer than this distance are considered in contact.
pub const CONTACT_TOLERANCE: Real = 1.0e-6;

/// A part of the decomposition together with its hull.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedPart {
    /// The triangles of every part merged into this one.
    pub part: Mesh,
    /// The hull approximating `part`.
    pub hull: Mesh,
    /// The indices of the input parts merged into this one, in increasing
    /// order.
    pub members: Vec<usize>,
}

struct Slot {
    merged: MergedPart,
    aabb: Aabb,
    obb: Option<Obb>,
}

impl Slot {
    fn new(merged: MergedPart) -> Self {
        let aabb = merged.hull.aabb();
        let obb = Obb::from_points(&merged.hull.points);
        Self { merged, aabb, obb }
    }

    fn is_adjacent(&self, other: &Slot) -> bool {
        if !self
            .aabb
            .loosened(CONTACT_TOLERANCE)
            .intersects(&other.aabb.loosened(CONTACT_TOLERANCE))
        {
            return false;
        }

        match (&self.obb, &other.obb) {
            (Some(a), Some(b)) => a.distance(b) <= CONTACT_TOLERANCE,
            _ => false,
        }
    }
}

/// The union of two parts and its hull.
fn union(a: &MergedPart, b: &MergedPart, params: &Parameters) -> MergedPart {
    let part = a.part.merged_with(&b.part);
    let hull = compute_approx_hull(&part, params.apx_mode, true);
    let mut members = a.members.clone();
    members.extend_from_slice(&b.members);
    members.sort_unstable();
    MergedPart {
        part,
        hull,
        members,
    }
}

/// The concavity of the union of two parts.
///
/// The faces along which the parts touch are inside the union, so surface
/// samples lying on the other part are ignored.
fn merge_cost(a: &Slot, b: &Slot, params: &Parameters) -> Real {
    let merged = union(&a.merged, &b.merged, params);
    let shapes = [a.merged.part.to_trimesh(), b.merged.part.to_trimesh()];
    let num_a = a.merged.part.triangles.len() as u32;

    let keep = |sample: &SurfaceSample| {
        let other = if sample.triangle < num_a { &shapes[1] } else { &shapes[0] };
        other.as_ref().map_or(true, |shape| {
            let proj = shape.project_local_point(&sample.point, false);
            (proj.point - sample.point).norm() > CONTACT_TOLERANCE
        })
    };

    rv_filtered(
        &merged.part,
        &merged.hull,
        params.rv_k,
        params.resolution,
        params.seed,
        DEFAULT_ETA,
        false,
        keep,
    )
}

/// Greedily merges adjacent parts while the concavity of their union stays
/// below `params.threshold`.
///
/// Two parts are adjacent if their hulls touch or overlap. At each step the
/// adjacent pair with the cheapest union is merged, ties being broken by the
/// lowest pair of indices. The merged part replaces the first part of the
/// pair and the second one is removed. The surviving parts are returned in
/// the order of their slots.
pub fn merge_parts(parts: Vec<Mesh>, hulls: Vec<Mesh>, params: &Parameters) -> Vec<MergedPart> {
    let mut slots: Vec<Option<Slot>> = parts
        .into_iter()
        .zip(hulls)
        .enumerate()
        .map(|(i, (part, hull))| {
            Some(Slot::new(MergedPart {
                part,
                hull,
                members: vec![i],
            }))
        })
        .collect();

    let mut pairs = vec![];
    for i in 0..slots.len() {
        for j in i + 1..slots.len() {
            if let (Some(a), Some(b)) = (&slots[i], &slots[j]) {
                if a.is_adjacent(b) {
                    pairs.push((i, j));
                }
            }
        }
    }

    let eval = |(i, j): &(usize, usize)| match (&slots[*i], &slots[*j]) {
        (Some(a), Some(b)) => merge_cost(a, b, params),
        _ => Real::INFINITY,
    };

    #[cfg(feature = "parallel")]
    let pair_costs: Vec<Real> = pairs.par_iter().map(eval).collect();
    #[cfg(not(feature = "parallel"))]
    let pair_costs: Vec<Real> = pairs.iter().map(eval).collect();

    let mut costs: BTreeMap<(usize, usize), Real> = pairs.into_iter().zip(pair_costs).collect();

    loop {
        // The map is sorted by pair, so the first minimum has the lowest indices.
        let Some((&(i, j), &cost)) = costs.iter().min_by_key(|(_, cost)| OrderedFloat(**cost))
        else {
            break;
        };

        if !(cost < params.threshold) {
            break;
        }

        let (Some(a), Some(b)) = (slots[i].take(), slots[j].take()) else {
            break;
        };

        log::info!(
            "merging parts {:?} and {:?} (cost {cost})",
            a.merged.members,
            b.merged.members
        );

        slots[i] = Some(Slot::new(union(&a.merged, &b.merged, params)));
        costs.retain(|(k, l), _| ![i, j].contains(k) && ![i, j].contains(l));

        if let Some(merged) = &slots[i] {
            for (k, other) in slots.iter().enumerate() {
                let Some(other) = other else {
                    continue;
                };

                if k != i && merged.is_adjacent(other) {
                    let key = (i.min(k), i.max(k));
                    let _ = costs.insert(key, merge_cost(merged, other, params));
                }
            }
        }
    }

    slots.into_iter().flatten().map(|slot| slot.merged).collect()
}
