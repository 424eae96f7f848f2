//! The approximate convex decomposition pipeline and its entry points.

pub use self::driver::{split_parts, Part, HARD_DEPTH_CAP};

use crate::clip::{clip_mesh, ClipResult};
use crate::cost::{rv, DEFAULT_ETA};
use crate::hull::{compute_approx_hull, decimate_hull, extrude_hull, is_degenerate_hull};
use crate::math::Real;
use crate::mcts::k_best_cutting_planes;
use crate::merge::merge_parts;
use crate::preprocess::preprocess;
use crate::{AcdError, ApproximationMode, Mesh, Normalization, Parameters, Plane};

mod driver;

/// Hull vertices closer than this normalized distance to a cutting plane
/// are moved by the extrusion.
const EXTRUDE_TOLERANCE: Real = 1.0e-4;

/// Summary statistics of a decomposition.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MeshScore {
    /// The number of parts found by the cutting search, before merging.
    pub hulls_num: usize,
    /// The mean concavity of these parts, or zero if there are no parts.
    pub avg_concavity: Real,
}

struct Decomposition {
    hulls: Vec<Mesh>,
    parts: Vec<Part>,
}

/// Decomposes `mesh` into convex hulls whose concavity is below
/// `params.threshold`.
///
/// The hulls are expressed in the coordinates of `mesh`. A mesh with no
/// surface area yields an empty decomposition. The output is a
/// deterministic function of `mesh` and `params`.
///
/// # Errors
///
/// Fails with [`AcdError::InvalidParameter`] if `params` is out of range.
pub fn decompose(mesh: &Mesh, params: &Parameters) -> Result<Vec<Mesh>, AcdError> {
    Ok(run(mesh, params)?.hulls)
}

/// The number of parts of the decomposition of `mesh` and their mean
/// concavity.
///
/// Both are measured on the parts found by the cutting search. Merging and
/// hull post-processing do not change the score.
///
/// # Errors
///
/// Fails with [`AcdError::InvalidParameter`] if `params` is out of range.
pub fn mesh_score(mesh: &Mesh, params: &Parameters) -> Result<MeshScore, AcdError> {
    let decomposition = run(mesh, params)?;
    let avg_concavity = if decomposition.parts.is_empty() {
        0.0
    } else {
        decomposition
            .parts
            .iter()
            .map(|part| part.concavity)
            .sum::<Real>()
            / decomposition.parts.len() as Real
    };

    Ok(MeshScore {
        hulls_num: decomposition.parts.len(),
        avg_concavity,
    })
}

/// The `k` best planes for a first cut of `mesh`, with their scores, best
/// first.
///
/// The planes are expressed in the coordinates of `mesh`. Scores are
/// concavities measured in the normalized frame of the mesh.
///
/// # Errors
///
/// Fails with [`AcdError::InvalidParameter`] if `params` is out of range.
pub fn best_cutting_planes(
    mesh: &Mesh,
    params: &Parameters,
    k: usize,
) -> Result<Vec<(Plane, Real)>, AcdError> {
    params.validate()?;

    if !(mesh.area() > 0.0) {
        log::warn!("The input mesh has no surface area.");
        return Ok(vec![]);
    }

    let (normalized, normalization) = prepare(mesh, params);
    Ok(k_best_cutting_planes(&normalized, params, k)
        .into_iter()
        .map(|(plane, score)| (normalization.recover_plane(&plane), score))
        .collect())
}

/// Maps `mesh` into the `[-1, 1]³` reference cube, optionally aligning it
/// with its principal axes.
pub fn normalize(mesh: &Mesh, pca: bool) -> (Mesh, Normalization) {
    let mut mesh = mesh.clone();
    let mut normalization = mesh.normalize();
    if pca {
        normalization.rotation = mesh.pca();
    }
    (mesh, normalization)
}

/// Maps a mesh produced by [`normalize`] back to the original coordinates.
pub fn recover(mesh: &Mesh, normalization: &Normalization) -> Mesh {
    let mut mesh = mesh.clone();
    mesh.recover(normalization);
    mesh
}

/// Cuts `mesh` by `plane`.
///
/// Returns the positive and negative parts, or nothing if the cut is
/// invalid.
pub fn clip(mesh: &Mesh, plane: &Plane) -> Vec<Mesh> {
    match clip_mesh(mesh, plane) {
        ClipResult::Valid(cut) => vec![cut.pos, cut.neg],
        ClipResult::Invalid(reason) => {
            log::debug!("invalid cut: {reason:?}");
            vec![]
        }
    }
}

/// The convex hull of `mesh` and the concavity of `mesh` with respect to it.
pub fn compute_convex_hull(mesh: &Mesh) -> (Mesh, Real) {
    let defaults = Parameters::default();
    let hull = compute_approx_hull(mesh, ApproximationMode::ConvexHull, true);
    let concavity = rv(
        mesh,
        &hull,
        defaults.rv_k,
        defaults.resolution,
        defaults.seed,
        DEFAULT_ETA,
        false,
    );
    (hull, concavity)
}

/// Greedily merges the adjacent parts of a decomposition of `original`
/// while their union stays below the default concavity threshold.
///
/// `parts[i]` is approximated by `hulls[i]`. Returns the hulls of the
/// merged parts.
pub fn merge(original: &Mesh, parts: &[Mesh], hulls: &[Mesh]) -> Vec<Mesh> {
    if parts.len() != hulls.len() {
        log::warn!(
            "Merging {} parts with {} hulls, the extra ones are ignored.",
            parts.len(),
            hulls.len()
        );
    }

    let (_, normalization) = normalize(original, false);
    let normalized = |mesh: &Mesh| {
        let mut mesh = mesh.clone();
        mesh.transform_points(|pt| normalization.normalize_point(pt));
        mesh
    };

    let count = parts.len().min(hulls.len());
    let merged = merge_parts(
        parts[..count].iter().map(normalized).collect(),
        hulls[..count].iter().map(normalized).collect(),
        &Parameters::default(),
    );

    merged
        .into_iter()
        .map(|merged| recover(&merged.hull, &normalization))
        .collect()
}

/// Normalizes and preprocesses `mesh` as configured by `params`.
fn prepare(mesh: &Mesh, params: &Parameters) -> (Mesh, Normalization) {
    let mut mesh = mesh.clone();
    let mut normalization = mesh.normalize();
    mesh = preprocess(mesh, params);

    if params.pca {
        normalization.rotation = mesh.pca();
    }

    (mesh, normalization)
}

fn run(mesh: &Mesh, params: &Parameters) -> Result<Decomposition, AcdError> {
    params.validate()?;
    params.log_summary();

    if !(mesh.area() > 0.0) {
        log::warn!("The input mesh has no surface area, nothing to decompose.");
        return Ok(Decomposition {
            hulls: vec![],
            parts: vec![],
        });
    }

    let (normalized, normalization) = prepare(mesh, params);
    let parts = split_parts(normalized, params);
    log::info!("{} parts before post-processing", parts.len());

    let hulls = postprocess(&parts, &normalization, params);
    log::info!("{} convex hulls", hulls.len());

    Ok(Decomposition { hulls, parts })
}

/// Computes, merges, simplifies, and recovers the hulls of `parts`.
fn postprocess(parts: &[Part], normalization: &Normalization, params: &Parameters) -> Vec<Mesh> {
    let mut kept = vec![];
    for (i, part) in parts.iter().enumerate() {
        let hull = compute_approx_hull(&part.mesh, params.apx_mode, true);
        if is_degenerate_hull(&hull) {
            log::warn!("Dropping part {i}: its hull encloses no volume.");
        } else {
            kept.push((part, hull));
        }
    }

    let hulls: Vec<(Mesh, Vec<Plane>)> = if params.merge {
        let (meshes, hulls) = kept.iter().map(|(p, h)| (p.mesh.clone(), h.clone())).unzip();
        merge_parts(meshes, hulls, params)
            .into_iter()
            .map(|merged| {
                let cuts = merged.members.iter().flat_map(|i| &kept[*i].0.cuts);
                let cuts = bounding_cuts(&merged.part, cuts);
                (merged.hull, cuts)
            })
            .collect()
    } else {
        kept.into_iter()
            .map(|(part, hull)| (hull, part.cuts.clone()))
            .collect()
    };

    hulls
        .into_iter()
        .map(|(mut hull, cuts)| {
            if params.decimate {
                hull = decimate_hull(&hull, params.max_ch_vertex as usize);
            }

            if params.extrude {
                let margin = normalization.normalize_length(params.extrude_margin);
                hull = extrude_hull(&hull, &cuts, margin, EXTRUDE_TOLERANCE);
            }

            hull.recover(normalization);
            hull
        })
        .collect()
}

/// The distinct planes of `cuts` leaving `part` entirely on one side.
///
/// The cuts separating the members of a merged part go through it and are
/// not part of its boundary.
fn bounding_cuts<'a>(part: &Mesh, cuts: impl Iterator<Item = &'a Plane>) -> Vec<Plane> {
    let mut result: Vec<Plane> = vec![];

    for plane in cuts {
        if result.contains(plane) {
            continue;
        }

        let (mut below, mut above) = (false, false);
        for pt in &part.points {
            let dist = plane.signed_distance(pt);
            below |= dist < -EXTRUDE_TOLERANCE;
            above |= dist > EXTRUDE_TOLERANCE;
        }

        if !(below && above) {
            result.push(*plane);
        }
    }

    result
}
