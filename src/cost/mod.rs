//! The concavity cost of a part with respect to its hull.
//!
//! The cost `Rv` of a part `P` approximated by the convex mesh `H` combines
//! a surface term and a volume term:
//!
//! ```text
//! Rv = sqrt(mean(d(p)²)) + k · cbrt(3 · |V(H) − V(P)| / (4π))
//! ```
//!
//! where `d(p)` is the distance from a point `p` sampled on the surface of
//! `P` to the surface of `H`. The volume term is the radius of the sphere
//! whose volume is the residual volume between the part and its hull. Both
//! terms vanish exactly when the part is convex.

pub use self::sampling::{sample_surface, SurfaceSample};

use crate::hull::compute_approx_hull;
use crate::math::Real;
use crate::{Mesh, Parameters};
use parry::query::{PointQuery, Ray, RayCast};
use parry::shape::TriMesh;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

mod sampling;

/// Samples closer than this distance to the hull count as lying on it.
pub const DEFAULT_ETA: Real = 1.0e-4;

/// `3 / (4π)`
const FRAC_3_4PI: Real = 0.75 * std::f64::consts::FRAC_1_PI;

/// Computes the concavity cost `Rv` of `part` approximated by `hull`.
///
/// * `k` weights the residual volume term.
/// * `samples` points are drawn on the surface of `part` from a generator
///   seeded with `seed`.
/// * Samples closer than `eta` to the hull surface have a zero distance.
/// * If `use_proj` is `true` the distance of the other samples is their
///   projection distance to the hull. Otherwise it is the distance to the
///   first hull triangle hit by a ray cast from the sample along its normal,
///   in both directions. If neither ray hits, the diagonal of the bounding
///   box of `part` is used.
///
/// Returns `Real::INFINITY` if `part` cannot be sampled or if `hull` has no
/// triangle.
pub fn rv(
    part: &Mesh,
    hull: &Mesh,
    k: Real,
    samples: u32,
    seed: u64,
    eta: Real,
    use_proj: bool,
) -> Real {
    rv_filtered(part, hull, k, samples, seed, eta, use_proj, |_| true)
}

/// Computes the concavity cost `Rv` like [`rv`], ignoring the samples for
/// which `keep` returns `false`.
///
/// Returns `Real::INFINITY` if every sample is ignored.
pub fn rv_filtered(
    part: &Mesh,
    hull: &Mesh,
    k: Real,
    samples: u32,
    seed: u64,
    eta: Real,
    use_proj: bool,
    keep: impl Fn(&SurfaceSample) -> bool + Sync,
) -> Real {
    let Some(hull_shape) = hull.to_trimesh() else {
        return Real::INFINITY;
    };

    let mut rng = crate::rng::stream(seed, crate::rng::SAMPLE_STREAM);
    let samples = sample_surface(part, samples, &mut rng);

    let miss_distance = part.bbox_diagonal();
    let dist = |sample: &SurfaceSample| {
        keep(sample).then(|| {
            sample_distance(&hull_shape, sample, eta, use_proj).unwrap_or(miss_distance)
        })
    };

    #[cfg(feature = "parallel")]
    let dists: Vec<Real> = samples.par_iter().filter_map(dist).collect();
    #[cfg(not(feature = "parallel"))]
    let dists: Vec<Real> = samples.iter().filter_map(dist).collect();

    if dists.is_empty() {
        return Real::INFINITY;
    }

    let mean_sq = dists.iter().map(|d| d * d).sum::<Real>() / dists.len() as Real;
    mean_sq.sqrt() + k * residual_volume_radius(part, hull)
}

/// The radius of the sphere whose volume is the volume difference between
/// `part` and `hull`.
pub fn residual_volume_radius(part: &Mesh, hull: &Mesh) -> Real {
    (FRAC_3_4PI * (hull.volume() - part.volume()).abs()).cbrt()
}

fn sample_distance(
    hull: &TriMesh,
    sample: &SurfaceSample,
    eta: Real,
    use_proj: bool,
) -> Option<Real> {
    let proj = hull.project_local_point(&sample.point, false);
    let proj_dist = (proj.point - sample.point).norm();

    if proj_dist < eta {
        return Some(0.0);
    }

    if use_proj {
        return Some(proj_dist);
    }

    let toi = |dir| hull.cast_local_ray(&Ray::new(sample.point, dir), Real::MAX, false);
    match (toi(sample.normal), toi(-sample.normal)) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// The concavity of `part` approximated by its hull, as configured by
/// `params`.
pub fn concavity(part: &Mesh, params: &Parameters) -> Real {
    let hull = compute_approx_hull(part, params.apx_mode, true);
    part_cost(part, &hull, params, false)
}

/// The cost of `part` approximated by `hull`, with the sampling settings of
/// `params`.
pub(crate) fn part_cost(part: &Mesh, hull: &Mesh, params: &Parameters, use_proj: bool) -> Real {
    rv(
        part,
        hull,
        params.rv_k,
        params.resolution,
        params.seed,
        DEFAULT_ETA,
        use_proj,
    )
}

/// The cost of `part` approximated by the cheaper loose hull, used while
/// searching for cutting planes.
pub(crate) fn search_cost(part: &Mesh, params: &Parameters, use_proj: bool) -> Real {
    let hull = compute_approx_hull(part, params.apx_mode, false);
    part_cost(part, &hull, params, use_proj)
}
