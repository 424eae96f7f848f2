//! C interface.
//!
//! Every entry point takes and returns plain-old-data structures. Arrays
//! returned by this module are owned by the caller and must be released
//! with the matching `acd_free_*` function. Failures (invalid parameters,
//! invalid meshes, null inputs) are logged and reported as empty results.

#![allow(clippy::missing_safety_doc)]

use crate::math::{Point, Real};
use crate::{
    AcdError, ApproximationMode, Mesh, MeshError, Normalization, Parameters, Plane,
    PreprocessMode,
};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;

/// A triangle mesh.
///
/// `vertices_ptr` holds `3 * vertices_count` coordinates and `triangles_ptr`
/// holds `3 * triangles_count` vertex indices.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AcdMesh {
    /// The flattened vertex coordinates.
    pub vertices_ptr: *mut f64,
    /// The number of vertices.
    pub vertices_count: u64,
    /// The flattened vertex indices of the triangles.
    pub triangles_ptr: *mut i32,
    /// The number of triangles.
    pub triangles_count: u64,
}

/// An array of meshes.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AcdMeshArray {
    /// The meshes.
    pub meshes_ptr: *mut AcdMesh,
    /// The number of meshes.
    pub meshes_count: u64,
}

/// The plane `a·x + b·y + c·z + d = 0` and its score.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AcdPlane {
    /// First normal coordinate.
    pub a: f64,
    /// Second normal coordinate.
    pub b: f64,
    /// Third normal coordinate.
    pub c: f64,
    /// Offset.
    pub d: f64,
    /// The score of the plane, zero when irrelevant.
    pub score: f64,
}

/// An array of planes.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AcdPlaneArray {
    /// The planes.
    pub planes_ptr: *mut AcdPlane,
    /// The number of planes.
    pub planes_count: u64,
}

/// A normalized mesh and the bounding box of the original one.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AcdNormalization {
    /// The normalized mesh.
    pub mesh: AcdMesh,
    /// Smallest `x` coordinate of the original mesh.
    pub x_min: f64,
    /// Largest `x` coordinate of the original mesh.
    pub x_max: f64,
    /// Smallest `y` coordinate of the original mesh.
    pub y_min: f64,
    /// Largest `y` coordinate of the original mesh.
    pub y_max: f64,
    /// Smallest `z` coordinate of the original mesh.
    pub z_min: f64,
    /// Largest `z` coordinate of the original mesh.
    pub z_max: f64,
}

/// A convex hull and the concavity of the mesh it was computed from.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AcdConvexHull {
    /// The hull.
    pub mesh: AcdMesh,
    /// The concavity of the mesh with respect to `mesh`.
    pub concavity: f64,
}

/// Summary statistics of a decomposition.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AcdMeshScore {
    /// The number of parts before merging.
    pub hulls_num: u64,
    /// The mean concavity of the parts.
    pub avg_concavity: f64,
}

/// The decomposition parameters.
///
/// `preprocess_mode` is `0` (auto), `1` (on) or `2` (off). `apx_mode` is
/// `0` (convex hull) or `1` (bounding box).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AcdParameters {
    /// See [`Parameters::threshold`].
    pub threshold: f64,
    /// See [`Parameters::max_convex_hull`].
    pub max_convex_hull: i32,
    /// See [`Parameters::preprocess_mode`].
    pub preprocess_mode: c_int,
    /// See [`Parameters::prep_resolution`].
    pub prep_resolution: i32,
    /// See [`Parameters::resolution`].
    pub resolution: i32,
    /// See [`Parameters::mcts_nodes`].
    pub mcts_nodes: i32,
    /// See [`Parameters::mcts_iteration`].
    pub mcts_iteration: i32,
    /// See [`Parameters::mcts_max_depth`].
    pub mcts_max_depth: i32,
    /// See [`Parameters::pca`].
    pub pca: bool,
    /// See [`Parameters::merge`].
    pub merge: bool,
    /// See [`Parameters::decimate`].
    pub decimate: bool,
    /// See [`Parameters::max_ch_vertex`].
    pub max_ch_vertex: i32,
    /// See [`Parameters::extrude`].
    pub extrude: bool,
    /// See [`Parameters::extrude_margin`].
    pub extrude_margin: f64,
    /// See [`Parameters::apx_mode`].
    pub apx_mode: c_int,
    /// See [`Parameters::seed`].
    pub seed: u64,
}

impl From<&Parameters> for AcdParameters {
    fn from(params: &Parameters) -> Self {
        Self {
            threshold: params.threshold,
            max_convex_hull: params.max_convex_hull,
            preprocess_mode: match params.preprocess_mode {
                PreprocessMode::Auto => 0,
                PreprocessMode::On => 1,
                PreprocessMode::Off => 2,
            },
            prep_resolution: params.prep_resolution as i32,
            resolution: params.resolution as i32,
            mcts_nodes: params.mcts_nodes as i32,
            mcts_iteration: params.mcts_iteration as i32,
            mcts_max_depth: params.mcts_max_depth as i32,
            pca: params.pca,
            merge: params.merge,
            decimate: params.decimate,
            max_ch_vertex: params.max_ch_vertex as i32,
            extrude: params.extrude,
            extrude_margin: params.extrude_margin,
            apx_mode: match params.apx_mode {
                ApproximationMode::ConvexHull => 0,
                ApproximationMode::BoundingBox => 1,
            },
            seed: params.seed,
        }
    }
}

impl TryFrom<&AcdParameters> for Parameters {
    type Error = AcdError;

    fn try_from(params: &AcdParameters) -> Result<Self, AcdError> {
        fn unsigned(name: &'static str, value: i32) -> Result<u32, AcdError> {
            num::cast(value).ok_or_else(|| AcdError::InvalidParameter {
                name,
                reason: format!("{value} is negative"),
            })
        }

        Ok(Parameters {
            threshold: params.threshold,
            max_convex_hull: params.max_convex_hull,
            preprocess_mode: PreprocessMode::try_from(params.preprocess_mode)?,
            prep_resolution: unsigned("prep_resolution", params.prep_resolution)?,
            resolution: unsigned("resolution", params.resolution)?,
            mcts_nodes: unsigned("mcts_nodes", params.mcts_nodes)?,
            mcts_iteration: unsigned("mcts_iteration", params.mcts_iteration)?,
            mcts_max_depth: unsigned("mcts_max_depth", params.mcts_max_depth)?,
            pca: params.pca,
            merge: params.merge,
            decimate: params.decimate,
            max_ch_vertex: unsigned("max_ch_vertex", params.max_ch_vertex)?,
            extrude: params.extrude,
            extrude_margin: params.extrude_margin,
            apx_mode: ApproximationMode::try_from(params.apx_mode)?,
            seed: params.seed,
            ..Parameters::default()
        })
    }
}

impl AcdMesh {
    fn empty() -> Self {
        Self {
            vertices_ptr: ptr::null_mut(),
            vertices_count: 0,
            triangles_ptr: ptr::null_mut(),
            triangles_count: 0,
        }
    }
}

impl AcdMeshArray {
    fn empty() -> Self {
        Self {
            meshes_ptr: ptr::null_mut(),
            meshes_count: 0,
        }
    }
}

impl From<&Plane> for AcdPlane {
    fn from(plane: &Plane) -> Self {
        let [a, b, c, d] = plane.coefficients();
        Self {
            a,
            b,
            c,
            d,
            score: 0.0,
        }
    }
}

/// Logs the error of a failed entry point.
fn report<T>(result: Result<T, AcdError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::error!("{err}");
            None
        }
    }
}

fn null_input(name: &'static str) -> AcdError {
    AcdError::InvalidParameter {
        name,
        reason: "null pointer".to_string(),
    }
}

fn count(name: &'static str, value: u64) -> Result<usize, AcdError> {
    num::cast(value).ok_or_else(|| AcdError::InvalidParameter {
        name,
        reason: format!("{value} elements do not fit in memory"),
    })
}

/// Copies `data` into a caller-owned buffer.
fn into_raw<T>(data: Vec<T>) -> *mut T {
    if data.is_empty() {
        ptr::null_mut()
    } else {
        Box::into_raw(data.into_boxed_slice()) as *mut T
    }
}

/// Releases a buffer created by [`into_raw`].
unsafe fn drop_raw<T>(data: *mut T, len: usize) {
    if !data.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(data, len)));
    }
}

/// Slices a caller-provided buffer, accepting null for empty buffers.
unsafe fn raw_slice<'a, T>(data: *const T, len: usize) -> &'a [T] {
    if data.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data, len)
    }
}

unsafe fn read_mesh(mesh: *const AcdMesh) -> Result<Mesh, AcdError> {
    let mesh = mesh.as_ref().ok_or_else(|| null_input("mesh"))?;
    let num_vertices = count("vertices_count", mesh.vertices_count)?;
    let num_triangles = count("triangles_count", mesh.triangles_count)?;

    let coords = raw_slice(mesh.vertices_ptr, num_vertices * 3);
    let indices = raw_slice(mesh.triangles_ptr, num_triangles * 3);
    if coords.len() != num_vertices * 3 || indices.len() != num_triangles * 3 {
        return Err(null_input("mesh buffers"));
    }

    let points = coords
        .chunks_exact(3)
        .map(|c| Point::new(c[0], c[1], c[2]))
        .collect();
    let triangles = indices
        .chunks_exact(3)
        .enumerate()
        .map(|(triangle, idx)| {
            match (num::cast(idx[0]), num::cast(idx[1]), num::cast(idx[2])) {
                (Some(a), Some(b), Some(c)) => Ok([a, b, c]),
                _ => Err(AcdError::InvalidMesh(MeshError::NegativeIndex { triangle })),
            }
        })
        .collect::<Result<Vec<[u32; 3]>, _>>()?;

    Mesh::load(points, triangles)
}

unsafe fn read_mesh_array(meshes: *const AcdMeshArray) -> Result<Vec<Mesh>, AcdError> {
    let meshes = meshes.as_ref().ok_or_else(|| null_input("mesh array"))?;
    let len = count("meshes_count", meshes.meshes_count)?;
    let items = raw_slice(meshes.meshes_ptr, len);
    if items.len() != len {
        return Err(null_input("mesh array buffer"));
    }

    items.iter().map(|mesh| read_mesh(mesh)).collect()
}

unsafe fn read_parameters(params: *const AcdParameters) -> Result<Parameters, AcdError> {
    let params = params.as_ref().ok_or_else(|| null_input("params"))?;
    Parameters::try_from(params)
}

fn write_mesh(mesh: &Mesh) -> AcdMesh {
    let vertices: Vec<f64> = mesh.points.iter().flat_map(|pt| [pt.x, pt.y, pt.z]).collect();
    let triangles: Vec<i32> = mesh
        .triangles
        .iter()
        .flat_map(|tri| tri.map(|i| i as i32))
        .collect();

    AcdMesh {
        vertices_ptr: into_raw(vertices),
        vertices_count: mesh.points.len() as u64,
        triangles_ptr: into_raw(triangles),
        triangles_count: mesh.triangles.len() as u64,
    }
}

fn write_mesh_array(meshes: &[Mesh]) -> AcdMeshArray {
    AcdMeshArray {
        meshes_ptr: into_raw(meshes.iter().map(write_mesh).collect()),
        meshes_count: meshes.len() as u64,
    }
}

/// The default decomposition parameters.
#[no_mangle]
pub extern "C" fn acd_default_parameters() -> AcdParameters {
    AcdParameters::from(&Parameters::default())
}

/// Decomposes `mesh` into convex hulls. See [`crate::decompose`].
#[no_mangle]
pub unsafe extern "C" fn acd_run(
    mesh: *const AcdMesh,
    params: *const AcdParameters,
) -> AcdMeshArray {
    let hulls = (|| crate::decompose(&read_mesh(mesh)?, &read_parameters(params)?))();
    report(hulls).map_or_else(AcdMeshArray::empty, |hulls| write_mesh_array(&hulls))
}

/// The `k` best first cuts of `mesh`. See [`crate::best_cutting_planes`].
#[no_mangle]
pub unsafe extern "C" fn acd_best_cutting_planes(
    mesh: *const AcdMesh,
    params: *const AcdParameters,
    k: u32,
) -> AcdPlaneArray {
    let planes = (|| {
        crate::best_cutting_planes(&read_mesh(mesh)?, &read_parameters(params)?, k as usize)
    })();

    match report(planes) {
        Some(planes) => {
            let planes: Vec<AcdPlane> = planes
                .iter()
                .map(|(plane, score)| AcdPlane {
                    score: *score,
                    ..AcdPlane::from(plane)
                })
                .collect();
            AcdPlaneArray {
                planes_count: planes.len() as u64,
                planes_ptr: into_raw(planes),
            }
        }
        None => AcdPlaneArray {
            planes_ptr: ptr::null_mut(),
            planes_count: 0,
        },
    }
}

/// The number of hulls and mean concavity of the decomposition of `mesh`.
/// See [`crate::mesh_score`].
#[no_mangle]
pub unsafe extern "C" fn acd_mesh_score(
    mesh: *const AcdMesh,
    params: *const AcdParameters,
) -> AcdMeshScore {
    let score = (|| crate::mesh_score(&read_mesh(mesh)?, &read_parameters(params)?))();
    report(score).map_or(
        AcdMeshScore {
            hulls_num: 0,
            avg_concavity: 0.0,
        },
        |score| AcdMeshScore {
            hulls_num: score.hulls_num as u64,
            avg_concavity: score.avg_concavity,
        },
    )
}

/// Maps `mesh` into the `[-1, 1]³` reference cube. See [`crate::normalize`].
#[no_mangle]
pub unsafe extern "C" fn acd_normalize(mesh: *const AcdMesh) -> AcdNormalization {
    let normalized = report(read_mesh(mesh)).map(|mesh| crate::normalize(&mesh, false));
    let (mesh, bounds) = match normalized {
        Some((mesh, normalization)) => (write_mesh(&mesh), normalization.bounds()),
        None => (AcdMesh::empty(), [0.0; 6]),
    };

    AcdNormalization {
        mesh,
        x_min: bounds[0],
        x_max: bounds[1],
        y_min: bounds[2],
        y_max: bounds[3],
        z_min: bounds[4],
        z_max: bounds[5],
    }
}

/// Maps a mesh produced by [`acd_normalize`] back to the coordinates
/// described by `normalization`. See [`crate::recover`].
#[no_mangle]
pub unsafe extern "C" fn acd_recover(
    mesh: *const AcdMesh,
    normalization: *const AcdNormalization,
) -> AcdMesh {
    let recovered = (|| {
        let n = normalization
            .as_ref()
            .ok_or_else(|| null_input("normalization"))?;
        let normalization = Normalization::from_bounds(
            Point::new(n.x_min, n.y_min, n.z_min),
            Point::new(n.x_max, n.y_max, n.z_max),
        );
        Ok(crate::recover(&read_mesh(mesh)?, &normalization))
    })();

    report(recovered).map_or_else(AcdMesh::empty, |mesh| write_mesh(&mesh))
}

/// Cuts `mesh` by `plane`, returning the positive and negative parts or an
/// empty array if the cut is invalid. See [`crate::clip`].
#[no_mangle]
pub unsafe extern "C" fn acd_clip(mesh: *const AcdMesh, plane: *const AcdPlane) -> AcdMeshArray {
    let parts = (|| {
        let p = plane.as_ref().ok_or_else(|| null_input("plane"))?;
        let plane = Plane::new(p.a, p.b, p.c, p.d).ok_or_else(|| AcdError::InvalidParameter {
            name: "plane",
            reason: "the normal must be finite and non-zero".to_string(),
        })?;
        Ok(crate::clip(&read_mesh(mesh)?, &plane))
    })();

    report(parts).map_or_else(AcdMeshArray::empty, |parts| write_mesh_array(&parts))
}

/// The convex hull of `mesh` and the concavity of `mesh` with respect to it.
/// See [`crate::compute_convex_hull`].
#[no_mangle]
pub unsafe extern "C" fn acd_compute_convex_hull(mesh: *const AcdMesh) -> AcdConvexHull {
    match report(read_mesh(mesh)) {
        Some(mesh) => {
            let (hull, concavity) = crate::compute_convex_hull(&mesh);
            AcdConvexHull {
                mesh: write_mesh(&hull),
                concavity,
            }
        }
        None => AcdConvexHull {
            mesh: AcdMesh::empty(),
            concavity: Real::INFINITY,
        },
    }
}

/// Merges the adjacent parts of a decomposition of `original`. See
/// [`crate::merge`].
#[no_mangle]
pub unsafe extern "C" fn acd_merge(
    original: *const AcdMesh,
    parts: *const AcdMeshArray,
    hulls: *const AcdMeshArray,
) -> AcdMeshArray {
    let merged = (|| {
        Ok(crate::merge(
            &read_mesh(original)?,
            &read_mesh_array(parts)?,
            &read_mesh_array(hulls)?,
        ))
    })();

    report(merged).map_or_else(AcdMeshArray::empty, |hulls| write_mesh_array(&hulls))
}

/// Sets the log level from a nul-terminated string. Returns `0` on success
/// and `-1` if the level is unknown. See [`crate::set_log_level`].
#[no_mangle]
pub unsafe extern "C" fn acd_set_log_level(level: *const c_char) -> c_int {
    if level.is_null() {
        return -1;
    }

    let level = CStr::from_ptr(level).to_string_lossy();
    match report(crate::set_log_level(&level)) {
        Some(()) => 0,
        None => -1,
    }
}

/// Releases a mesh returned by this module.
#[no_mangle]
pub unsafe extern "C" fn acd_free_mesh(mesh: AcdMesh) {
    drop_raw(mesh.vertices_ptr, mesh.vertices_count as usize * 3);
    drop_raw(mesh.triangles_ptr, mesh.triangles_count as usize * 3);
}

/// Releases a mesh array returned by this module, including its meshes.
#[no_mangle]
pub unsafe extern "C" fn acd_free_mesh_array(meshes: AcdMeshArray) {
    let len = meshes.meshes_count as usize;
    for mesh in raw_slice(meshes.meshes_ptr, len) {
        acd_free_mesh(*mesh);
    }
    drop_raw(meshes.meshes_ptr, len);
}

/// Releases a plane array returned by this module.
#[no_mangle]
pub unsafe extern "C" fn acd_free_plane_array(planes: AcdPlaneArray) {
    drop_raw(planes.planes_ptr, planes.planes_count as usize);
}

#[cfg(test)]
mod test {
    use super::*;

    fn unit_cube() -> (Vec<f64>, Vec<i32>) {
        let mut vertices = vec![];
        for i in 0..8 {
            vertices.extend_from_slice(&[
                (i & 1) as f64,
                ((i >> 1) & 1) as f64,
                ((i >> 2) & 1) as f64,
            ]);
        }
        let triangles = vec![
            0, 2, 1, 1, 2, 3, 4, 5, 6, 5, 7, 6, 0, 1, 4, 1, 5, 4, 2, 6, 3, 3, 6, 7, 0, 4, 2, 2, 4,
            6, 1, 3, 5, 3, 7, 5,
        ];
        (vertices, triangles)
    }

    fn as_ffi(data: &mut (Vec<f64>, Vec<i32>)) -> AcdMesh {
        AcdMesh {
            vertices_ptr: data.0.as_mut_ptr(),
            vertices_count: data.0.len() as u64 / 3,
            triangles_ptr: data.1.as_mut_ptr(),
            triangles_count: data.1.len() as u64 / 3,
        }
    }

    #[test]
    fn parameters_round_trip() {
        let ffi = acd_default_parameters();
        assert_eq!(Parameters::try_from(&ffi), Ok(Parameters::default()));
    }

    #[test]
    fn invalid_tags_are_rejected() {
        let mut ffi = acd_default_parameters();
        ffi.apx_mode = 2;
        assert!(Parameters::try_from(&ffi).is_err());

        let mut ffi = acd_default_parameters();
        ffi.resolution = -1;
        assert!(Parameters::try_from(&ffi).is_err());
    }

    #[test]
    fn clip_and_free() {
        let mut cube = unit_cube();
        let mesh = as_ffi(&mut cube);
        let plane = AcdPlane {
            a: 0.0,
            b: 1.0,
            c: 0.0,
            d: -0.5,
            score: 0.0,
        };

        unsafe {
            let parts = acd_clip(&mesh, &plane);
            assert_eq!(parts.meshes_count, 2);
            let pos = *parts.meshes_ptr;
            assert!(pos.triangles_count >= 4);
            acd_free_mesh_array(parts);
        }
    }

    #[test]
    fn negative_indices_are_rejected() {
        let mut cube = unit_cube();
        cube.1[0] = -1;
        let mesh = as_ffi(&mut cube);

        unsafe {
            let hull = acd_compute_convex_hull(&mesh);
            assert!(hull.mesh.vertices_ptr.is_null());
            assert_eq!(hull.mesh.triangles_count, 0);
        }
    }

    #[test]
    fn null_inputs_give_empty_results() {
        unsafe {
            let hulls = acd_run(ptr::null(), ptr::null());
            assert!(hulls.meshes_ptr.is_null());
            assert_eq!(hulls.meshes_count, 0);
            assert_eq!(acd_set_log_level(ptr::null()), -1);
        }
    }
}
