use super::shapes::{cube_at, two_cubes, unit_cube};
use acd3d::ffi::*;
use acd3d::math::Point;
use acd3d::Mesh;
use std::ffi::CString;

/// Owns the buffers behind an `AcdMesh` built from a `Mesh`.
struct Buffers {
    vertices: Vec<f64>,
    triangles: Vec<i32>,
}

impl Buffers {
    fn new(mesh: &Mesh) -> Self {
        Self {
            vertices: mesh.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect(),
            triangles: mesh.triangles.iter().flatten().map(|i| *i as i32).collect(),
        }
    }

    fn as_ffi(&mut self) -> AcdMesh {
        AcdMesh {
            vertices_ptr: self.vertices.as_mut_ptr(),
            vertices_count: self.vertices.len() as u64 / 3,
            triangles_ptr: self.triangles.as_mut_ptr(),
            triangles_count: self.triangles.len() as u64 / 3,
        }
    }
}

unsafe fn to_mesh(mesh: &AcdMesh) -> Mesh {
    let coords = std::slice::from_raw_parts(mesh.vertices_ptr, mesh.vertices_count as usize * 3);
    let indices =
        std::slice::from_raw_parts(mesh.triangles_ptr, mesh.triangles_count as usize * 3);
    Mesh::new(
        coords
            .chunks_exact(3)
            .map(|c| Point::new(c[0], c[1], c[2]))
            .collect(),
        indices
            .chunks_exact(3)
            .map(|t| [t[0] as u32, t[1] as u32, t[2] as u32])
            .collect(),
    )
}

unsafe fn to_meshes(meshes: &AcdMeshArray) -> Vec<Mesh> {
    if meshes.meshes_count == 0 {
        return vec![];
    }
    std::slice::from_raw_parts(meshes.meshes_ptr, meshes.meshes_count as usize)
        .iter()
        .map(|m| to_mesh(m))
        .collect()
}

fn small_params() -> AcdParameters {
    AcdParameters {
        prep_resolution: 9,
        resolution: 400,
        mcts_nodes: 30,
        mcts_iteration: 40,
        mcts_max_depth: 2,
        ..acd_default_parameters()
    }
}

#[test]
fn run_on_a_cube() {
    let mut cube = Buffers::new(&unit_cube());
    let mesh = cube.as_ffi();
    let params = small_params();

    unsafe {
        let hulls = acd_run(&mesh, &params);
        assert_eq!(hulls.meshes_count, 1);
        let hull = to_meshes(&hulls).remove(0);
        assert_relative_eq!(hull.volume(), 1.0, epsilon = 1.0e-9);
        acd_free_mesh_array(hulls);

        let score = acd_mesh_score(&mesh, &params);
        assert_eq!(score.hulls_num, 1);
    }
}

#[test]
fn invalid_tags_give_an_empty_result() {
    let mut cube = Buffers::new(&unit_cube());
    let mesh = cube.as_ffi();

    for params in [
        AcdParameters {
            preprocess_mode: 3,
            ..small_params()
        },
        AcdParameters {
            apx_mode: -1,
            ..small_params()
        },
        AcdParameters {
            threshold: 0.0,
            ..small_params()
        },
    ] {
        unsafe {
            let hulls = acd_run(&mesh, &params);
            assert!(hulls.meshes_ptr.is_null());
            assert_eq!(hulls.meshes_count, 0);

            let planes = acd_best_cutting_planes(&mesh, &params, 2);
            assert!(planes.planes_ptr.is_null());
            assert_eq!(planes.planes_count, 0);
        }
    }
}

#[test]
fn normalize_then_recover() {
    let input = cube_at(Point::new(2.0, -1.0, 5.0));
    let mut buffers = Buffers::new(&input);
    let mesh = buffers.as_ffi();

    unsafe {
        let normalized = acd_normalize(&mesh);
        assert_eq!(normalized.x_min, 2.0);
        assert_eq!(normalized.z_max, 6.0);

        let recovered = acd_recover(&normalized.mesh, &normalized);
        let recovered_mesh = to_mesh(&recovered);
        for (p, q) in input.points.iter().zip(&recovered_mesh.points) {
            assert!((p - q).amax() <= 1.0e-12);
        }

        acd_free_mesh(recovered);
        acd_free_mesh(normalized.mesh);
    }
}

#[test]
fn best_planes_of_two_cubes_cut_the_gap() {
    let mut buffers = Buffers::new(&two_cubes());
    let mesh = buffers.as_ffi();

    unsafe {
        let planes = acd_best_cutting_planes(&mesh, &small_params(), 1);
        assert_eq!(planes.planes_count, 1);

        let plane = *planes.planes_ptr;
        assert!(plane.a.abs() > 1.0 - 1.0e-9);
        let x = -plane.d / plane.a;
        assert!(x > 1.0 && x < 3.0, "{x}");
        assert!(plane.score < 0.05);

        acd_free_plane_array(planes);
    }
}

#[test]
fn clip_hull_and_merge() {
    let cube = unit_cube();
    let mut buffers = Buffers::new(&cube);
    let mesh = buffers.as_ffi();
    let plane = AcdPlane {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: -0.5,
        score: 0.0,
    };

    unsafe {
        let parts = acd_clip(&mesh, &plane);
        assert_eq!(parts.meshes_count, 2);

        let halves = to_meshes(&parts);
        let hull_a = acd_compute_convex_hull(&*parts.meshes_ptr);
        let hull_b = acd_compute_convex_hull(&*parts.meshes_ptr.add(1));
        assert!(hull_a.concavity < 1.0e-3);
        assert_relative_eq!(to_mesh(&hull_a.mesh).volume(), 0.5, epsilon = 1.0e-9);

        let mut hull_meshes = [hull_a.mesh, hull_b.mesh];
        let hulls = AcdMeshArray {
            meshes_ptr: hull_meshes.as_mut_ptr(),
            meshes_count: 2,
        };
        let merged = acd_merge(&mesh, &parts, &hulls);
        assert_eq!(merged.meshes_count, 1);
        assert_relative_eq!(to_meshes(&merged)[0].volume(), 1.0, epsilon = 1.0e-6);
        assert_eq!(halves.len(), 2);

        acd_free_mesh_array(merged);
        acd_free_mesh(hull_a.mesh);
        acd_free_mesh(hull_b.mesh);
        acd_free_mesh_array(parts);
    }
}

#[test]
fn log_levels() {
    let warn = CString::new("warn").unwrap();
    let bogus = CString::new("loud").unwrap();

    unsafe {
        assert_eq!(acd_set_log_level(warn.as_ptr()), 0);
        assert_eq!(acd_set_log_level(bogus.as_ptr()), -1);
    }
}
