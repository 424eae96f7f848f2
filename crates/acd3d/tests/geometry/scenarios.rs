use super::shapes::{
    coarse_params, fast_params, l_prism, stacked_cubes, two_cubes, unit_cube,
};
use acd3d::math::Point;
use acd3d::{best_cutting_planes, clip, decompose, mesh_score, Mesh, Parameters, Plane};

#[test]
fn unit_cube_is_kept_whole() {
    let cube = unit_cube();
    assert_eq!(cube.points.len(), 8);
    assert_eq!(cube.triangles.len(), 12);

    let params = fast_params();
    let hulls = decompose(&cube, &params).unwrap();
    assert_eq!(hulls.len(), 1);
    assert_relative_eq!(hulls[0].volume(), 1.0, epsilon = 1.0e-9);

    let score = mesh_score(&cube, &params).unwrap();
    assert_eq!(score.hulls_num, 1);
    assert!(score.avg_concavity < 1.0e-3, "{}", score.avg_concavity);
}

#[test]
fn disjoint_cubes_stay_separate() {
    let mesh = two_cubes();

    for merge in [false, true] {
        let params = Parameters {
            merge,
            ..coarse_params()
        };
        let hulls = decompose(&mesh, &params).unwrap();
        assert_eq!(hulls.len(), 2, "merge: {merge}");

        let mut volumes: Vec<_> = hulls.iter().map(|h| h.volume()).collect();
        volumes.sort_by(|a, b| a.total_cmp(b));
        assert_relative_eq!(volumes[0], 1.0, epsilon = 1.0e-6);
        assert_relative_eq!(volumes[1], 1.0, epsilon = 1.0e-6);
    }
}

#[test]
fn l_prism_is_split_at_its_reflex_edge() {
    let mesh = l_prism();
    let params = Parameters {
        merge: false,
        ..coarse_params()
    };

    let hulls = decompose(&mesh, &params).unwrap();
    assert_eq!(hulls.len(), 2);

    let total: f64 = hulls.iter().map(|h| h.volume()).sum();
    assert_relative_eq!(total, mesh.volume(), epsilon = 1.0e-6);
}

#[test]
fn l_prism_is_not_cut_under_a_loose_threshold() {
    let params = Parameters {
        threshold: 0.5,
        merge: false,
        ..coarse_params()
    };

    let hulls = decompose(&l_prism(), &params).unwrap();
    assert_eq!(hulls.len(), 1);
    assert_eq!(mesh_score(&l_prism(), &params).unwrap().hulls_num, 1);
}

#[test]
fn touching_cubes_are_merged_back_into_one_hull() {
    // The inner faces make the whole mesh concave, so it is cut along them
    // into two cubes whose union is convex again.
    let mesh = stacked_cubes();

    let split = Parameters {
        merge: false,
        ..coarse_params()
    };
    let hulls = decompose(&mesh, &split).unwrap();
    assert_eq!(hulls.len(), 2);
    for hull in &hulls {
        assert_relative_eq!(hull.volume(), 1.0, epsilon = 1.0e-6);
    }

    let merged = decompose(&mesh, &coarse_params()).unwrap();
    assert_eq!(merged.len(), 1);
    assert_relative_eq!(merged[0].volume(), 2.0, epsilon = 1.0e-6);
}

#[test]
fn mesh_score_counts_the_parts_before_merging() {
    let mesh = stacked_cubes();
    let split = Parameters {
        merge: false,
        ..coarse_params()
    };

    let with_merge = mesh_score(&mesh, &coarse_params()).unwrap();
    let without_merge = mesh_score(&mesh, &split).unwrap();
    assert_eq!(with_merge, without_merge);
    assert_eq!(with_merge.hulls_num, 2);
    assert!(with_merge.avg_concavity < coarse_params().threshold);
}

#[test]
fn clip_cube_at_half_height() {
    let cube = unit_cube();
    let plane = Plane::new(0.0, 1.0, 0.0, -0.5).unwrap();
    let parts = clip(&cube, &plane);
    assert_eq!(parts.len(), 2);

    for (part, above) in parts.iter().zip([true, false]) {
        assert!(part.is_manifold());
        assert_relative_eq!(part.volume(), 0.5, epsilon = 1.0e-9);

        let aabb = part.aabb();
        if above {
            assert_relative_eq!(aabb.mins.y, 0.5, epsilon = 1.0e-9);
        } else {
            assert_relative_eq!(aabb.maxs.y, 0.5, epsilon = 1.0e-9);
        }
    }

    let cut = match acd3d::clip_mesh(&cube, &plane) {
        acd3d::ClipResult::Valid(cut) => cut,
        acd3d::ClipResult::Invalid(reason) => panic!("invalid cut: {reason:?}"),
    };
    assert_relative_eq!(cut.cut_area, 1.0, epsilon = 1.0e-6);
}

#[test]
fn best_plane_of_l_prism_is_axis_aligned() {
    let mesh = l_prism();
    let params = Parameters {
        seed: 42,
        ..coarse_params()
    };

    let planes = best_cutting_planes(&mesh, &params, 3).unwrap();
    assert!(!planes.is_empty() && planes.len() <= 3);
    assert!(planes.windows(2).all(|w| w[0].1 <= w[1].1));

    let (best, score) = planes[0];
    assert!(score < params.threshold, "{score}");
    assert!(best.normal.z.abs() < 1.0e-9);
    assert!(best.normal.x.abs() > 1.0 - 1.0e-9 || best.normal.y.abs() > 1.0 - 1.0e-9);

    // The plane goes through the reflex edge, at x = 1 or y = 1.
    assert_relative_eq!(best.signed_distance(&Point::new(1.0, 1.0, 0.5)), 0.0, epsilon = 1.0e-6);

    let again = best_cutting_planes(&mesh, &params, 3).unwrap();
    assert_eq!(planes, again);
}

#[test]
fn collinear_triangle_gives_a_consistent_empty_result() {
    let mesh = Mesh::load(
        vec![
            Point::origin(),
            Point::new(1.0, 1.0, 1.0),
            Point::new(2.0, 2.0, 2.0),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();

    let params = Parameters::default();
    let first = decompose(&mesh, &params).unwrap();
    let second = decompose(&mesh, &params).unwrap();
    assert!(first.is_empty());
    assert_eq!(first, second);
}
