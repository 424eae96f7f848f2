use super::shapes::{coarse_params, hull_contains, l_prism, surface_points, two_cubes};
use acd3d::mcts::MonteCarloTree;
use acd3d::{decompose, mesh_score, normalize, Mesh, Parameters};

fn assert_valid_hull(hull: &Mesh) {
    assert!(hull.points.iter().all(|pt| pt.coords.iter().all(|e| e.is_finite())));
    assert!(hull
        .triangles
        .iter()
        .flatten()
        .all(|i| (*i as usize) < hull.points.len()));
    assert!(hull.is_manifold());
    assert!(hull.volume() > 0.0);
}

#[test]
fn hulls_are_closed_and_cover_the_input() {
    let mesh = l_prism();
    let params = Parameters {
        merge: false,
        ..coarse_params()
    };
    let hulls = decompose(&mesh, &params).unwrap();
    assert!(!hulls.is_empty());
    hulls.iter().for_each(assert_valid_hull);

    let eta = mesh.bbox_diagonal() * 1.0e-3;
    for pt in surface_points(&mesh, 500, 7) {
        assert!(
            hulls.iter().any(|hull| hull_contains(hull, &pt, eta)),
            "{pt} is not covered"
        );
    }
}

#[test]
fn merged_hulls_cover_the_input() {
    let mesh = two_cubes();
    let hulls = decompose(&mesh, &coarse_params()).unwrap();
    hulls.iter().for_each(assert_valid_hull);

    let eta = mesh.bbox_diagonal() * 1.0e-3;
    for pt in surface_points(&mesh, 300, 11) {
        assert!(hulls.iter().any(|hull| hull_contains(hull, &pt, eta)));
    }
}

#[test]
fn part_count_is_capped() {
    for mesh in [l_prism(), two_cubes()] {
        let params = Parameters {
            max_convex_hull: 1,
            merge: false,
            ..coarse_params()
        };
        let hulls = decompose(&mesh, &params).unwrap();
        assert_eq!(hulls.len(), 1);
        assert_valid_hull(&hulls[0]);
    }
}

#[test]
fn decomposition_is_deterministic() {
    let mesh = l_prism();
    let params = Parameters {
        seed: 3,
        merge: false,
        ..coarse_params()
    };

    let first = decompose(&mesh, &params).unwrap();
    let second = decompose(&mesh, &params).unwrap();
    assert_eq!(first, second);
    assert_eq!(mesh_score(&mesh, &params), mesh_score(&mesh, &params));
}

#[test]
fn mesh_score_of_l_prism() {
    let params = Parameters {
        merge: false,
        ..coarse_params()
    };
    let score = mesh_score(&l_prism(), &params).unwrap();
    assert_eq!(score.hulls_num, 2);
    assert!(score.avg_concavity < params.threshold);
}

#[test]
fn chosen_child_is_never_worse_than_the_best_rollout() {
    let (mesh, _) = normalize(&l_prism(), false);

    for seed in 0..4 {
        let params = Parameters {
            seed,
            mcts_nodes: 8,
            mcts_iteration: 12,
            mcts_max_depth: 3,
            ..coarse_params()
        };

        let mut tree = MonteCarloTree::new(&mesh, &params).unwrap();
        let outcome = tree.search(&params).unwrap();
        assert!(outcome.quality <= outcome.best_rollout, "seed {seed}");
        assert!(!tree.is_empty());
    }
}
