use super::shapes::{l_prism, unit_cube};
use acd3d::math::{Point, Real};
use acd3d::{clip_mesh, Axis, ClipResult, Mesh, Plane};

/// A random plane through a random point of the bounding box of `mesh`.
fn random_plane(mesh: &Mesh, rng: &mut oorandom::Rand64) -> Plane {
    let aabb = mesh.aabb();
    let mut coord = |i: usize| aabb.mins[i] + (aabb.maxs[i] - aabb.mins[i]) * rng.rand_float();
    let origin = Point::new(coord(0), coord(1), coord(2));

    loop {
        let (a, b, c) = (
            rng.rand_float() * 2.0 - 1.0,
            rng.rand_float() * 2.0 - 1.0,
            rng.rand_float() * 2.0 - 1.0,
        );
        if let Some(mut plane) = Plane::new(a, b, c, 0.0) {
            plane.d = -plane.normal.dot(&origin.coords);
            return plane;
        }
    }
}

fn check_complementarity(mesh: &Mesh, seed: u128) -> usize {
    let mut rng = oorandom::Rand64::new(seed);
    let area = mesh.area();
    let mut valid = 0;

    for _ in 0..50 {
        let plane = random_plane(mesh, &mut rng);

        match clip_mesh(mesh, &plane) {
            ClipResult::Valid(cut) => {
                valid += 1;
                // Random planes never contain a face of these meshes.
                let total = cut.pos.area() + cut.neg.area();
                let expected = area + 2.0 * cut.cut_area;
                assert_relative_eq!(total, expected, max_relative = 1.0e-6);
                assert!(cut.pos.is_manifold() && cut.neg.is_manifold());
                assert_relative_eq!(
                    cut.pos.volume() + cut.neg.volume(),
                    mesh.volume(),
                    max_relative = 1.0e-3
                );

                // Edge intersections are kept away from the edge endpoints.
                let eps: Real = 1.0e-3;
                assert!(cut.pos.points.iter().all(|p| plane.signed_distance(p) >= -eps));
                assert!(cut.neg.points.iter().all(|p| plane.signed_distance(p) <= eps));
            }
            ClipResult::Invalid(_) => {}
        }
    }

    valid
}

#[test]
fn random_cuts_of_a_cube_preserve_area() {
    assert!(check_complementarity(&unit_cube(), 1234) > 0);
}

#[test]
fn random_cuts_of_an_l_prism_preserve_area() {
    assert!(check_complementarity(&l_prism(), 42) > 0);
}

#[test]
fn faces_on_the_plane_count_once_in_the_cut_area() {
    // The notch wall of the L lies on `x = 1` and is not covered by a cap.
    let mesh = l_prism();
    let plane = Plane::axis_aligned(Axis::X, 1.0);
    let cut = match clip_mesh(&mesh, &plane) {
        ClipResult::Valid(cut) => cut,
        ClipResult::Invalid(reason) => panic!("invalid cut: {reason:?}"),
    };

    let wall_area = 1.0;
    assert_relative_eq!(cut.cut_area, 2.0, epsilon = 1.0e-9);
    assert_relative_eq!(
        cut.pos.area() + cut.neg.area(),
        mesh.area() + 2.0 * (cut.cut_area - wall_area),
        epsilon = 1.0e-9
    );
    assert_relative_eq!(cut.pos.volume(), 1.0, epsilon = 1.0e-9);
    assert_relative_eq!(cut.neg.volume(), 2.0, epsilon = 1.0e-9);
    assert!(cut.pos.is_manifold() && cut.neg.is_manifold());
}
