use super::shapes::l_prism;
use acd3d::math::{Point, Real};
use acd3d::{normalize, recover, Mesh};

fn random_cloud(seed: u128) -> Mesh {
    let mut rng = oorandom::Rand64::new(seed);
    let mut coord = |scale: Real| (rng.rand_float() * 2.0 - 1.0) * scale;
    let points = (0..64)
        .map(|_| Point::new(coord(10.0) + 3.0, coord(2.0) - 7.0, coord(0.5)))
        .collect();
    Mesh::new(points, vec![])
}

fn max_error(a: &Mesh, b: &Mesh) -> Real {
    a.points
        .iter()
        .zip(&b.points)
        .map(|(p, q)| (p - q).amax())
        .fold(0.0, Real::max)
}

#[test]
fn recover_undoes_normalize() {
    for seed in 0..8 {
        let mesh = random_cloud(seed);
        let (normalized, normalization) = normalize(&mesh, false);

        let aabb = normalized.aabb();
        assert!(aabb.mins.iter().all(|e| *e >= -1.0 - 1.0e-12));
        assert!(aabb.maxs.iter().all(|e| *e <= 1.0 + 1.0e-12));
        assert_relative_eq!(aabb.maxs.x - aabb.mins.x, 2.0, epsilon = 1.0e-12);

        let recovered = recover(&normalized, &normalization);
        assert!(max_error(&mesh, &recovered) <= 1.0e-12);
    }
}

#[test]
fn recover_undoes_normalize_with_pca() {
    for mesh in [random_cloud(99), l_prism()] {
        let (normalized, normalization) = normalize(&mesh, true);
        assert!(normalization.rotation.is_some());

        let recovered = recover(&normalized, &normalization);
        assert!(max_error(&mesh, &recovered) <= 1.0e-9);
        assert_eq!(recovered.triangles, mesh.triangles);
    }
}
