use acd3d::hull::box_hull;
use acd3d::math::{Point, Real};
use acd3d::parry::bounding_volume::Aabb;
use acd3d::{Mesh, Parameters, PreprocessMode};

pub fn cube_at(min: Point<Real>) -> Mesh {
    box_hull(&Aabb::new(min, min + acd3d::math::Vector::repeat(1.0)))
}

pub fn unit_cube() -> Mesh {
    cube_at(Point::origin())
}

pub fn two_cubes() -> Mesh {
    unit_cube().merged_with(&cube_at(Point::new(3.0, 0.0, 0.0)))
}

/// Two closed unit cubes sharing the face `x = 1`, without welded vertices.
pub fn stacked_cubes() -> Mesh {
    unit_cube().merged_with(&cube_at(Point::new(1.0, 0.0, 0.0)))
}

/// The prism of height 1 over the L-shaped polygon obtained by removing
/// the square `[1, 2]²` from `[0, 2]²`.
pub fn l_prism() -> Mesh {
    let outline = [
        [0.0, 0.0],
        [2.0, 0.0],
        [2.0, 1.0],
        [1.0, 1.0],
        [1.0, 2.0],
        [0.0, 2.0],
    ];
    let n = outline.len() as u32;

    let mut points: Vec<_> = outline.iter().map(|[x, y]| Point::new(*x, *y, 0.0)).collect();
    points.extend(outline.iter().map(|[x, y]| Point::new(*x, *y, 1.0)));

    // Fan from the reflex corner.
    let cap = [[3, 4, 5], [3, 5, 0], [3, 0, 1], [3, 1, 2]];
    let mut triangles = vec![];
    for [a, b, c] in cap {
        triangles.push([a, c, b]);
        triangles.push([a + n, b + n, c + n]);
    }

    for i in 0..n {
        let j = (i + 1) % n;
        triangles.push([i, j, j + n]);
        triangles.push([i, j + n, i + n]);
    }

    Mesh::load(points, triangles).unwrap()
}

pub fn fast_params() -> Parameters {
    Parameters {
        resolution: 400,
        mcts_iteration: 40,
        mcts_nodes: 30,
        mcts_max_depth: 2,
        ..Parameters::default()
    }
}

/// Few enough candidate planes for the search to try all of them. The
/// planes through the reflex edge of [`l_prism`] are among them.
pub fn coarse_params() -> Parameters {
    Parameters {
        prep_resolution: 9,
        preprocess_mode: PreprocessMode::Off,
        ..fast_params()
    }
}

/// Is `pt` inside of, or within `tolerance` of, the convex `hull`?
pub fn hull_contains(hull: &Mesh, pt: &Point<Real>, tolerance: Real) -> bool {
    (0..hull.triangles.len()).all(|i| {
        let [a, _, _] = hull.triangle_vertices(i);
        let normal = hull.scaled_normal(i);
        let norm = normal.norm();
        norm == 0.0 || normal.dot(&(pt - a)) / norm <= tolerance
    })
}

/// Random points on the surface of `mesh`.
pub fn surface_points(mesh: &Mesh, count: usize, seed: u64) -> Vec<Point<Real>> {
    let mut rng = oorandom::Rand64::new(seed as u128);
    let total = mesh.area();
    let mut points = vec![];

    for i in 0..mesh.triangles.len() {
        let share = (mesh.triangle_area(i) / total * count as Real).ceil() as usize;
        let [a, b, c] = mesh.triangle_vertices(i);

        for _ in 0..share {
            let (mut u, mut v) = (rng.rand_float(), rng.rand_float());
            if u + v > 1.0 {
                u = 1.0 - u;
                v = 1.0 - v;
            }
            points.push(a + (b - a) * u + (c - a) * v);
        }
    }

    points
}
