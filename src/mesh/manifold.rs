use super::Mesh;
use parry::utils::SortedPair;
use smallvec::SmallVec;
use std::collections::HashMap;

impl Mesh {
    /// Maps every edge of this mesh to the triangles containing it.
    pub fn edge_map(&self) -> HashMap<SortedPair<u32>, SmallVec<[u32; 2]>> {
        let mut edges: HashMap<_, SmallVec<[u32; 2]>> = HashMap::new();

        for (i, tri) in self.triangles.iter().enumerate() {
            for k in 0..3 {
                let edge = SortedPair::new(tri[k], tri[(k + 1) % 3]);
                edges.entry(edge).or_default().push(i as u32);
            }
        }

        edges
    }

    /// Tests whether this mesh is a closed, consistently oriented 2-manifold.
    ///
    /// Every edge must be shared by exactly two triangles that traverse it in
    /// opposite directions.
    pub fn is_manifold(&self) -> bool {
        if self.triangles.is_empty() {
            return false;
        }

        for (edge, tris) in self.edge_map() {
            if tris.len() != 2 {
                return false;
            }

            let (a, b) = *edge;
            let forward = |t: u32| {
                let tri = self.triangles[t as usize];
                (0..3).any(|k| tri[k] == a && tri[(k + 1) % 3] == b)
            };

            if forward(tris[0]) == forward(tris[1]) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point;

    fn tetrahedron(triangles: Vec<[u32; 3]>) -> Mesh {
        Mesh::new(
            vec![
                Point::origin(),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ],
            triangles,
        )
    }

    #[test]
    fn closed_tetrahedron_is_manifold() {
        let mesh = tetrahedron(vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]]);
        assert!(mesh.is_manifold());
        assert_eq!(mesh.edge_map().len(), 6);
    }

    #[test]
    fn open_or_flipped_meshes_are_not_manifold() {
        assert!(!tetrahedron(vec![[0, 2, 1], [0, 1, 3], [1, 2, 3]]).is_manifold());
        assert!(!tetrahedron(vec![[0, 1, 2], [0, 1, 3], [1, 2, 3], [0, 3, 2]]).is_manifold());
    }
}
