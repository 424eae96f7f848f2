use super::Mesh;
use crate::math::{Real, Rotation};

impl Mesh {
    /// Rotates this mesh so its principal axes match the coordinate axes.
    ///
    /// The principal axes are the eigenvectors of the covariance matrix of
    /// the vertices. The returned rotation `R` has a determinant of `+1` and
    /// every vertex is replaced by `Rᵀ p`.
    ///
    /// Returns `None`, leaving the mesh untouched, if the vertices do not
    /// span a volume (fewer than four points, or all points coplanar) since
    /// the principal axes are not well-defined in that case.
    pub fn pca(&mut self) -> Option<Rotation<Real>> {
        if self.points.len() < 4 {
            log::warn!("PCA skipped: the mesh has fewer than four vertices.");
            return None;
        }

        let cov = parry::utils::cov(&self.points);
        let eigen = cov.symmetric_eigen();
        let max_eigenvalue = eigen.eigenvalues.max();
        let min_eigenvalue = eigen.eigenvalues.min();

        if !max_eigenvalue.is_finite() || min_eigenvalue <= max_eigenvalue * 1.0e-12 {
            log::warn!("PCA skipped: the vertices do not span a volume.");
            return None;
        }

        let mut eigv = eigen.eigenvectors;
        if eigv.determinant() < 0.0 {
            eigv = -eigv;
        }

        let rot = Rotation::from_matrix_unchecked(eigv);
        self.revert_pca(&rot.inverse());
        Some(rot)
    }

    /// Applies the rotation `rot` to every vertex, undoing [`Mesh::pca`].
    pub fn revert_pca(&mut self, rot: &Rotation<Real>) {
        self.transform_points(|pt| rot.transform_point(pt));
    }
}
