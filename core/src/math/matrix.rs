use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::prelude::{MpmError, MpmResult};
use crate::validation;

/// Pivots smaller than this (relative to the largest entry) mark a matrix as singular.
pub const SINGULAR_TOL: f64 = 1e-12;

pub struct MatrixHelper;

impl MatrixHelper {
    /// Multiply two 2D arrays.
    pub fn multiply(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> Array2<f64> {
        lhs.dot(&rhs)
    }

    pub fn column_sums(a: ArrayView2<f64>) -> Array1<f64> {
        a.sum_axis(Axis(0))
    }

    /// Copies an `ndarray` matrix into a column-major `nalgebra` matrix.
    pub fn to_dmatrix(a: ArrayView2<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
    }

    pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
        Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
    }

    /// Inverts a square matrix through an LU factorisation.
    ///
    /// Fails with [`MpmError::SingularMatrix`] when a pivot vanishes
    /// (relative to the largest entry) or the inverse is not finite.
    pub fn inverse(a: ArrayView2<f64>, label: &str) -> MpmResult<Array2<f64>> {
        validation::ensure_square(a, label)?;
        let m = Self::to_dmatrix(a);
        let scale = m.amax().max(1.0);
        let lu = m.lu();
        let upper = lu.u();
        if let Some(pivot) = upper
            .diagonal()
            .iter()
            .find(|p| p.abs() <= SINGULAR_TOL * scale)
        {
            return Err(MpmError::SingularMatrix(format!(
                "{} has a vanishing pivot ({:e})",
                label, pivot
            )));
        }
        let inverse = lu
            .try_inverse()
            .ok_or_else(|| MpmError::SingularMatrix(format!("{} is not invertible", label)))?;
        if inverse.iter().any(|v| !v.is_finite()) {
            return Err(MpmError::SingularMatrix(format!(
                "inverse of {} is not finite",
                label
            )));
        }
        Ok(Self::from_dmatrix(&inverse))
    }

    /// Fundamental matrix `N = (I - U)^-1`: expected visits to each stage
    /// before death, by starting stage (columns).
    pub fn fundamental(u: ArrayView2<f64>) -> MpmResult<Array2<f64>> {
        let n = validation::ensure_square(u, "U")?;
        let i_minus_u = Array2::<f64>::eye(n) - &u;
        let fundamental = Self::inverse(i_minus_u.view(), "I - U")?;
        // A convergent U always yields a non-negative N; anything else means
        // the model never lets individuals die.
        if fundamental.iter().any(|v| *v < -1e-9) {
            return Err(MpmError::SingularMatrix(
                "fundamental matrix has negative entries (U is not convergent)".into(),
            ));
        }
        Ok(fundamental.mapv(|v| v.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn dmatrix_round_trip_preserves_layout() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let m = MatrixHelper::to_dmatrix(a.view());
        assert_eq!(m[(1, 0)], 3.0);
        assert_eq!(MatrixHelper::from_dmatrix(&m), a);
    }

    #[test]
    fn fundamental_of_lower_triangular_survival() {
        let u = array![[0.5, 0.0], [0.25, 0.8]];
        let n = MatrixHelper::fundamental(u.view()).unwrap();
        let expected = array![[2.0, 0.0], [2.5, 5.0]];
        for (got, want) in n.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn fundamental_is_non_negative_for_substochastic_u() {
        let u = array![[0.1, 0.2, 0.0], [0.6, 0.3, 0.4], [0.0, 0.4, 0.5]];
        let n = MatrixHelper::fundamental(u.view()).unwrap();
        assert!(n.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn immortal_stage_is_singular() {
        let u = array![[1.0, 0.0], [0.0, 0.5]];
        assert!(matches!(
            MatrixHelper::fundamental(u.view()),
            Err(MpmError::SingularMatrix(_))
        ));
    }

    #[test]
    fn closed_cycle_is_singular() {
        let u = array![[0.0, 1.0], [1.0, 0.0]];
        assert!(matches!(
            MatrixHelper::fundamental(u.view()),
            Err(MpmError::SingularMatrix(_))
        ));
    }

    #[test]
    fn multiply_matches_manual_product() {
        let a = array![[1.0, 2.0], [0.0, 1.0]];
        let b = array![[1.0], [1.0]];
        assert_eq!(MatrixHelper::multiply(a.view(), b.view()), array![[3.0], [1.0]]);
    }
}
