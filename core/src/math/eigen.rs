//! Dominant eigen-structure of projection matrices.
//!
//! Eigenvalues come from the real Schur form (`complex_eigenvalues`); the
//! left and right eigenvectors of the dominant eigenvalue are read off as
//! null vectors of `A - λI` (and its transpose) through an SVD, taking the
//! right singular vector of the smallest singular value.
//!
//! A matrix qualifies for dominant-eigen analysis when exactly one eigenvalue
//! attains the spectral radius, that eigenvalue is real and strictly
//! positive. Everything else (imprimitive cycles, reducible models with tied
//! growth rates, nilpotent matrices) is rejected as [`MpmError::NonErgodic`].

use log::debug;
use nalgebra::DMatrix;
use ndarray::{Array1, ArrayView2};
use num_complex::Complex64;
use serde::Serialize;

use crate::math::matrix::MatrixHelper;
use crate::prelude::{MpmError, MpmResult};
use crate::validation;

/// Relative tolerance for treating two eigenvalue moduli as tied.
pub const DOMINANCE_TOL: f64 = 1e-6;

/// Eigenvector entries more negative than this are not rounding noise.
const NEGATIVE_TOL: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominantEigen {
    pub lambda: f64,
    /// Stable stage distribution, sums to one.
    pub right: Array1<f64>,
    /// Reproductive values, scaled so that `left · right == 1`.
    pub left: Array1<f64>,
}

pub struct EigenHelper;

impl EigenHelper {
    /// All eigenvalues of a square matrix.
    pub fn spectrum(a: ArrayView2<f64>) -> MpmResult<Vec<Complex64>> {
        let n = validation::ensure_square(a, "A")?;
        if n == 1 {
            return Ok(vec![Complex64::new(a[[0, 0]], 0.0)]);
        }
        let m = MatrixHelper::to_dmatrix(a);
        Ok(m.complex_eigenvalues().iter().copied().collect())
    }

    /// Largest eigenvalue modulus. Unlike [`EigenHelper::dominant`] this
    /// does not require the maximum to be attained only once.
    pub fn spectral_radius(a: ArrayView2<f64>) -> MpmResult<f64> {
        Ok(Self::spectrum(a)?
            .iter()
            .map(|z| z.norm())
            .fold(0.0, f64::max))
    }

    pub fn dominant(a: ArrayView2<f64>) -> MpmResult<DominantEigen> {
        let n = validation::ensure_projection(a)?;
        let spectrum = Self::spectrum(a)?;
        let lead = spectrum
            .iter()
            .copied()
            .max_by(|x, y| x.norm().total_cmp(&y.norm()))
            .ok_or_else(|| MpmError::NonErgodic("empty spectrum".into()))?;
        let modulus = lead.norm();
        if modulus <= 0.0 {
            return Err(MpmError::NonErgodic(
                "all eigenvalues are zero (nilpotent matrix)".into(),
            ));
        }
        let ties = spectrum
            .iter()
            .filter(|z| z.norm() >= modulus * (1.0 - DOMINANCE_TOL))
            .count();
        if ties > 1 {
            return Err(MpmError::NonErgodic(format!(
                "{} eigenvalues share the dominant modulus {:.6}",
                ties, modulus
            )));
        }
        if lead.im.abs() > DOMINANCE_TOL * modulus || lead.re <= 0.0 {
            return Err(MpmError::NonErgodic(format!(
                "dominant eigenvalue {} is not real and positive",
                lead
            )));
        }
        let lambda = lead.re;

        let shifted = MatrixHelper::to_dmatrix(a) - DMatrix::<f64>::identity(n, n) * lambda;
        let right = Self::normalise(Self::null_vector(shifted.clone())?, "right")?;
        let left = Self::normalise(Self::null_vector(shifted.transpose())?, "left")?;
        let scale = left.dot(&right);
        if scale <= 0.0 {
            return Err(MpmError::NonErgodic(
                "left and right eigenvectors are orthogonal".into(),
            ));
        }
        let left = left / scale;
        debug!("dominant eigenvalue {:.6} for {}x{} matrix", lambda, n, n);
        Ok(DominantEigen {
            lambda,
            right,
            left,
        })
    }

    /// Asymptotic population growth rate λ.
    pub fn lambda(a: ArrayView2<f64>) -> MpmResult<f64> {
        Ok(Self::dominant(a)?.lambda)
    }

    /// Stable stage distribution `w`, summing to one.
    pub fn stable_dist(a: ArrayView2<f64>) -> MpmResult<Array1<f64>> {
        Ok(Self::dominant(a)?.right)
    }

    /// Reproductive values scaled so the first non-zero entry equals one.
    pub fn repro_value(a: ArrayView2<f64>) -> MpmResult<Array1<f64>> {
        let left = Self::dominant(a)?.left;
        let first = left
            .iter()
            .copied()
            .find(|v| *v > 0.0)
            .ok_or_else(|| MpmError::NonErgodic("reproductive values are all zero".into()))?;
        Ok(left / first)
    }

    fn null_vector(m: DMatrix<f64>) -> MpmResult<Array1<f64>> {
        let svd = m.svd(false, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| MpmError::Undefined("SVD produced no right singular vectors".into()))?;
        let (index, _) = svd
            .singular_values
            .iter()
            .enumerate()
            .min_by(|x, y| x.1.total_cmp(y.1))
            .ok_or_else(|| MpmError::Undefined("SVD produced no singular values".into()))?;
        Ok(v_t.row(index).iter().copied().collect())
    }

    /// Flips the sign so entries are non-negative and rescales to sum one.
    fn normalise(v: Array1<f64>, side: &str) -> MpmResult<Array1<f64>> {
        let total = v.sum();
        if total.abs() <= f64::EPSILON {
            return Err(MpmError::NonErgodic(format!(
                "{} eigenvector has no consistent sign",
                side
            )));
        }
        let v = v / total;
        if v.iter().any(|x| *x < -NEGATIVE_TOL) {
            return Err(MpmError::NonErgodic(format!(
                "{} eigenvector mixes signs",
                side
            )));
        }
        Ok(v.mapv(|x| x.max(0.0)))
    }
}
