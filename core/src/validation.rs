//! Input checks shared by every public operation.
//!
//! Stage indices are 0-based. Matrices must be square, finite and
//! non-negative; survival matrices additionally need column sums of at most
//! one (within [`COLSUM_TOL`]).

use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::prelude::{MpmError, MpmResult};

/// Slack allowed on survival column sums for rounding in user-entered data.
pub const COLSUM_TOL: f64 = 1e-9;

/// Returns the dimension of a non-empty square matrix.
pub fn ensure_square(a: ArrayView2<f64>, label: &str) -> MpmResult<usize> {
    let (rows, cols) = a.dim();
    if rows == 0 || rows != cols {
        return Err(MpmError::DimensionMismatch(format!(
            "{} must be a non-empty square matrix, got {}x{}",
            label, rows, cols
        )));
    }
    Ok(rows)
}

pub fn ensure_non_negative(a: ArrayView2<f64>, label: &str) -> MpmResult<()> {
    if let Some(((i, j), value)) = a
        .indexed_iter()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(MpmError::InvalidInput(format!(
            "{} entry ({}, {}) = {} is negative or not finite",
            label, i, j, value
        )));
    }
    Ok(())
}

/// Validates a survival matrix `U` and returns its dimension.
pub fn ensure_survival(u: ArrayView2<f64>) -> MpmResult<usize> {
    let n = ensure_square(u, "U")?;
    ensure_non_negative(u, "U")?;
    for (j, total) in u.sum_axis(Axis(0)).iter().enumerate() {
        if *total > 1.0 + COLSUM_TOL {
            return Err(MpmError::InvalidInput(format!(
                "column {} of U sums to {} (> 1)",
                j, total
            )));
        }
    }
    Ok(n)
}

/// Validates `U` together with a reproduction matrix of the same shape.
pub fn ensure_pair(u: ArrayView2<f64>, r: ArrayView2<f64>) -> MpmResult<usize> {
    let n = ensure_survival(u)?;
    if r.dim() != u.dim() {
        return Err(MpmError::DimensionMismatch(format!(
            "U is {}x{} but reproduction matrix is {}x{}",
            n,
            n,
            r.nrows(),
            r.ncols()
        )));
    }
    ensure_non_negative(r, "reproduction matrix")?;
    Ok(n)
}

/// Validates a projection matrix `A` (square, finite, non-negative).
pub fn ensure_projection(a: ArrayView2<f64>) -> MpmResult<usize> {
    let n = ensure_square(a, "A")?;
    ensure_non_negative(a, "A")?;
    Ok(n)
}

pub fn ensure_stage(index: usize, stages: usize) -> MpmResult<()> {
    if index >= stages {
        return Err(MpmError::InvalidIndex { index, stages });
    }
    Ok(())
}

pub fn ensure_stages(indices: &[usize], stages: usize) -> MpmResult<()> {
    indices
        .iter()
        .try_for_each(|&index| ensure_stage(index, stages))
}

/// Checks a per-age trajectory: non-empty, finite and inside `[lower, upper]`.
pub fn ensure_trajectory(
    values: ArrayView1<f64>,
    label: &str,
    lower: f64,
    upper: f64,
) -> MpmResult<()> {
    if values.is_empty() {
        return Err(MpmError::InvalidInput(format!("{} is empty", label)));
    }
    if let Some((age, value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < lower || **v > upper)
    {
        return Err(MpmError::InvalidInput(format!(
            "{} at age {} is {}, outside [{}, {}]",
            label, age, value, lower, upper
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn survival_tolerates_rounding_in_column_sums() {
        let u = array![[0.1, 0.0], [0.2 + 0.7, 0.3]];
        assert_eq!(ensure_survival(u.view()).unwrap(), 2);
    }

    #[test]
    fn negative_entries_are_rejected() {
        let u = array![[0.1, -0.1], [0.2, 0.3]];
        assert!(matches!(
            ensure_survival(u.view()),
            Err(MpmError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_square_matrix_is_a_dimension_error() {
        let u = array![[0.1, 0.2, 0.3], [0.2, 0.3, 0.1]];
        assert!(matches!(
            ensure_square(u.view(), "U"),
            Err(MpmError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn stage_indices_are_zero_based() {
        assert!(ensure_stages(&[0, 2], 3).is_ok());
        assert_eq!(
            ensure_stages(&[0, 3], 3),
            Err(MpmError::InvalidIndex {
                index: 3,
                stages: 3
            })
        );
    }

    #[test]
    fn trajectory_bounds_are_checked() {
        let lx = array![1.0, 0.5, f64::NAN];
        assert!(ensure_trajectory(lx.view(), "lx", 0.0, 1.0).is_err());
        let lx = array![1.0, 0.5];
        assert!(ensure_trajectory(lx.view(), "lx", 0.0, 1.0).is_ok());
    }
}
