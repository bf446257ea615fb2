use ndarray::{Array2, ArrayView2};

use crate::prelude::{Mpm, MpmResult};
use crate::validation;

/// Splits a projection matrix into survival and sexual reproduction,
/// assuming all reproduction sits in the top row.
///
/// The whole top row goes to `F`, so survival into the first stage is
/// attributed to reproduction. Fails with `InvalidInput` when the remaining
/// rows cannot be a survival matrix.
pub fn mpm_split(a: ArrayView2<f64>) -> MpmResult<Mpm> {
    validation::ensure_projection(a)?;
    let mut u = a.to_owned();
    let mut f = Array2::zeros(a.raw_dim());
    f.row_mut(0).assign(&a.row(0));
    u.row_mut(0).fill(0.0);
    Mpm::new(u, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::MpmError;
    use ndarray::array;

    #[test]
    fn top_row_becomes_fecundity() {
        let a = array![[0.1, 1.5, 3.0], [0.4, 0.3, 0.0], [0.0, 0.5, 0.8]];
        let mpm = mpm_split(a.view()).unwrap();
        assert_eq!(mpm.f().row(0), a.row(0));
        assert_eq!(mpm.u().row(0).sum(), 0.0);
        assert_eq!(mpm.projection(), a);
    }

    #[test]
    fn survival_above_one_is_rejected() {
        let a = array![[0.0, 2.0], [0.9, 0.5]];
        assert!(mpm_split(a.view()).is_ok());
        let a = array![[0.0, 2.0], [1.2, 0.5]];
        assert!(matches!(
            mpm_split(a.view()),
            Err(MpmError::InvalidInput(_))
        ));
    }
}
