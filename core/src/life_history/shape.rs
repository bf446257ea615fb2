//! Pace-independent shape of survival and reproduction over age.
//!
//! Both measures rescale age to `[0, 1]` and compare the area under a
//! transformed curve with the area (0.5) produced by a constant rate. Values
//! lie in `[-0.5, 0.5]`; positive values mean the rate rises with age.

use ndarray::ArrayView1;

use crate::math::stats::StatsHelper;
use crate::prelude::{MpmError, MpmResult};
use crate::validation;

/// Shape of survivorship: `0.5 - ∫ ln l(x) / ln l(ω) dx` on rescaled age.
///
/// Constant hazard makes `ln l` linear (shape 0); mortality concentrated at
/// late ages gives a positive shape.
pub fn shape_surv(lx: ArrayView1<f64>) -> MpmResult<f64> {
    validation::ensure_trajectory(lx, "lx", 0.0, f64::MAX)?;
    if lx.len() < 2 {
        return Err(MpmError::InvalidInput(
            "shape_surv needs at least two ages".into(),
        ));
    }
    let radix = lx[0];
    if radix <= 0.0 {
        return Err(MpmError::InvalidInput("lx at age 0 must be positive".into()));
    }
    if lx.iter().any(|l| *l <= 0.0) {
        return Err(MpmError::Undefined(
            "log survivorship is infinite where lx is zero; truncate lx first".into(),
        ));
    }
    let log_end = (lx[lx.len() - 1] / radix).ln();
    if log_end >= 0.0 {
        return Err(MpmError::Undefined(
            "survivorship does not decline over the supplied ages".into(),
        ));
    }
    let scaled: Vec<f64> = lx.iter().map(|l| (l / radix).ln() / log_end).collect();
    let dx = 1.0 / (lx.len() - 1) as f64;
    Ok(0.5 - StatsHelper::trapezoid(&scaled, dx))
}

/// Shape of reproduction: `0.5 - ∫ M(x) dx`, with `M` the cumulative
/// reproduction normalised to end at one, on rescaled age.
pub fn shape_rep(mx: ArrayView1<f64>) -> MpmResult<f64> {
    validation::ensure_trajectory(mx, "mx", 0.0, f64::MAX)?;
    if mx.len() < 2 {
        return Err(MpmError::InvalidInput(
            "shape_rep needs at least two ages".into(),
        ));
    }
    let cumulative = StatsHelper::cumulative_trapezoid(&mx.to_vec(), 1.0);
    let total = cumulative[cumulative.len() - 1];
    if total <= 0.0 {
        return Err(MpmError::Undefined(
            "no reproduction over the supplied ages".into(),
        ));
    }
    let scaled: Vec<f64> = cumulative.iter().map(|m| m / total).collect();
    let dx = 1.0 / (mx.len() - 1) as f64;
    Ok(0.5 - StatsHelper::trapezoid(&scaled, dx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    #[test]
    fn constant_hazard_has_flat_shape() {
        let lx = Array1::from_shape_fn(11, |x| 0.8f64.powi(x as i32));
        assert_abs_diff_eq!(shape_surv(lx.view()).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn late_mortality_has_positive_shape() {
        let lx = ndarray::array![1.0, 0.99, 0.98, 0.5, 0.01];
        assert!(shape_surv(lx.view()).unwrap() > 0.0);
        let lx = ndarray::array![1.0, 0.2, 0.1, 0.08, 0.07];
        assert!(shape_surv(lx.view()).unwrap() < 0.0);
    }

    #[test]
    fn flat_survivorship_is_undefined() {
        let lx = ndarray::array![1.0, 1.0];
        assert!(matches!(
            shape_surv(lx.view()),
            Err(MpmError::Undefined(_))
        ));
    }

    #[test]
    fn constant_reproduction_has_flat_shape() {
        let mx = Array1::from_elem(6, 2.5);
        assert_abs_diff_eq!(shape_rep(mx.view()).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn increasing_reproduction_has_positive_shape() {
        let mx = ndarray::array![0.0, 1.0, 2.0, 3.0];
        assert!(shape_rep(mx.view()).unwrap() > 0.0);
    }
}
