//! Conversions between survivorship (`lx`), survival probability (`px`) and
//! mortality hazard (`hx`) trajectories.
//!
//! `px(x) = lx(x+1) / lx(x)` and `hx(x) = -ln px(x)`, so an `lx` of length
//! `n` maps to `px`/`hx` of length `n - 1`, and back (with `lx(0) = 1`).

use ndarray::{Array1, ArrayView1};

use crate::prelude::{MpmError, MpmResult};
use crate::validation;

/// Allowed increase between successive lx values before it counts as growth.
const MONOTONE_TOL: f64 = 1e-12;

pub fn lx_to_px(lx: ArrayView1<f64>) -> MpmResult<Array1<f64>> {
    validation::ensure_trajectory(lx, "lx", 0.0, 1.0)?;
    lx.windows(2)
        .into_iter()
        .enumerate()
        .map(|(age, pair)| {
            let (now, next) = (pair[0], pair[1]);
            if next > now + MONOTONE_TOL {
                return Err(MpmError::InvalidInput(format!(
                    "lx increases between ages {} and {}",
                    age,
                    age + 1
                )));
            }
            if now == 0.0 {
                return Err(MpmError::Undefined(format!(
                    "px undefined at age {}: lx is zero",
                    age
                )));
            }
            Ok((next / now).min(1.0))
        })
        .collect()
}

pub fn lx_to_hx(lx: ArrayView1<f64>) -> MpmResult<Array1<f64>> {
    let px = lx_to_px(lx)?;
    px_to_hx(px.view())
}

pub fn px_to_lx(px: ArrayView1<f64>) -> MpmResult<Array1<f64>> {
    if !px.is_empty() {
        validation::ensure_trajectory(px, "px", 0.0, 1.0)?;
    }
    let mut survivors = 1.0;
    Ok(std::iter::once(1.0)
        .chain(px.iter().map(|p| {
            survivors *= p;
            survivors
        }))
        .collect())
}

pub fn px_to_hx(px: ArrayView1<f64>) -> MpmResult<Array1<f64>> {
    if px.is_empty() {
        return Ok(Array1::zeros(0));
    }
    validation::ensure_trajectory(px, "px", 0.0, 1.0)?;
    if let Some(age) = px.iter().position(|p| *p == 0.0) {
        return Err(MpmError::Undefined(format!(
            "hazard is infinite at age {} (px = 0)",
            age
        )));
    }
    Ok(px.mapv(|p| -p.ln()))
}

pub fn hx_to_px(hx: ArrayView1<f64>) -> MpmResult<Array1<f64>> {
    if hx.is_empty() {
        return Ok(Array1::zeros(0));
    }
    validation::ensure_trajectory(hx, "hx", 0.0, f64::MAX)?;
    Ok(hx.mapv(|h| (-h).exp()))
}

pub fn hx_to_lx(hx: ArrayView1<f64>) -> MpmResult<Array1<f64>> {
    let px = hx_to_px(hx)?;
    px_to_lx(px.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn lx_to_px_takes_successive_ratios() {
        let lx = array![1.0, 0.8, 0.4, 0.1];
        let px = lx_to_px(lx.view()).unwrap();
        assert_eq!(px.len(), 3);
        assert_abs_diff_eq!(px[0], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(px[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(px[2], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn px_to_lx_recovers_survivorship() {
        let lx = array![1.0, 0.8, 0.4, 0.1];
        let px = lx_to_px(lx.view()).unwrap();
        let back = px_to_lx(px.view()).unwrap();
        for (got, want) in back.iter().zip(lx.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn hazard_is_negative_log_survival() {
        let px = array![0.5, 1.0];
        let hx = px_to_hx(px.view()).unwrap();
        assert_abs_diff_eq!(hx[0], 2f64.ln(), epsilon = 1e-12);
        assert_eq!(hx[1], 0.0);
        let lx = hx_to_lx(hx.view()).unwrap();
        assert_abs_diff_eq!(lx[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn zero_survivorship_before_the_end_is_undefined() {
        let lx = array![1.0, 0.0, 0.0];
        assert!(matches!(
            lx_to_px(lx.view()),
            Err(MpmError::Undefined(_))
        ));
    }

    #[test]
    fn increasing_survivorship_is_rejected() {
        let lx = array![1.0, 0.5, 0.6];
        assert!(matches!(
            lx_to_px(lx.view()),
            Err(MpmError::InvalidInput(_))
        ));
    }

    #[test]
    fn survivorship_above_one_is_rejected() {
        let lx = array![2.0, 1.5, 1.0];
        assert!(matches!(
            lx_to_px(lx.view()),
            Err(MpmError::InvalidInput(_))
        ));
        assert!(matches!(
            lx_to_hx(lx.view()),
            Err(MpmError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_px_has_no_finite_hazard() {
        let px = array![0.5, 0.0];
        assert!(matches!(
            px_to_hx(px.view()),
            Err(MpmError::Undefined(_))
        ));
    }
}
