use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;
use crate::prelude::{MpmError, MpmResult};
use crate::validation;

/// How age-indexed sums are approximated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// Plain sum over ages.
    #[default]
    Sum,
    /// Trapezoid rule between successive ages.
    Trapezoid,
}

impl Integration {
    fn integrate(self, values: &[f64]) -> f64 {
        match self {
            Integration::Sum => values.iter().sum(),
            Integration::Trapezoid => StatsHelper::trapezoid(values, 1.0),
        }
    }
}

fn x_ln_x(x: f64) -> f64 {
    if x > 0.0 {
        x * x.ln()
    } else {
        0.0
    }
}

/// Keyfitz' entropy of a survivorship curve, `-Σ lx ln lx / Σ lx`.
pub fn entropy_k(lx: ArrayView1<f64>, integration: Integration) -> MpmResult<f64> {
    validation::ensure_trajectory(lx, "lx", 0.0, 1.0)?;
    let lx: Vec<f64> = lx.to_vec();
    let weighted: Vec<f64> = lx.iter().map(|l| x_ln_x(*l)).collect();
    let denominator = integration.integrate(&lx);
    if denominator <= 0.0 {
        return Err(MpmError::Undefined(
            "survivorship has no area to normalise by".into(),
        ));
    }
    Ok(-integration.integrate(&weighted) / denominator)
}

/// Demetrius' entropy of the age distribution of reproduction,
/// `-Σ p ln p` with `p = lx mx / Σ lx mx`.
pub fn entropy_d(lx: ArrayView1<f64>, mx: ArrayView1<f64>) -> MpmResult<f64> {
    validation::ensure_trajectory(lx, "lx", 0.0, 1.0)?;
    validation::ensure_trajectory(mx, "mx", 0.0, f64::MAX)?;
    if lx.len() != mx.len() {
        return Err(MpmError::DimensionMismatch(format!(
            "lx has {} ages but mx has {}",
            lx.len(),
            mx.len()
        )));
    }
    let lxmx: Array1<f64> = &lx * &mx;
    let total = lxmx.sum();
    if total <= 0.0 {
        return Err(MpmError::Undefined("lx * mx sums to zero".into()));
    }
    Ok(-lxmx.iter().map(|v| x_ln_x(v / total)).sum::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn keyfitz_entropy_of_halving_survivorship() {
        let lx = array![1.0, 0.5, 0.25];
        assert_abs_diff_eq!(
            entropy_k(lx.view(), Integration::Sum).unwrap(),
            0.39608410317711157,
            epsilon = 1e-12
        );
    }

    #[test]
    fn rectangular_survivorship_has_zero_entropy() {
        let lx = array![1.0, 1.0, 1.0, 0.0];
        assert_eq!(entropy_k(lx.view(), Integration::Trapezoid).unwrap(), 0.0);
    }

    #[test]
    fn trapezoid_differs_from_plain_sum() {
        let lx = array![1.0, 0.5, 0.25];
        let sum = entropy_k(lx.view(), Integration::Sum).unwrap();
        let trap = entropy_k(lx.view(), Integration::Trapezoid).unwrap();
        // trapezoid: -(0.5 ln .5 / 2 + 0.5 ln .5 / 2 + .25 ln .25 / 2) / 1.125
        let expected = -(0.5 * 0.5f64.ln() + 0.125 * 0.25f64.ln()) / 1.125;
        assert_abs_diff_eq!(trap, expected, epsilon = 1e-12);
        assert!(sum != trap);
    }

    #[test]
    fn demetrius_entropy_of_even_reproduction() {
        let lx = array![1.0, 0.5];
        let mx = array![1.0, 2.0];
        assert_abs_diff_eq!(
            entropy_d(lx.view(), mx.view()).unwrap(),
            2f64.ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn demetrius_entropy_needs_reproduction() {
        let lx = array![1.0, 0.5];
        let mx = array![0.0, 0.0];
        assert!(matches!(
            entropy_d(lx.view(), mx.view()),
            Err(MpmError::Undefined(_))
        ));
        let mx = array![1.0];
        assert!(matches!(
            entropy_d(lx.view(), mx.view()),
            Err(MpmError::DimensionMismatch(_))
        ));
    }
}
