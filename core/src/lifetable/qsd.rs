use log::{debug, warn};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;
use crate::prelude::{MpmError, MpmResult, Start};
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QsdOptions {
    /// Largest total-variation change between successive ages that counts
    /// as converged.
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for QsdOptions {
    fn default() -> Self {
        Self {
            tol: 1e-3,
            max_iter: 1000,
        }
    }
}

/// Result of [`qsd_converge`].
///
/// `converged == false` is the non-fatal convergence warning: `age` is then
/// the iteration cap and `distance` the last change observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QsdOutcome {
    pub age: usize,
    pub converged: bool,
    pub distance: f64,
}

/// Age at which a cohort's stage distribution settles to the
/// quasi-stationary distribution of `U`.
///
/// The cohort is projected through `U` and renormalised each age; the
/// returned age is the first `x` with `½ Σ |n(x+1) - n(x)| <= tol`.
pub fn qsd_converge(u: ArrayView2<f64>, start: &Start, options: QsdOptions) -> MpmResult<QsdOutcome> {
    let n = validation::ensure_survival(u)?;
    if !options.tol.is_finite() || options.tol < 0.0 || options.max_iter == 0 {
        return Err(MpmError::InvalidInput(format!(
            "qsd options need tol >= 0 and max_iter > 0, got {:?}",
            options
        )));
    }

    let mut current = start.vector(n)?;
    let mut distance = f64::MAX;
    for age in 0..options.max_iter {
        let next = u.dot(&current);
        let total = next.sum();
        if total <= 0.0 {
            return Err(MpmError::Undefined(format!(
                "cohort dies out at age {} before reaching a quasi-stationary distribution",
                age + 1
            )));
        }
        let next = next / total;
        distance = StatsHelper::total_variation(&next, &current);
        if distance <= options.tol {
            debug!("qsd_converge: converged at age {} (distance {:.3e})", age, distance);
            return Ok(QsdOutcome {
                age,
                converged: true,
                distance,
            });
        }
        current = next;
    }

    warn!(
        "qsd_converge: no convergence within {} iterations (last change {:.3e})",
        options.max_iter, distance
    );
    Ok(QsdOutcome {
        age: options.max_iter,
        converged: false,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn converges_within_cap_and_tolerance() {
        let u = array![[0.1, 0.0, 0.0], [0.5, 0.3, 0.1], [0.1, 0.5, 0.7]];
        let outcome = qsd_converge(u.view(), &Start::Stage(0), QsdOptions::default()).unwrap();
        assert!(outcome.converged);
        assert!(outcome.age <= 1000);
        assert!(outcome.distance <= 1e-3);
        assert!(outcome.age > 0);
    }

    #[test]
    fn stationary_start_converges_immediately() {
        let u = array![[0.5, 0.0], [0.0, 0.2]];
        let outcome = qsd_converge(u.view(), &Start::Stage(0), QsdOptions::default()).unwrap();
        assert_eq!(outcome.age, 0);
        assert!(outcome.converged);
    }

    #[test]
    fn periodic_model_hits_the_cap_with_a_warning_flag() {
        let u = array![[0.0, 0.5], [0.5, 0.0]];
        let options = QsdOptions {
            tol: 1e-3,
            max_iter: 25,
        };
        let outcome = qsd_converge(u.view(), &Start::Stage(0), options).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.age, 25);
        assert_eq!(outcome.distance, 1.0);
    }

    #[test]
    fn dying_cohort_is_an_error() {
        let u = array![[0.0, 0.0], [0.5, 0.0]];
        assert!(matches!(
            qsd_converge(u.view(), &Start::Stage(0), QsdOptions::default()),
            Err(MpmError::Undefined(_))
        ));
    }
}
