use ndarray::Array1;

use crate::prelude::{MpmError, MpmResult};

pub struct StatsHelper;

impl StatsHelper {
    /// Weighted mean of per-stage values.
    ///
    /// Stages listed in `exclude` and stages whose value is `None` are dropped
    /// from both the numerator and the weight normalisation. `weights = None`
    /// gives every remaining stage the same weight.
    pub fn weighted_mean(
        values: &[Option<f64>],
        weights: Option<&[f64]>,
        exclude: &[usize],
    ) -> MpmResult<f64> {
        if let Some(w) = weights {
            if w.len() != values.len() {
                return Err(MpmError::DimensionMismatch(format!(
                    "{} weights for {} stages",
                    w.len(),
                    values.len()
                )));
            }
            if w.iter().any(|x| !x.is_finite() || *x < 0.0) {
                return Err(MpmError::InvalidInput(
                    "weights must be finite and non-negative".into(),
                ));
            }
        }

        let (total, mass) = values
            .iter()
            .enumerate()
            .filter(|(stage, _)| !exclude.contains(stage))
            .filter_map(|(stage, value)| value.map(|v| (stage, v)))
            .fold((0.0, 0.0), |(total, mass), (stage, v)| {
                let weight = weights.map_or(1.0, |w| w[stage]);
                (total + weight * v, mass + weight)
            });

        if mass <= 0.0 {
            return Err(MpmError::Undefined(
                "no stage with a defined value carries positive weight".into(),
            ));
        }
        Ok(total / mass)
    }

    /// Composite trapezoid rule over equally spaced samples.
    pub fn trapezoid(y: &[f64], dx: f64) -> f64 {
        y.windows(2).map(|pair| 0.5 * (pair[0] + pair[1]) * dx).sum()
    }

    /// Running trapezoid integral, starting at zero.
    pub fn cumulative_trapezoid(y: &[f64], dx: f64) -> Vec<f64> {
        let mut acc = 0.0;
        std::iter::once(0.0)
            .chain(y.windows(2).map(|pair| {
                acc += 0.5 * (pair[0] + pair[1]) * dx;
                acc
            }))
            .take(y.len())
            .collect()
    }

    /// Total-variation distance `½ Σ |a - b|` between two distributions.
    pub fn total_variation(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
        0.5 * (a - b).mapv(f64::abs).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn weighted_mean_skips_excluded_and_undefined_stages() {
        let values = [Some(0.2), None, Some(0.8), Some(100.0)];
        let weights = [1.0, 5.0, 3.0, 2.0];
        let mean = StatsHelper::weighted_mean(&values, Some(&weights), &[3]).unwrap();
        assert!((mean - (0.2 + 3.0 * 0.8) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn unweighted_mean_is_plain_average() {
        let values = [Some(1.0), Some(2.0), Some(6.0)];
        assert_eq!(StatsHelper::weighted_mean(&values, None, &[]).unwrap(), 3.0);
    }

    #[test]
    fn weighted_mean_without_mass_is_undefined() {
        let values = [Some(1.0), None];
        let weights = [0.0, 1.0];
        assert!(matches!(
            StatsHelper::weighted_mean(&values, Some(&weights), &[]),
            Err(MpmError::Undefined(_))
        ));
    }

    #[test]
    fn trapezoid_is_exact_for_lines() {
        assert_eq!(StatsHelper::trapezoid(&[0.0, 1.0, 2.0], 0.5), 1.0);
        assert_eq!(StatsHelper::trapezoid(&[3.0], 1.0), 0.0);
        assert_eq!(
            StatsHelper::cumulative_trapezoid(&[0.0, 1.0, 2.0], 1.0),
            vec![0.0, 0.5, 2.0]
        );
    }

    #[test]
    fn total_variation_of_disjoint_distributions_is_one() {
        let a = array![1.0, 0.0];
        let b = array![0.0, 1.0];
        assert_eq!(StatsHelper::total_variation(&a, &b), 1.0);
    }
}
