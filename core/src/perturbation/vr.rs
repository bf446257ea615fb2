//! Perturbation of λ with respect to stage-specific vital rates.
//!
//! `U` is decomposed as `U_ij = σ_j γ_ij`, with `σ_j` column survival and
//! `γ_ij` the transition rates conditional on survival. Reproduction is
//! decomposed as `F_ij = φ_j (F_ij / φ_j)` with `φ_j` the total fecundity of
//! stage `j`. Each vital rate is perturbed with the others held fixed and the
//! stage-specific derivatives are summed over stages:
//!
//! - survival: `∂λ/∂σ_j = Σ_i s_ij γ_ij`;
//! - growth `G_j = Σ_{i>j} γ_ij`, compensated by stasis so that column
//!   survival is unchanged: `∂λ/∂G_j = σ_j (Σ_{i>j} s_ij γ_ij / G_j - s_jj)`;
//! - shrinkage: as growth over `i < j`;
//! - fecundity: `∂λ/∂φ_j = Σ_i s_ij F_ij / φ_j` (clonality likewise).
//!
//! Elasticities are `Σ_j θ_j / λ ∂λ/∂θ_j`. Stages for which a rate is zero
//! contribute nothing.

use ndarray::{Array2, ArrayView2};
use serde::Serialize;

use crate::perturbation::matrix::sens_elas;
use crate::perturbation::PerturbType;
use crate::prelude::{Mpm, MpmResult};
use crate::vital_rates::mat::vr_mat_u;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VrPerturbation {
    pub survival: f64,
    pub growth: f64,
    pub shrinkage: f64,
    pub fecundity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clonality: Option<f64>,
}

/// Stage-specific derivative and value of one vital rate.
struct RateTerm {
    derivative: f64,
    value: f64,
}

fn combine(terms: impl Iterator<Item = RateTerm>, lambda: f64, kind: PerturbType) -> f64 {
    terms
        .map(|term| match kind {
            PerturbType::Sensitivity => term.derivative,
            PerturbType::Elasticity => term.value * term.derivative / lambda,
        })
        .sum()
}

/// Derivatives of λ to a compensated transition (growth or shrinkage) for
/// every stage where that transition occurs.
fn compensated_terms<'a>(
    gamma: &'a Array2<f64>,
    survival: &'a [f64],
    s: &'a Array2<f64>,
    moves: impl Fn(usize, usize) -> bool + 'a,
) -> impl Iterator<Item = RateTerm> + 'a {
    let n = gamma.nrows();
    (0..n).filter_map(move |j| {
        let rate: f64 = (0..n)
            .filter(|&i| moves(i, j))
            .map(|i| gamma[[i, j]])
            .sum();
        if rate <= 0.0 {
            return None;
        }
        let weighted: f64 = (0..n)
            .filter(|&i| moves(i, j))
            .map(|i| s[[i, j]] * gamma[[i, j]] / rate)
            .sum();
        Some(RateTerm {
            derivative: survival[j] * (weighted - s[[j, j]]),
            value: rate,
        })
    })
}

/// Derivatives of λ to the per-stage total of a reproduction matrix.
fn fecundity_terms<'a>(
    m: ArrayView2<'a, f64>,
    s: &'a Array2<f64>,
) -> impl Iterator<Item = RateTerm> + 'a {
    (0..m.ncols()).filter_map(move |j| {
        let phi = m.column(j).sum();
        if phi <= 0.0 {
            return None;
        }
        let derivative: f64 = m
            .column(j)
            .iter()
            .enumerate()
            .map(|(i, f)| s[[i, j]] * f / phi)
            .sum();
        Some(RateTerm {
            derivative,
            value: phi,
        })
    })
}

pub fn perturb_vr(mpm: &Mpm, kind: PerturbType) -> MpmResult<VrPerturbation> {
    let a = mpm.projection();
    let perturbation = sens_elas(a.view())?;
    let s = &perturbation.sensitivity;
    let lambda = perturbation.lambda;

    let conditional = vr_mat_u(mpm.u())?;
    let gamma = &conditional.rates;
    let survival = conditional.survival.to_vec();
    let n = mpm.stages();

    let survival_terms = (0..n).filter(|j| survival[*j] > 0.0).map(|j| RateTerm {
        derivative: (0..n).map(|i| s[[i, j]] * gamma[[i, j]]).sum(),
        value: survival[j],
    });

    Ok(VrPerturbation {
        survival: combine(survival_terms, lambda, kind),
        growth: combine(
            compensated_terms(gamma, &survival, s, |i, j| i > j),
            lambda,
            kind,
        ),
        shrinkage: combine(
            compensated_terms(gamma, &survival, s, |i, j| i < j),
            lambda,
            kind,
        ),
        fecundity: combine(fecundity_terms(mpm.f(), s), lambda, kind),
        clonality: mpm
            .c()
            .map(|c| combine(fecundity_terms(c, s), lambda, kind)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::MpmError;
    use crate::math::eigen::EigenHelper;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn model() -> Mpm {
        let u = array![[0.2, 0.1, 0.0], [0.3, 0.4, 0.1], [0.0, 0.3, 0.7]];
        let f = array![[0.0, 0.5, 3.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        Mpm::new(u, f).unwrap()
    }

    #[test]
    fn survival_sensitivity_matches_finite_difference() {
        let mpm = model();
        let p = perturb_vr(&mpm, PerturbType::Sensitivity).unwrap();
        let base = EigenHelper::lambda(mpm.projection().view()).unwrap();

        // Raising every σ_j by h while holding γ fixed adds h γ to U.
        let h = 1e-6;
        let gamma = vr_mat_u(mpm.u()).unwrap().rates;
        let bumped = mpm.projection() + &(gamma * h);
        let lambda = EigenHelper::lambda(bumped.view()).unwrap();
        assert_abs_diff_eq!((lambda - base) / h, p.survival, epsilon = 1e-4);
    }

    #[test]
    fn growth_sensitivity_matches_finite_difference() {
        let mpm = model();
        let p = perturb_vr(&mpm, PerturbType::Sensitivity).unwrap();
        let base = EigenHelper::lambda(mpm.projection().view()).unwrap();

        // Every stage has both growth and stasis, so shift mass from the
        // diagonal into the growth entries, proportionally.
        let h = 1e-6;
        let rates = vr_mat_u(mpm.u()).unwrap();
        let mut gamma = rates.rates.clone();
        for j in 0..2 {
            let growth: f64 = (j + 1..3).map(|i| rates.rates[[i, j]]).sum();
            for i in j + 1..3 {
                gamma[[i, j]] += h * rates.rates[[i, j]] / growth;
            }
            gamma[[j, j]] -= h;
        }
        let conditional = crate::vital_rates::ConditionalRates {
            survival: rates.survival.clone(),
            rates: gamma,
            undefined: Vec::new(),
        };
        let bumped = conditional.recompose() + &mpm.f();
        let lambda = EigenHelper::lambda(bumped.view()).unwrap();
        assert_abs_diff_eq!((lambda - base) / h, p.growth, epsilon = 1e-4);
    }

    #[test]
    fn survival_and_fecundity_elasticities_sum_to_one() {
        let p = perturb_vr(&model(), PerturbType::Elasticity).unwrap();
        assert_abs_diff_eq!(p.survival + p.fecundity, 1.0, epsilon = 1e-9);
        assert!(p.clonality.is_none());
    }

    #[test]
    fn clonality_is_reported_when_present() {
        let u = array![[0.2, 0.1], [0.3, 0.4]];
        let f = array![[0.0, 1.0], [0.0, 0.0]];
        let c = array![[0.0, 0.0], [0.0, 0.3]];
        let mpm = Mpm::with_clonal(u, f, c).unwrap();
        let p = perturb_vr(&mpm, PerturbType::Elasticity).unwrap();
        let clonal = p.clonality.unwrap();
        assert!(clonal > 0.0);
        assert_abs_diff_eq!(p.survival + p.fecundity + clonal, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn no_shrinkage_means_zero_shrinkage_perturbation() {
        let u = array![[0.2, 0.0], [0.3, 0.4]];
        let f = array![[0.0, 2.0], [0.0, 0.0]];
        let mpm = Mpm::new(u, f).unwrap();
        let p = perturb_vr(&mpm, PerturbType::Sensitivity).unwrap();
        assert_eq!(p.shrinkage, 0.0);
    }

    #[test]
    fn imprimitive_model_has_no_vital_rate_perturbation() {
        let u = array![[0.0, 0.0], [0.5, 0.0]];
        let f = array![[0.0, 2.0], [0.0, 0.0]];
        let mpm = Mpm::new(u, f).unwrap();
        assert!(matches!(
            perturb_vr(&mpm, PerturbType::Sensitivity),
            Err(MpmError::NonErgodic(_))
        ));
    }
}
