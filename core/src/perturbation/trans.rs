use ndarray::{Array2, ArrayView2};
use serde::Serialize;

use crate::perturbation::matrix::sens_elas;
use crate::perturbation::PerturbType;
use crate::prelude::{Mpm, MpmResult};
use crate::validation;

/// Perturbation of λ summed over transition types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionPerturbation {
    /// Diagonal of `U`.
    pub stasis: f64,
    /// Above the diagonal of `U`.
    pub retrogression: f64,
    /// Below the diagonal of `U`.
    pub progression: f64,
    pub fecundity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clonality: Option<f64>,
}

impl TransitionPerturbation {
    pub fn total(&self) -> f64 {
        self.stasis
            + self.retrogression
            + self.progression
            + self.fecundity
            + self.clonality.unwrap_or(0.0)
    }
}

/// Sums perturbations over the positions where `component` is positive.
///
/// Elasticities are split between components sharing a position in
/// proportion to each component's share of `a_ij`.
fn accumulate(
    component: ArrayView2<f64>,
    a: &Array2<f64>,
    values: &Array2<f64>,
    kind: PerturbType,
    exclude: &[usize],
    keep: impl Fn(usize, usize) -> bool,
) -> f64 {
    component
        .indexed_iter()
        .filter(|((i, j), c)| {
            **c > 0.0 && keep(*i, *j) && !exclude.contains(i) && !exclude.contains(j)
        })
        .map(|((i, j), c)| match kind {
            PerturbType::Sensitivity => values[[i, j]],
            PerturbType::Elasticity => values[[i, j]] * c / a[[i, j]],
        })
        .sum()
}

/// Perturbation of λ aggregated by transition type.
///
/// Positions in an `exclude`d row or column are left out of every sum.
pub fn perturb_trans(
    mpm: &Mpm,
    exclude: &[usize],
    kind: PerturbType,
) -> MpmResult<TransitionPerturbation> {
    validation::ensure_stages(exclude, mpm.stages())?;
    let a = mpm.projection();
    let perturbation = sens_elas(a.view())?;
    let values = perturbation.get(kind);
    let sum = |component: ArrayView2<f64>, keep: &dyn Fn(usize, usize) -> bool| {
        accumulate(component, &a, values, kind, exclude, keep)
    };

    Ok(TransitionPerturbation {
        stasis: sum(mpm.u(), &|i, j| i == j),
        retrogression: sum(mpm.u(), &|i, j| i < j),
        progression: sum(mpm.u(), &|i, j| i > j),
        fecundity: sum(mpm.f(), &|_, _| true),
        clonality: mpm.c().map(|c| sum(c, &|_, _| true)),
    })
}
