//! Reproductive maturity as absorption in a Markov chain.
//!
//! Reproductive stages (columns of `R` with positive sums) are made absorbing
//! by zeroing their columns in `U`. The fundamental matrix `N'` of that chain
//! gives, for every reproductive stage `j`, the probability `N'[j, k]` that
//! an individual starting in `k` first reproduces in `j`.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::math::matrix::MatrixHelper;
use crate::prelude::{MpmError, MpmResult, Start};
use crate::validation;

/// Probability mass below which a stage is treated as unable to mature.
const REACH_TOL: f64 = 1e-12;

/// Stages that reproduce: columns of `r` with a positive sum.
pub fn repro_stages(r: ArrayView2<f64>) -> MpmResult<Vec<usize>> {
    validation::ensure_square(r, "reproduction matrix")?;
    validation::ensure_non_negative(r, "reproduction matrix")?;
    Ok(r.sum_axis(Axis(0))
        .iter()
        .enumerate()
        .filter(|(_, total)| **total > 0.0)
        .map(|(stage, _)| stage)
        .collect())
}

struct MaturityChain {
    reproductive: Vec<usize>,
    start: Array1<f64>,
    u_absorbing: Array2<f64>,
    fundamental: Array2<f64>,
}

impl MaturityChain {
    fn build(u: ArrayView2<f64>, r: ArrayView2<f64>, start: &Start) -> MpmResult<Self> {
        let n = validation::ensure_pair(u, r)?;
        let reproductive = repro_stages(r)?;
        let start = start.vector(n)?;
        let mut u_absorbing = u.to_owned();
        for &stage in &reproductive {
            u_absorbing.column_mut(stage).fill(0.0);
        }
        let fundamental = MatrixHelper::fundamental(u_absorbing.view())?;
        Ok(Self {
            reproductive,
            start,
            u_absorbing,
            fundamental,
        })
    }

    /// Probability, per starting stage, of ever reaching maturity.
    fn absorption(&self) -> Array1<f64> {
        let n = self.start.len();
        Array1::from_shape_fn(n, |k| {
            self.reproductive
                .iter()
                .map(|&j| self.fundamental[[j, k]])
                .sum::<f64>()
        })
    }
}

/// Probability of reaching a reproductive stage before death.
pub fn mature_prob(u: ArrayView2<f64>, r: ArrayView2<f64>, start: &Start) -> MpmResult<f64> {
    let chain = MaturityChain::build(u, r, start)?;
    Ok(chain.absorption().dot(&chain.start).min(1.0))
}

/// Distribution over reproductive stages at first reproduction, conditional
/// on maturing. Non-reproductive stages get zero.
pub fn mature_distrib(
    u: ArrayView2<f64>,
    r: ArrayView2<f64>,
    start: &Start,
) -> MpmResult<Array1<f64>> {
    let chain = MaturityChain::build(u, r, start)?;
    let reach = chain.fundamental.dot(&chain.start);
    let mut distrib = Array1::zeros(chain.start.len());
    for &j in &chain.reproductive {
        distrib[j] = reach[j];
    }
    let total = distrib.sum();
    if total <= REACH_TOL {
        return Err(MpmError::Undefined(
            "no reproductive stage is reachable from start".into(),
        ));
    }
    Ok(distrib / total)
}

/// Mean age at first reproduction, conditional on reaching maturity.
///
/// Builds the chain conditioned on absorption into maturity,
/// `U_c = D U' D^-1` with `D = diag(B)` and `B` the absorption probabilities,
/// over the stages that can mature. Visits to the first reproductive stage
/// count the age at which reproduction happens, so a start in a reproductive
/// stage gives age 0.
pub fn mature_age(u: ArrayView2<f64>, r: ArrayView2<f64>, start: &Start) -> MpmResult<f64> {
    let chain = MaturityChain::build(u, r, start)?;
    let absorption = chain.absorption();
    let reachable: Vec<usize> = (0..absorption.len())
        .filter(|&k| absorption[k] > REACH_TOL)
        .collect();
    let start_mass: f64 = reachable
        .iter()
        .map(|&k| chain.start[k] * absorption[k])
        .sum();
    if start_mass <= REACH_TOL {
        return Err(MpmError::Undefined(
            "maturity is unreachable from start".into(),
        ));
    }

    let m = reachable.len();
    let conditional = Array2::from_shape_fn((m, m), |(a, b)| {
        let (i, k) = (reachable[a], reachable[b]);
        absorption[i] * chain.u_absorbing[[i, k]] / absorption[k]
    });
    let visits = MatrixHelper::fundamental(conditional.view())?;
    let steps = MatrixHelper::column_sums(visits.view());

    let weighted: f64 = reachable
        .iter()
        .enumerate()
        .map(|(a, &k)| chain.start[k] * absorption[k] * (steps[a] - 1.0))
        .sum();
    Ok(weighted / start_mass)
}
