use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::lifetable::trajectory::project_cohort;
use crate::lifetable::AgeLimits;
use crate::math::eigen::EigenHelper;
use crate::math::matrix::MatrixHelper;
use crate::prelude::{MpmError, MpmResult, Start};
use crate::validation;

/// How the net reproductive rate is read off the next-generation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum R0Method {
    /// Spectral radius of `R N`.
    #[default]
    Generation,
    /// Lifetime offspring of one individual starting at `start`.
    Start,
}

/// Generation-time definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenTimeMethod {
    /// `ln R0 / ln λ`.
    R0,
    /// Mean age of parents of offspring in the stable population, `λ vᵀw / vᵀRw`.
    AgeDiff,
    /// Mean age of reproduction in a cohort, `Σ x lx mx / Σ lx mx`.
    Cohort { start: Start, limits: AgeLimits },
}

impl Default for GenTimeMethod {
    fn default() -> Self {
        GenTimeMethod::R0
    }
}

fn next_generation(u: ArrayView2<f64>, r: ArrayView2<f64>) -> MpmResult<Array2<f64>> {
    validation::ensure_pair(u, r)?;
    let fundamental = MatrixHelper::fundamental(u)?;
    Ok(MatrixHelper::multiply(r, fundamental.view()))
}

/// Net reproductive rate R0: mean lifetime offspring per individual.
pub fn net_repro_rate(
    u: ArrayView2<f64>,
    r: ArrayView2<f64>,
    start: &Start,
    method: R0Method,
) -> MpmResult<f64> {
    let ngm = next_generation(u, r)?;
    match method {
        R0Method::Generation => EigenHelper::spectral_radius(ngm.view()),
        R0Method::Start => {
            let start = start.vector(u.nrows())?;
            Ok(ngm.dot(&start).sum())
        }
    }
}

pub fn gen_time(u: ArrayView2<f64>, r: ArrayView2<f64>, method: &GenTimeMethod) -> MpmResult<f64> {
    let n = validation::ensure_pair(u, r)?;
    match method {
        GenTimeMethod::R0 => {
            let r0 = net_repro_rate(u, r, &Start::default(), R0Method::Generation)?;
            let a = &u + &r;
            let lambda = EigenHelper::spectral_radius(a.view())?;
            if r0 <= 0.0 || lambda <= 0.0 {
                return Err(MpmError::Undefined(
                    "generation time needs positive R0 and lambda".into(),
                ));
            }
            if (lambda.ln()).abs() < 1e-12 {
                return Err(MpmError::Undefined(
                    "ln R0 / ln lambda is 0/0 for a stationary population".into(),
                ));
            }
            Ok(r0.ln() / lambda.ln())
        }
        GenTimeMethod::AgeDiff => {
            let a = &u + &r;
            let eig = EigenHelper::dominant(a.view())?;
            let births = eig.left.dot(&r.dot(&eig.right));
            if births <= 0.0 {
                return Err(MpmError::Undefined(
                    "no reproduction in the stable population".into(),
                ));
            }
            Ok(eig.lambda * eig.left.dot(&eig.right) / births)
        }
        GenTimeMethod::Cohort { start, limits } => {
            limits.validate()?;
            let cohort = project_cohort(u, Some(r), start.vector(n)?, limits);
            // fertility[x] is already lx * mx.
            let (weighted, total) = cohort
                .fertility
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(weighted, total), (age, lxmx)| {
                    (weighted + age as f64 * lxmx, total + lxmx)
                });
            if total <= 0.0 {
                return Err(MpmError::Undefined(
                    "cohort produces no offspring".into(),
                ));
            }
            Ok(weighted / total)
        }
    }
}
